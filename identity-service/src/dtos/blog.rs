use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::BlogStatus;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlogRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_status")]
    pub status: BlogStatus,
}

fn default_status() -> BlogStatus {
    BlogStatus::Draft
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBlogRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<BlogStatus>,
}
