use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Published,
    Deleted,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
            BlogStatus::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            "deleted" => Ok(BlogStatus::Deleted),
            _ => Err(format!("Invalid blog status: {}", s)),
        }
    }
}

/// Blog entity. Deletion is soft: the row stays with status `deleted`.
#[derive(Debug, Clone, FromRow)]
pub struct Blog {
    pub blog_id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status_code: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Blog {
    pub fn new(
        author_id: Uuid,
        author: String,
        title: String,
        content: String,
        tags: Vec<String>,
        status: BlogStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            blog_id: Uuid::new_v4(),
            author_id,
            author,
            title,
            content,
            tags,
            status_code: status.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        }
    }

    /// Unknown status codes are treated as deleted so they never surface publicly.
    pub fn status(&self) -> BlogStatus {
        self.status_code.parse().unwrap_or(BlogStatus::Deleted)
    }

    pub fn set_status(&mut self, status: BlogStatus) {
        self.status_code = status.as_str().to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Blog> for BlogResponse {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.blog_id,
            author_id: blog.author_id,
            author: blog.author.clone(),
            title: blog.title.clone(),
            content: blog.content.clone(),
            tags: blog.tags.clone(),
            status: blog.status(),
            created_at: blog.created_utc,
            updated_at: blog.updated_utc,
        }
    }
}

/// Listing payload: `{count, blogs}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogList {
    pub count: usize,
    pub blogs: Vec<BlogResponse>,
}

impl BlogList {
    pub fn from_blogs(blogs: &[Blog]) -> Self {
        Self {
            count: blogs.len(),
            blogs: blogs.iter().map(BlogResponse::from).collect(),
        }
    }
}
