use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{AdminRole, Permissions};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SuperuserSignupRequest {
    #[validate(length(min = 1, max = 150, message = "Admin username must be 1 to 150 characters"))]
    #[schema(max_length = 150, example = "root")]
    pub username: String,

    #[validate(email(message = "Email address is required"))]
    #[schema(example = "root@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminSignupRequest {
    #[validate(length(min = 1, max = 150, message = "Admin username must be 1 to 150 characters"))]
    #[schema(max_length = 150, example = "editor")]
    pub username: String,

    #[validate(email(message = "Email address is required"))]
    #[schema(example = "editor@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    #[serde(default = "default_role")]
    pub role: AdminRole,

    #[serde(default)]
    pub permissions: Permissions,
}

fn default_role() -> AdminRole {
    AdminRole::User
}

/// OAuth2-style password form.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginForm {
    #[validate(length(min = 1, message = "Admin username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: AdminRole,

    /// Replaces the permission bits when present.
    pub permissions: Option<Permissions>,
}
