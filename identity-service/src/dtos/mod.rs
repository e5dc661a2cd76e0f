pub mod admin;
pub mod blog;
pub mod company;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope, mirrored from `service_core::error::ErrorBody` for the docs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Request not authorized")]
    pub message: String,
}

/// Success envelope: `{"success": true, "message": ..., "data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Success envelope for the login endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse<T> {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub data: T,
}

impl<T> LoginResponse<T> {
    pub fn bearer(message: impl Into<String>, token: crate::services::IssuedToken, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            access_token: token.token,
            token_type: "bearer".to_string(),
            expires_in: token.expires_in,
            data,
        }
    }
}
