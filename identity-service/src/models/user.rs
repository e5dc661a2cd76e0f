//! End-user accounts: verified by OTP, authenticated by password then PIN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Startup,
    Investor,
    Corporate,
    Accelerator,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Startup => "startup",
            UserType::Investor => "investor",
            UserType::Corporate => "corporate",
            UserType::Accelerator => "accelerator",
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(UserType::Startup),
            "investor" => Ok(UserType::Investor),
            "corporate" => Ok(UserType::Corporate),
            "accelerator" => Ok(UserType::Accelerator),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

/// User entity.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub pin_hash: Option<String>,
    pub user_type_code: String,
    pub is_verified: bool,
    pub last_login_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl User {
    /// Create an unverified user with no credentials yet.
    pub fn new(email: String, user_type: UserType) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            firstname: String::new(),
            lastname: String::new(),
            email,
            password_hash: None,
            pin_hash: None,
            user_type_code: user_type.as_str().to_string(),
            is_verified: false,
            last_login_utc: None,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user_type_code.parse().ok()
    }

    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub is_verified: bool,
    pub has_password: bool,
    pub has_pin: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            user_type: user.user_type(),
            is_verified: user.is_verified,
            has_password: user.password_hash.is_some(),
            has_pin: user.pin_hash.is_some(),
            last_login: user.last_login_utc,
            created_at: user.created_utc,
            updated_at: user.updated_utc,
        }
    }
}
