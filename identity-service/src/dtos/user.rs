use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserType;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendOtpRequest {
    #[validate(email(message = "Email address is required"))]
    #[schema(example = "founder@example.com")]
    pub email: String,

    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,

    #[validate(length(equal = 6, message = "Otp must be 6 digits"))]
    #[schema(example = "042917")]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPasswordRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPinRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[schema(example = "0420")]
    pub pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserLoginRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PinLoginRequest {
    #[validate(length(min = 1, message = "Pin is required"))]
    pub pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(equal = 6, message = "Otp must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPinRequest {
    pub pin: String,

    #[validate(length(equal = 6, message = "Otp must be 6 digits"))]
    pub otp: String,
}
