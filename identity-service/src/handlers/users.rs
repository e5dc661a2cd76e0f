//! User onboarding: OTP verification, password + PIN credentials, resets.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;

use super::normalize_email;
use crate::{
    dtos::{
        user::{
            EmailRequest, PinLoginRequest, ResetPasswordRequest, ResetPinRequest, SendOtpRequest,
            SetPasswordRequest, SetPinRequest, UserLoginRequest, VerifyOtpRequest,
        },
        ApiResponse, ErrorResponse, LoginResponse,
    },
    middleware::{PasswordStageClaims, UserClaims},
    models::{User, UserResponse},
    services::{
        metrics,
        templates::{render_otp_email, OtpEmail},
        EmailMessage, OtpPurpose, TokenKind, TokenSubject,
    },
    utils::{hash_password, is_valid_pin, verify_password, Password, ValidatedJson},
    AppState,
};

const INVALID_PIN: &str = "Pin must be exactly 4 digits";

async fn find_user(state: &AppState, email: &str) -> Result<User, AppError> {
    state
        .repo
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))
}

fn require_verified(user: &User) -> Result<(), AppError> {
    if !user.is_verified {
        return Err(AppError::Forbidden(anyhow::anyhow!("User is not verified")));
    }
    Ok(())
}

fn invalid_credentials(event: &str) -> AppError {
    metrics::record_auth(event, false);
    AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
}

/// Issue a code for `purpose` and email it without waiting on delivery.
async fn issue_and_send(
    state: &AppState,
    purpose: OtpPurpose,
    kind: OtpEmail,
    user: &User,
) -> Result<(), AppError> {
    let code = state.otp.issue(purpose, &user.email).await?;
    metrics::record_otp(purpose.as_str());

    let brand = &state.config.email.from_name;
    let expires_at = Utc::now() + chrono::Duration::seconds(state.otp.ttl_seconds() as i64);
    let message = EmailMessage {
        to_address: user.email.clone(),
        to_name: format!("{} {}", user.firstname, user.lastname).trim().to_string(),
        subject: kind.subject(brand),
        html_body: render_otp_email(kind, brand, &code, expires_at),
    };
    state.notifier.dispatch_in_background(message);

    tracing::info!(user_id = %user.user_id, purpose = purpose.as_str(), "OTP issued");
    Ok(())
}

/// Start onboarding: create the user if needed and email a verification code
#[utoipa::path(
    post,
    path = "/users/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 201, description = "Code sent"),
        (status = 409, description = "User already verified", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn send_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&req.email);

    let user = match state.repo.find_user_by_email(&email).await? {
        Some(user) if user.is_verified => {
            return Err(AppError::Conflict(anyhow::anyhow!("User already verified")));
        }
        Some(user) => user,
        None => {
            let user = User::new(email.clone(), req.user_type);
            state.repo.insert_user(&user).await?;
            tracing::info!(user_id = %user.user_id, "User created");
            user
        }
    };

    issue_and_send(&state, OtpPurpose::Verification, OtpEmail::Verification, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Otp sent successfully",
            json!({ "email": user.email, "expires_in": state.otp.ttl_seconds() }),
        )),
    ))
}

/// Consume the verification code and mark the user verified
#[utoipa::path(
    put,
    path = "/users/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "User verified", body = UserResponse),
        (status = 400, description = "Wrong code", body = ErrorResponse),
        (status = 401, description = "Code expired", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = find_user(&state, &normalize_email(&req.email)).await?;
    if user.is_verified {
        return Err(AppError::Conflict(anyhow::anyhow!("User already verified")));
    }

    state
        .otp
        .consume(OtpPurpose::Verification, &user.email, req.otp.trim())
        .await?;

    user.is_verified = true;
    user.updated_utc = Utc::now();
    state.repo.update_user(&user).await?;

    tracing::info!(user_id = %user.user_id, "User verified");

    Ok(Json(ApiResponse::ok(
        "User verified successfully",
        user.sanitized(),
    )))
}

/// Set the first password for a verified user
#[utoipa::path(
    put,
    path = "/users/set-password",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password set", body = UserResponse),
        (status = 403, description = "User not verified", body = ErrorResponse),
        (status = 409, description = "Password already set", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn set_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = find_user(&state, &normalize_email(&req.email)).await?;
    require_verified(&user)?;

    if user.password_hash.is_some() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Password already set, use password reset to change it"
        )));
    }

    user.password_hash = Some(hash_password(&Password::new(req.password))?.into_string());
    user.updated_utc = Utc::now();
    state.repo.update_user(&user).await?;

    Ok(Json(ApiResponse::ok("Password set successfully", user.sanitized())))
}

/// Set the 4-digit PIN after re-checking the password
#[utoipa::path(
    put,
    path = "/users/set-pin",
    request_body = SetPinRequest,
    responses(
        (status = 200, description = "Pin set", body = UserResponse),
        (status = 400, description = "Malformed pin or no password yet", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn set_pin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SetPinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = find_user(&state, &normalize_email(&req.email)).await?;
    require_verified(&user)?;

    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Set a password before setting a pin")))?;
    if !verify_password(&Password::new(req.password), password_hash) {
        return Err(invalid_credentials("user_set_pin"));
    }
    if !is_valid_pin(&req.pin) {
        return Err(AppError::BadRequest(anyhow::anyhow!(INVALID_PIN)));
    }

    user.pin_hash = Some(hash_password(&Password::new(req.pin))?.into_string());
    user.updated_utc = Utc::now();
    state.repo.update_user(&user).await?;

    Ok(Json(ApiResponse::ok("Pin set successfully", user.sanitized())))
}

/// Password login; the token only unlocks the PIN step
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = UserLoginRequest,
    responses(
        (status = 200, description = "Password-stage token issued", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "User not verified", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UserLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .repo
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(|| invalid_credentials("user_login"))?;

    let password_ok = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&Password::new(req.password), hash));
    if !password_ok {
        return Err(invalid_credentials("user_login"));
    }
    require_verified(&user)?;

    let token = state.tokens.issue(
        TokenKind::UserPassword,
        &TokenSubject {
            id: user.user_id,
            email: user.email.clone(),
        },
    )?;
    metrics::record_auth("user_login", true);

    Ok(Json(LoginResponse::bearer(
        "Password verified, proceed to pin login",
        token,
        user.sanitized(),
    )))
}

/// PIN login; requires the password-stage token
#[utoipa::path(
    post,
    path = "/users/login/pin",
    request_body = PinLoginRequest,
    params(("X-Password-Authorization-Token" = String, Header, description = "Password-stage token")),
    responses(
        (status = 200, description = "User session issued", body = UserResponse),
        (status = 401, description = "Invalid credentials or token", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn login_pin(
    State(state): State<AppState>,
    PasswordStageClaims(claims): PasswordStageClaims,
    ValidatedJson(req): ValidatedJson<PinLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.gate.resolve_user(&claims).await?;

    let pin_hash = user
        .pin_hash
        .as_deref()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Pin has not been set")))?;
    if !verify_password(&Password::new(req.pin), pin_hash) {
        return Err(invalid_credentials("user_pin_login"));
    }

    let now = Utc::now();
    user.last_login_utc = Some(now);
    user.updated_utc = now;
    state.repo.update_user(&user).await?;

    let token = state.tokens.issue(
        TokenKind::UserPin,
        &TokenSubject {
            id: user.user_id,
            email: user.email.clone(),
        },
    )?;
    metrics::record_auth("user_pin_login", true);
    tracing::info!(user_id = %user.user_id, "User logged in");

    Ok(Json(LoginResponse::bearer(
        "User logged in successfully",
        token,
        user.sanitized(),
    )))
}

/// Email a password-reset code
#[utoipa::path(
    post,
    path = "/users/password-reset/request",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Request accepted"),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Same response whether or not the address is registered.
    if let Some(user) = state
        .repo
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .filter(|u| u.is_verified)
    {
        issue_and_send(&state, OtpPurpose::PasswordReset, OtpEmail::PasswordReset, &user).await?;
    }

    Ok(Json(ApiResponse::ok(
        "If the email is registered, a password reset code has been sent",
        serde_json::Value::Null,
    )))
}

/// Replace the password using a reset code
#[utoipa::path(
    put,
    path = "/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = UserResponse),
        (status = 400, description = "Wrong code", body = ErrorResponse),
        (status = 401, description = "Code expired", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = find_user(&state, &normalize_email(&req.email)).await?;
    require_verified(&user)?;

    state
        .otp
        .consume(OtpPurpose::PasswordReset, &user.email, req.otp.trim())
        .await?;

    user.password_hash = Some(hash_password(&Password::new(req.password))?.into_string());
    user.updated_utc = Utc::now();
    state.repo.update_user(&user).await?;

    tracing::info!(user_id = %user.user_id, "Password reset");

    Ok(Json(ApiResponse::ok("Password reset successfully", user.sanitized())))
}

/// Email a PIN-reset code; requires the password-stage token
#[utoipa::path(
    post,
    path = "/users/pin-reset/request",
    params(("X-Password-Authorization-Token" = String, Header, description = "Password-stage token")),
    responses(
        (status = 200, description = "Code sent"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn request_pin_reset(
    State(state): State<AppState>,
    PasswordStageClaims(claims): PasswordStageClaims,
) -> Result<impl IntoResponse, AppError> {
    let user = state.gate.resolve_user(&claims).await?;
    issue_and_send(&state, OtpPurpose::PinReset, OtpEmail::PinReset, &user).await?;

    Ok(Json(ApiResponse::ok(
        "Pin reset code sent",
        json!({ "email": user.email, "expires_in": state.otp.ttl_seconds() }),
    )))
}

/// Replace the PIN using a reset code; requires the password-stage token
#[utoipa::path(
    put,
    path = "/users/reset-pin",
    request_body = ResetPinRequest,
    params(("X-Password-Authorization-Token" = String, Header, description = "Password-stage token")),
    responses(
        (status = 200, description = "Pin replaced", body = UserResponse),
        (status = 400, description = "Malformed pin or wrong code", body = ErrorResponse),
        (status = 401, description = "Code expired or invalid token", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn reset_pin(
    State(state): State<AppState>,
    PasswordStageClaims(claims): PasswordStageClaims,
    ValidatedJson(req): ValidatedJson<ResetPinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.gate.resolve_user(&claims).await?;

    // Checked before the code is spent.
    if !is_valid_pin(&req.pin) {
        return Err(AppError::BadRequest(anyhow::anyhow!(INVALID_PIN)));
    }

    state
        .otp
        .consume(OtpPurpose::PinReset, &user.email, req.otp.trim())
        .await?;

    user.pin_hash = Some(hash_password(&Password::new(req.pin))?.into_string());
    user.updated_utc = Utc::now();
    state.repo.update_user(&user).await?;

    tracing::info!(user_id = %user.user_id, "Pin reset");

    Ok(Json(ApiResponse::ok("Pin reset successfully", user.sanitized())))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
) -> Result<impl IntoResponse, AppError> {
    let user = state.gate.resolve_user(&claims).await?;
    Ok(Json(ApiResponse::ok("User retrieved successfully", user.sanitized())))
}
