//! Admin bootstrap, registration and login.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use subtle::ConstantTimeEq;

use super::normalize_email;
use crate::{
    dtos::{
        admin::{AdminLoginForm, AdminSignupRequest, SuperuserSignupRequest},
        ApiResponse, ErrorResponse, LoginResponse,
    },
    middleware::AdminClaims,
    models::{Admin, AdminResponse, AdminRole, Permissions},
    services::{metrics, Action, TokenKind, TokenSubject},
    utils::{hash_password, verify_password, Password, ValidatedForm, ValidatedJson},
    AppState,
};

/// Header carrying the superuser bootstrap secret.
pub const SUPERUSER_SECRET_HEADER: &str = "admin-authorization";

fn superuser_secret_matches(state: &AppState, headers: &HeaderMap) -> bool {
    let expected = state.config.security.superuser_secret.expose_secret().as_bytes();
    let presented = headers
        .get(SUPERUSER_SECRET_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    !expected.is_empty() && bool::from(expected.ct_eq(presented))
}

async fn ensure_admin_is_new(state: &AppState, username: &str, email: &str) -> Result<(), AppError> {
    let taken = state.repo.find_admin_by_username(username).await?.is_some()
        || state.repo.find_admin_by_email(email).await?.is_some();
    if taken {
        return Err(AppError::Conflict(anyhow::anyhow!("Admin already exists")));
    }
    Ok(())
}

/// Create a superuser
#[utoipa::path(
    post,
    path = "/auth/superuser/signup",
    request_body = SuperuserSignupRequest,
    params(("Admin-Authorization" = String, Header, description = "Superuser bootstrap secret")),
    responses(
        (status = 201, description = "Superuser created", body = AdminResponse),
        (status = 401, description = "Missing or wrong bootstrap secret", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn superuser_signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SuperuserSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !superuser_secret_matches(&state, &headers) {
        tracing::warn!("Superuser signup attempted with an invalid bootstrap secret");
        return Err(AppError::Unauthorized(anyhow::anyhow!("Request not authorized")));
    }

    let email = normalize_email(&req.email);
    ensure_admin_is_new(&state, &req.username, &email).await?;

    let password_hash = hash_password(&Password::new(req.password))?;
    let admin = Admin::new(
        req.username,
        email,
        password_hash.into_string(),
        AdminRole::Superuser,
        Permissions::all(),
    );
    state.repo.insert_admin(&admin).await?;

    tracing::info!(admin_id = %admin.admin_id, "Superuser created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Superuser created successfully.", admin.sanitized())),
    ))
}

/// Register an admin (superuser only)
#[utoipa::path(
    post,
    path = "/auth/admins/signup",
    request_body = AdminSignupRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Caller is not a superuser", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn admin_signup(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    ValidatedJson(req): ValidatedJson<AdminSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.gate.admit(&claims, Action::RegisterAdmin).await?;

    if req.role == AdminRole::Superuser {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "A superuser cannot be created from this endpoint"
        )));
    }

    let email = normalize_email(&req.email);
    ensure_admin_is_new(&state, &req.username, &email).await?;

    let password_hash = hash_password(&Password::new(req.password))?;
    let admin = Admin::new(
        req.username,
        email,
        password_hash.into_string(),
        req.role,
        req.permissions,
    );
    state.repo.insert_admin(&admin).await?;

    tracing::info!(
        admin_id = %admin.admin_id,
        created_by = %actor.admin_id,
        role = admin.role_code.as_str(),
        "Admin created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Admin created successfully.", admin.sanitized())),
    ))
}

/// Admin login (form encoded)
#[utoipa::path(
    post,
    path = "/auth/admins/login",
    request_body(content = AdminLoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Admin token issued", body = AdminResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<AdminLoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.repo.find_admin_by_username(form.username.trim()).await?;

    let mut admin = match admin {
        Some(admin) if verify_password(&Password::new(form.password), &admin.password_hash) => admin,
        _ => {
            metrics::record_auth("admin_login", false);
            tracing::info!("Admin login failed");
            return Err(AppError::Unauthorized(anyhow::anyhow!("Invalid credentials")));
        }
    };

    let now = Utc::now();
    admin.last_login_utc = Some(now);
    admin.updated_utc = now;
    state.repo.update_admin(&admin).await?;

    let token = state.tokens.issue(
        TokenKind::Admin,
        &TokenSubject {
            id: admin.admin_id,
            email: admin.email.clone(),
        },
    )?;

    metrics::record_auth("admin_login", true);
    tracing::info!(admin_id = %admin.admin_id, "Admin logged in");

    Ok(Json(LoginResponse::bearer(
        "Admin logged in successfully.",
        token,
        admin.sanitized(),
    )))
}
