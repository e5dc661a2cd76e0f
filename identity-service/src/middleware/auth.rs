//! Token extractors. Each accepts only its own namespace.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use service_core::error::AppError;

use crate::{
    services::{TokenClaims, TokenKind},
    AppState,
};

/// Header carrying the password-stage token.
pub const PASSWORD_TOKEN_HEADER: &str = "x-password-authorization-token";

fn bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authorization header is required")))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Request not authorized")))
}

fn password_stage(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(PASSWORD_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Request not authorized")))
}

fn validate(state: &AppState, token: &str, kind: TokenKind) -> Result<TokenClaims, AppError> {
    state.tokens.validate(token, kind).map_err(|e| {
        tracing::debug!(error = %e, namespace = kind.audience(), "Token rejected");
        AppError::from(e)
    })
}

/// Admin session from `Authorization: Bearer`.
pub struct AdminClaims(pub TokenClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(&parts.headers)?;
        validate(state, token, TokenKind::Admin).map(AdminClaims)
    }
}

/// Full user session (pin stage) from `Authorization: Bearer`.
pub struct UserClaims(pub TokenClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for UserClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(&parts.headers)?;
        validate(state, token, TokenKind::UserPin).map(UserClaims)
    }
}

/// Password-stage token from `X-Password-Authorization-Token`.
pub struct PasswordStageClaims(pub TokenClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for PasswordStageClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = password_stage(&parts.headers)?;
        validate(state, token, TokenKind::UserPassword).map(PasswordStageClaims)
    }
}
