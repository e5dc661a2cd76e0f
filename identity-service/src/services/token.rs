//! Signed, time-limited session tokens.
//!
//! Every token carries an audience naming its namespace. A token is accepted
//! only by the validator for the namespace it was issued in, so an admin
//! token cannot stand in for a user session and a password-stage token cannot
//! stand in for a pin-stage one.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;

/// Token namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Admin session.
    Admin,
    /// Issued after a user proves their password; only unlocks the PIN step.
    UserPassword,
    /// Full user session, issued after the PIN step.
    UserPin,
}

impl TokenKind {
    pub fn audience(&self) -> &'static str {
        match self {
            TokenKind::Admin => "admin",
            TokenKind::UserPassword => "user:password",
            TokenKind::UserPin => "user:pin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (admin or user id)
    pub sub: String,
    pub email: String,
    /// Namespace
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl TokenClaims {
    pub fn subject_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Identity a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature or encoding is invalid")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token was issued for another namespace")]
    WrongNamespace,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
            // Callers learn nothing about why a token was refused.
            _ => AppError::Unauthorized(anyhow::anyhow!("Request not authorized")),
        }
    }
}

/// HS256 issuer and validator for every namespace.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_ttl: Duration,
    user_password_ttl: Duration,
    user_pin_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        Self::from_secret(
            &config.secret,
            Duration::minutes(config.admin_token_expiry_minutes),
            Duration::minutes(config.user_password_token_expiry_minutes),
            Duration::minutes(config.user_pin_token_expiry_minutes),
        )
    }

    pub fn from_secret(
        secret: &SecretString,
        admin_ttl: Duration,
        user_password_ttl: Duration,
        user_pin_ttl: Duration,
    ) -> Result<Self, anyhow::Error> {
        let secret = secret.expose_secret().as_bytes();
        if secret.is_empty() {
            anyhow::bail!("JWT signing secret must not be empty");
        }

        tracing::info!("Token service initialized with HS256 secret");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            admin_ttl,
            user_password_ttl,
            user_pin_ttl,
        })
    }

    /// Configured lifetime for a namespace.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Admin => self.admin_ttl,
            TokenKind::UserPassword => self.user_password_ttl,
            TokenKind::UserPin => self.user_pin_ttl,
        }
    }

    /// Issue a token for `kind` with the configured lifetime.
    pub fn issue(&self, kind: TokenKind, subject: &TokenSubject) -> Result<IssuedToken, TokenError> {
        self.issue_at(kind, subject, self.ttl(kind), Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(
        &self,
        kind: TokenKind,
        subject: &TokenSubject,
        ttl: Duration,
        now: i64,
    ) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims {
            sub: subject.id.to_string(),
            email: subject.email.clone(),
            aud: kind.audience().to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Validate a token for `kind` against the current time.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, kind, Utc::now().timestamp())
    }

    /// Valid iff the signature matches, the namespace matches and `now < exp`.
    pub fn validate_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: i64,
    ) -> Result<TokenClaims, TokenError> {
        // Expiry and audience are checked here against an explicit clock,
        // without the library's default leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token failed to decode");
                TokenError::Malformed
            })?
            .claims;

        if claims.aud != kind.audience() {
            return Err(TokenError::WrongNamespace);
        }

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
