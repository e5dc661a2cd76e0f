//! One-time codes for verification and credential resets.

use rand::Rng;
use service_core::error::AppError;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

use super::redis::{OtpCache, TakeOutcome};

/// What a code was issued for. Codes for one purpose never satisfy another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verification,
    PasswordReset,
    PinReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Verification => "verification",
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::PinReset => "pin_reset",
        }
    }
}

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("otp expired, request a new one")]
    Expired,
    #[error("Invalid otp")]
    Invalid,
    #[error("Too many invalid attempts, request a new otp")]
    AttemptsExhausted,
    #[error("otp cache unavailable: {0}")]
    Cache(#[from] anyhow::Error),
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::Expired | OtpError::AttemptsExhausted => {
                AppError::Unauthorized(anyhow::anyhow!(err.to_string()))
            }
            OtpError::Invalid => AppError::BadRequest(anyhow::anyhow!(err.to_string())),
            OtpError::Cache(e) => AppError::InternalError(e),
        }
    }
}

/// Issues and consumes 6-digit codes held in the cache.
///
/// Only a SHA-256 digest of each code is stored. A code is burned after
/// `max_attempts` wrong guesses.
#[derive(Clone)]
pub struct OtpService {
    cache: Arc<dyn OtpCache>,
    ttl_seconds: u64,
    max_attempts: u32,
}

impl OtpService {
    pub fn new(cache: Arc<dyn OtpCache>, ttl_seconds: u64, max_attempts: u32) -> Self {
        Self {
            cache,
            ttl_seconds,
            max_attempts,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Uniform over 000000..=999999, zero-padded.
    pub fn generate() -> String {
        let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{:06}", code)
    }

    fn key(purpose: OtpPurpose, email: &str) -> String {
        format!("otp:{}:{}", purpose.as_str(), email.trim().to_lowercase())
    }

    fn digest(code: &str) -> String {
        hex::encode(Sha256::digest(code.as_bytes()))
    }

    /// Store `code` for the email, replacing any live code for the same purpose.
    pub async fn store(&self, purpose: OtpPurpose, email: &str, code: &str) -> Result<(), OtpError> {
        self.cache
            .set_with_expiry(&Self::key(purpose, email), &Self::digest(code), self.ttl_seconds)
            .await?;
        tracing::debug!(purpose = purpose.as_str(), "OTP stored");
        Ok(())
    }

    /// Generate and store a fresh code, returning it for delivery.
    pub async fn issue(&self, purpose: OtpPurpose, email: &str) -> Result<String, OtpError> {
        let code = Self::generate();
        self.store(purpose, email, &code).await?;
        Ok(code)
    }

    /// Accept `supplied` at most once. A wrong code leaves the live code in
    /// place until the attempt budget runs out.
    #[tracing::instrument(skip(self, email, supplied), fields(purpose = purpose.as_str()))]
    pub async fn consume(
        &self,
        purpose: OtpPurpose,
        email: &str,
        supplied: &str,
    ) -> Result<(), OtpError> {
        let outcome = self
            .cache
            .take_if_equals(
                &Self::key(purpose, email),
                &Self::digest(supplied),
                self.max_attempts,
            )
            .await?;

        match outcome {
            TakeOutcome::Taken => Ok(()),
            TakeOutcome::Missing => Err(OtpError::Expired),
            TakeOutcome::Mismatch => Err(OtpError::Invalid),
            TakeOutcome::Exhausted => {
                tracing::warn!(purpose = purpose.as_str(), "OTP burned after repeated failures");
                Err(OtpError::AttemptsExhausted)
            }
        }
    }
}
