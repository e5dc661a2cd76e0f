//! Services layer: credential store, tokens, OTPs, authorization and email.

mod database;
pub mod email;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod otp;
pub mod policy;
pub mod redis;
pub mod repository;
pub mod templates;
pub mod token;

pub use database::Database;
pub use email::{
    DeliveryOutcome, EmailMessage, EmailProvider, MockEmailProvider, NotificationDispatcher,
    ZeptoMailProvider,
};
pub use error::ServiceError;
pub use gate::AuthorizationGate;
pub use otp::{OtpError, OtpPurpose, OtpService};
pub use policy::{Action, Target};
pub use redis::{MockOtpCache, OtpCache, RedisService};
pub use repository::{InMemoryRepository, Repository};
pub use token::{IssuedToken, TokenClaims, TokenError, TokenKind, TokenService, TokenSubject};
