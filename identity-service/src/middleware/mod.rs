pub mod auth;
pub mod metrics;

pub use auth::{AdminClaims, PasswordStageClaims, UserClaims, PASSWORD_TOKEN_HEADER};
pub use metrics::metrics_middleware;
