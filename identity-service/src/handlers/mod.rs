pub mod admins;
pub mod auth;
pub mod blogs;
pub mod companies;
pub mod metrics;
pub mod users;

/// Emails are matched case-insensitively and stored lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
