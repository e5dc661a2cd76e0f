//! Resolves token claims to live identities and applies the policy table.

use service_core::error::AppError;
use std::sync::Arc;

use super::policy::{self, Action, Target};
use super::repository::Repository;
use super::token::TokenClaims;
use crate::models::{Admin, User};

const INACTIVE_ADMIN: &str =
    "You cannot access this resource because your account is not activated";
const UNVERIFIED_USER: &str = "You cannot access this resource because your account is not verified";

/// Identity state is read from the store on every call.
#[derive(Clone)]
pub struct AuthorizationGate {
    repo: Arc<dyn Repository>,
}

impl AuthorizationGate {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Load the admin named by the claims regardless of the active flag.
    pub async fn resolve_admin_any_status(&self, claims: &TokenClaims) -> Result<Admin, AppError> {
        let admin_id = claims.subject_id()?;
        self.repo
            .find_admin_by_id(admin_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Admin not found")))
    }

    pub async fn resolve_admin(&self, claims: &TokenClaims) -> Result<Admin, AppError> {
        let admin = self.resolve_admin_any_status(claims).await?;
        if !admin.is_active {
            tracing::warn!(admin_id = %admin.admin_id, "Inactive admin presented a valid token");
            return Err(AppError::Forbidden(anyhow::anyhow!(INACTIVE_ADMIN)));
        }
        Ok(admin)
    }

    pub async fn resolve_user(&self, claims: &TokenClaims) -> Result<User, AppError> {
        let user_id = claims.subject_id()?;
        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        if !user.is_verified {
            return Err(AppError::Forbidden(anyhow::anyhow!(UNVERIFIED_USER)));
        }
        Ok(user)
    }

    pub fn authorize(&self, actor: &Admin, action: Action, target: Target<'_>) -> Result<(), AppError> {
        policy::evaluate(actor, action, target).map_err(|denial| denied(actor, action, denial))
    }

    /// Resolve an active admin and check only the role requirement of
    /// `action`, before any target is loaded.
    pub async fn admit_role(&self, claims: &TokenClaims, action: Action) -> Result<Admin, AppError> {
        let admin = self.resolve_admin(claims).await?;
        policy::evaluate_role(&admin, action).map_err(|denial| denied(&admin, action, denial))?;
        Ok(admin)
    }

    /// Resolve an active admin and check a target-less action in one step.
    pub async fn admit(&self, claims: &TokenClaims, action: Action) -> Result<Admin, AppError> {
        let admin = self.resolve_admin(claims).await?;
        self.authorize(&admin, action, Target::None)?;
        Ok(admin)
    }
}

fn denied(actor: &Admin, action: Action, denial: policy::Denial) -> AppError {
    tracing::info!(
        admin_id = %actor.admin_id,
        action = ?action,
        reason = denial.message,
        "Authorization denied"
    );
    AppError::from(denial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminRole, Permissions, UserType};
    use crate::services::repository::InMemoryRepository;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn claims_for(id: Uuid) -> TokenClaims {
        TokenClaims {
            sub: id.to_string(),
            email: "x@example.com".into(),
            aud: "admin".into(),
            iat: 0,
            exp: i64::MAX,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[tokio::test]
    async fn inactive_admin_is_forbidden() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut admin = Admin::new(
            "ed".into(),
            "ed@example.com".into(),
            "h".into(),
            AdminRole::Superuser,
            Permissions::all(),
        );
        admin.is_active = false;
        repo.insert_admin(&admin).await.unwrap();
        let gate = AuthorizationGate::new(repo);

        let err = gate.resolve_admin(&claims_for(admin.admin_id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), INACTIVE_ADMIN);

        // Status lookups still see the account.
        assert!(gate
            .resolve_admin_any_status(&claims_for(admin.admin_id))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let gate = AuthorizationGate::new(Arc::new(InMemoryRepository::new()));
        let err = gate.resolve_admin(&claims_for(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Admin not found");
    }

    #[tokio::test]
    async fn unverified_user_is_forbidden() {
        let repo = Arc::new(InMemoryRepository::new());
        let user = User::new("u@example.com".into(), UserType::Startup);
        repo.insert_user(&user).await.unwrap();
        let gate = AuthorizationGate::new(repo);

        let err = gate.resolve_user(&claims_for(user.user_id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admit_applies_policy() {
        let repo = Arc::new(InMemoryRepository::new());
        let editor = Admin::new(
            "ed".into(),
            "ed@example.com".into(),
            "h".into(),
            AdminRole::Manager,
            Permissions::all(),
        );
        repo.insert_admin(&editor).await.unwrap();
        let gate = AuthorizationGate::new(repo);

        let claims = claims_for(editor.admin_id);
        assert!(gate.admit(&claims, Action::ListAdmins).await.is_ok());
        let err = gate.admit(&claims, Action::RegisterAdmin).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
