//! Admin accounts: back-office identities with a role and CRUD permission bits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Admin role hierarchy. `Superuser` outranks every other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Superuser,
    Manager,
    Admin,
    Supervisor,
    User,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Superuser => "superuser",
            AdminRole::Manager => "manager",
            AdminRole::Admin => "admin",
            AdminRole::Supervisor => "supervisor",
            AdminRole::User => "user",
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superuser" => Ok(AdminRole::Superuser),
            "manager" => Ok(AdminRole::Manager),
            "admin" => Ok(AdminRole::Admin),
            "supervisor" => Ok(AdminRole::Supervisor),
            "user" => Ok(AdminRole::User),
            _ => Err(format!("Invalid admin role: {}", s)),
        }
    }
}

/// A single CRUD permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Permissions {
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub delete: bool,
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Create => self.create,
            Permission::Read => self.read,
            Permission::Update => self.update,
            Permission::Delete => self.delete,
        }
    }
}

/// Admin entity.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub admin_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_code: String,
    pub is_active: bool,
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub last_login_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Admin {
    /// New admins start active.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        role: AdminRole,
        permissions: Permissions,
    ) -> Self {
        let now = Utc::now();
        Self {
            admin_id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            role_code: role.as_str().to_string(),
            is_active: true,
            can_create: permissions.create,
            can_read: permissions.read,
            can_update: permissions.update,
            can_delete: permissions.delete,
            last_login_utc: None,
            created_utc: now,
            updated_utc: now,
        }
    }

    /// Unknown role codes degrade to the least privileged role.
    pub fn role(&self) -> AdminRole {
        self.role_code.parse().unwrap_or(AdminRole::User)
    }

    pub fn is_superuser(&self) -> bool {
        self.role() == AdminRole::Superuser
    }

    pub fn permissions(&self) -> Permissions {
        Permissions {
            create: self.can_create,
            read: self.can_read,
            update: self.can_update,
            delete: self.can_delete,
        }
    }

    pub fn set_role(&mut self, role: AdminRole) {
        self.role_code = role.as_str().to_string();
        if role == AdminRole::Superuser {
            self.set_permissions(Permissions::all());
        }
    }

    pub fn set_permissions(&mut self, permissions: Permissions) {
        self.can_create = permissions.create;
        self.can_read = permissions.read;
        self.can_update = permissions.update;
        self.can_delete = permissions.delete;
    }

    pub fn sanitized(&self) -> AdminResponse {
        AdminResponse::from(self)
    }
}

/// Admin as exposed over HTTP (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub permissions: Permissions,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Admin> for AdminResponse {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.admin_id,
            username: admin.username.clone(),
            email: admin.email.clone(),
            role: admin.role(),
            is_active: admin.is_active,
            permissions: admin.permissions(),
            last_login: admin.last_login_utc,
            created_at: admin.created_utc,
            updated_at: admin.updated_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promoting_to_superuser_grants_every_permission() {
        let mut admin = Admin::new(
            "editor".into(),
            "editor@example.com".into(),
            "hash".into(),
            AdminRole::User,
            Permissions::default(),
        );
        admin.set_role(AdminRole::Superuser);
        assert!(admin.is_superuser());
        assert_eq!(admin.permissions(), Permissions::all());
    }

    #[test]
    fn unknown_role_code_is_least_privileged() {
        let mut admin = Admin::new(
            "x".into(),
            "x@example.com".into(),
            "hash".into(),
            AdminRole::Manager,
            Permissions::default(),
        );
        admin.role_code = "overlord".into();
        assert_eq!(admin.role(), AdminRole::User);
    }
}
