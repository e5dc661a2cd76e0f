//! Declarative admin authorization policy.
//!
//! Each action maps to one row: which roles may attempt it, what must hold
//! about the target, and which permission bit the actor needs. `evaluate`
//! walks a row in that order and stops at the first failure.

use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Admin, AdminRole, Permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RegisterAdmin,
    ListAdmins,
    ChangeAdminStatus,
    ChangeAdminRole,
    CreateBlog,
    ReadDrafts,
    UpdateBlog,
    DeleteBlog,
}

#[derive(Debug, Clone, Copy)]
pub enum RoleRequirement {
    Any,
    OneOf(&'static [AdminRole]),
}

#[derive(Debug, Clone, Copy)]
pub enum TargetRule {
    None,
    /// Target admin must not be a superuser.
    NotSuperuser,
    /// Actor authored the resource, or holds one of the listed roles.
    AuthorOr(&'static [AdminRole]),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub action: Action,
    pub roles: RoleRequirement,
    pub target: TargetRule,
    pub permission: Option<Permission>,
    pub role_denial: &'static str,
    pub target_denial: &'static str,
    pub permission_denial: &'static str,
}

const NO_ACCESS: &str = "You don't have access to this resource.";

pub static POLICY: &[Rule] = &[
    Rule {
        action: Action::RegisterAdmin,
        roles: RoleRequirement::OneOf(&[AdminRole::Superuser]),
        target: TargetRule::None,
        permission: None,
        role_denial: NO_ACCESS,
        target_denial: NO_ACCESS,
        permission_denial: NO_ACCESS,
    },
    Rule {
        action: Action::ListAdmins,
        roles: RoleRequirement::Any,
        target: TargetRule::None,
        permission: None,
        role_denial: NO_ACCESS,
        target_denial: NO_ACCESS,
        permission_denial: NO_ACCESS,
    },
    Rule {
        action: Action::ChangeAdminStatus,
        roles: RoleRequirement::OneOf(&[AdminRole::Superuser]),
        target: TargetRule::NotSuperuser,
        permission: None,
        role_denial: NO_ACCESS,
        target_denial: "A superuser cannot activate or deactivate another superuser",
        permission_denial: NO_ACCESS,
    },
    Rule {
        action: Action::ChangeAdminRole,
        roles: RoleRequirement::OneOf(&[AdminRole::Superuser]),
        target: TargetRule::NotSuperuser,
        permission: None,
        role_denial: NO_ACCESS,
        target_denial: "A superuser's role cannot be changed",
        permission_denial: NO_ACCESS,
    },
    Rule {
        action: Action::CreateBlog,
        roles: RoleRequirement::Any,
        target: TargetRule::None,
        permission: Some(Permission::Create),
        role_denial: NO_ACCESS,
        target_denial: NO_ACCESS,
        permission_denial: "You do not have permission to create this resource",
    },
    Rule {
        action: Action::ReadDrafts,
        roles: RoleRequirement::Any,
        target: TargetRule::None,
        permission: Some(Permission::Read),
        role_denial: NO_ACCESS,
        target_denial: NO_ACCESS,
        permission_denial: "You do not have permission to read this resource",
    },
    Rule {
        action: Action::UpdateBlog,
        roles: RoleRequirement::Any,
        target: TargetRule::AuthorOr(&[AdminRole::Admin, AdminRole::Superuser]),
        permission: Some(Permission::Update),
        role_denial: NO_ACCESS,
        target_denial: "You are not authorized to update this blog",
        permission_denial: "You do not have permission to update this resource",
    },
    Rule {
        action: Action::DeleteBlog,
        roles: RoleRequirement::Any,
        target: TargetRule::AuthorOr(&[AdminRole::Superuser]),
        permission: Some(Permission::Delete),
        role_denial: NO_ACCESS,
        target_denial: "You are not authorized to delete this blog",
        permission_denial: "You do not have permission to delete this resource",
    },
];

/// What an action is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    None,
    Admin(&'a Admin),
    Authored { author_id: Uuid },
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Denial {
    pub message: &'static str,
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        AppError::Forbidden(anyhow::anyhow!(denial.message))
    }
}

pub fn rule_for(action: Action) -> Option<&'static Rule> {
    POLICY.iter().find(|rule| rule.action == action)
}

fn check_role(rule: &Rule, role: AdminRole) -> Result<(), Denial> {
    match rule.roles {
        RoleRequirement::OneOf(roles) if !roles.contains(&role) => Err(Denial {
            message: rule.role_denial,
        }),
        _ => Ok(()),
    }
}

/// Role step only. Lets callers reject an actor before looking up a target.
pub fn evaluate_role(actor: &Admin, action: Action) -> Result<(), Denial> {
    let rule = rule_for(action).ok_or(Denial { message: NO_ACCESS })?;
    check_role(rule, actor.role())
}

/// Decide whether an already-resolved, active admin may perform `action`.
pub fn evaluate(actor: &Admin, action: Action, target: Target<'_>) -> Result<(), Denial> {
    let rule = rule_for(action).ok_or(Denial { message: NO_ACCESS })?;
    let role = actor.role();

    check_role(rule, role)?;

    let target_ok = match (rule.target, target) {
        (TargetRule::None, _) => true,
        (TargetRule::NotSuperuser, Target::Admin(admin)) => !admin.is_superuser(),
        (TargetRule::AuthorOr(roles), Target::Authored { author_id }) => {
            author_id == actor.admin_id || roles.contains(&role)
        }
        // A rule that needs a target was given the wrong kind.
        _ => false,
    };
    if !target_ok {
        return Err(Denial {
            message: rule.target_denial,
        });
    }

    if let Some(permission) = rule.permission {
        if !actor.permissions().allows(permission) {
            return Err(Denial {
                message: rule.permission_denial,
            });
        }
    }

    Ok(())
}
