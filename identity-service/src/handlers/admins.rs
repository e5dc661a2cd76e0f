//! Admin self-service and account management.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{admin::ChangeRoleRequest, ApiResponse, ErrorResponse},
    middleware::AdminClaims,
    models::{Admin, AdminResponse, AdminRole},
    services::{Action, Target},
    utils::ValidatedJson,
    AppState,
};

async fn load_target(state: &AppState, admin_id: Uuid) -> Result<Admin, AppError> {
    state
        .repo
        .find_admin_by_id(admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Admin unidentified")))
}

/// Current admin profile
#[utoipa::path(
    get,
    path = "/admins/me",
    responses(
        (status = 200, description = "Current admin", body = AdminResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Account deactivated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn get_me(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.gate.resolve_admin(&claims).await?;
    Ok(Json(ApiResponse::ok(
        "Admin retrieved successfully",
        admin.sanitized(),
    )))
}

/// Whether the current admin account is active. Reachable while deactivated.
#[utoipa::path(
    get,
    path = "/admins/me/status",
    responses(
        (status = 200, description = "Active flag in `data`", body = bool),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn get_my_status(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.gate.resolve_admin_any_status(&claims).await?;
    let message = if admin.is_active {
        "Your account is active"
    } else {
        "Your account is deactivated"
    };
    Ok(Json(ApiResponse::ok(message, admin.is_active)))
}

/// List every admin
#[utoipa::path(
    get,
    path = "/admins/all",
    responses(
        (status = 200, description = "All admins", body = [AdminResponse]),
        (status = 403, description = "Account deactivated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<impl IntoResponse, AppError> {
    state.gate.admit(&claims, Action::ListAdmins).await?;

    let admins: Vec<AdminResponse> = state
        .repo
        .list_admins()
        .await?
        .iter()
        .map(Admin::sanitized)
        .collect();

    Ok(Json(ApiResponse::ok("Admins retrieved successfully", admins)))
}

#[tracing::instrument(skip(state, claims), fields(target_id = %admin_id))]
async fn set_active(
    state: &AppState,
    claims: &crate::services::TokenClaims,
    admin_id: Uuid,
    active: bool,
) -> Result<Json<ApiResponse<AdminResponse>>, AppError> {
    let actor = state
        .gate
        .admit_role(claims, Action::ChangeAdminStatus)
        .await?;
    let mut target = load_target(state, admin_id).await?;
    state
        .gate
        .authorize(&actor, Action::ChangeAdminStatus, Target::Admin(&target))?;

    let verb = if active { "activated" } else { "deactivated" };
    if target.is_active == active {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Admin account already {}",
            verb
        )));
    }

    target.is_active = active;
    target.updated_utc = Utc::now();
    state.repo.update_admin(&target).await?;

    tracing::info!(
        admin_id = %target.admin_id,
        changed_by = %actor.admin_id,
        is_active = active,
        "Admin status changed"
    );

    Ok(Json(ApiResponse::ok(
        format!("Admin account {} successfully", verb),
        target.sanitized(),
    )))
}

/// Activate an admin account (superuser only)
#[utoipa::path(
    put,
    path = "/admins/{id}/activate",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin activated", body = AdminResponse),
        (status = 400, description = "Already active", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Unknown admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn activate_admin(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(admin_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_active(&state, &claims, admin_id, true).await
}

/// Deactivate an admin account (superuser only)
#[utoipa::path(
    put,
    path = "/admins/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin deactivated", body = AdminResponse),
        (status = 400, description = "Already inactive", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Unknown admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn deactivate_admin(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(admin_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_active(&state, &claims, admin_id, false).await
}

/// Change an admin's role and, optionally, permission bits (superuser only)
#[utoipa::path(
    put,
    path = "/admins/{id}/role",
    params(("id" = Uuid, Path, description = "Admin id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = AdminResponse),
        (status = 400, description = "Superuser role requested", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Unknown admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn change_role(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(admin_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state
        .gate
        .admit_role(&claims, Action::ChangeAdminRole)
        .await?;
    let mut target = load_target(&state, admin_id).await?;
    state
        .gate
        .authorize(&actor, Action::ChangeAdminRole, Target::Admin(&target))?;

    if req.role == AdminRole::Superuser {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "The superuser role cannot be assigned"
        )));
    }

    target.set_role(req.role);
    if let Some(permissions) = req.permissions {
        target.set_permissions(permissions);
    }
    target.updated_utc = Utc::now();
    state.repo.update_admin(&target).await?;

    tracing::info!(
        admin_id = %target.admin_id,
        changed_by = %actor.admin_id,
        role = req.role.as_str(),
        "Admin role changed"
    );

    Ok(Json(ApiResponse::ok(
        "Admin role updated successfully",
        target.sanitized(),
    )))
}
