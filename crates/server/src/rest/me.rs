use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared_types::{AppError, AppRole, AssignSignupRoleRequest, RolesResponse, UserRoleAssignment};

use crate::auth::extractors::AuthRequired;
use crate::auth::roles::resolve_effective_roles;
use crate::store::Store;

/// GET /api/me/roles
///
/// Effective application and admin roles for the caller. Lookup failures
/// resolve to the safe defaults rather than an error.
#[utoipa::path(
    get,
    path = "/api/me/roles",
    responses(
        (status = 200, description = "Effective roles", body = RolesResponse),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "roles"
)]
pub async fn my_roles(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
) -> Json<RolesResponse> {
    let roles = resolve_effective_roles(store.as_ref(), &session).await;
    Json(RolesResponse::from_effective(session.user_id, &roles))
}

/// POST /api/users/role
///
/// Record the role chosen at signup. Only tenant and property owner can be
/// chosen; the call fails once a role exists.
#[utoipa::path(
    post,
    path = "/api/users/role",
    request_body = AssignSignupRoleRequest,
    responses(
        (status = 201, description = "Role assigned", body = UserRoleAssignment),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 409, description = "Role already assigned", body = AppError)
    ),
    tag = "roles"
)]
pub async fn assign_signup_role(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
    Json(body): Json<AssignSignupRoleRequest>,
) -> Result<(StatusCode, Json<UserRoleAssignment>), AppError> {
    let role = AppRole::signup_choice(body.role);
    if body.role.is_some_and(|requested| requested != role) {
        tracing::warn!(user_id = %session.user_id, requested = ?body.role, "signup role downgraded to tenant");
    }

    let assignment = store
        .claim_signup_role(session.user_id, role)
        .await?
        .ok_or_else(|| AppError::conflict("A role has already been assigned"))?;
    Ok((StatusCode::CREATED, Json(assignment)))
}
