use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use shared_types::{AdminRole, AdminRoleResolution, AppError, Session};

use super::roles::resolve_admin_role;
use crate::store::Store;

/// Extractor that requires authentication. Returns 401 without a session.
pub struct AuthRequired(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for AuthRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthRequired)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Extractor that optionally extracts the session. Never fails.
pub struct MaybeAuth(pub Option<Session>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(parts.extensions.get::<Session>().cloned()))
    }
}

/// Extractor that requires an admin role ranked at least `RANK`.
/// Returns 401 if unauthenticated, 403 if the rank is insufficient.
///
/// The admin role is resolved from the store on every request, so a revoked
/// role stops working immediately.
///
/// Rank constants (match `AdminRole::rank`):
/// - 1 = support_admin (any admin)
/// - 7 = platform_admin
/// - 8 = super_admin
pub struct AdminRequired<const RANK: u8> {
    pub session: Session,
    pub admin: AdminRoleResolution,
}

impl<const RANK: u8> AdminRequired<RANK> {
    /// Fails the build for a rank outside the catalog.
    const RANK_IN_CATALOG: () = assert!(
        RANK >= 1 && RANK <= 8,
        "AdminRequired rank must be between 1 and 8"
    );
}

/// Any admin role.
pub type AnyAdmin = AdminRequired<1>;

/// Platform admin or above, the bar for managing roles.
pub type RoleManager = AdminRequired<7>;

impl<const RANK: u8, S> FromRequestParts<S> for AdminRequired<RANK>
where
    Arc<dyn Store>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let () = Self::RANK_IN_CATALOG;
        let Some(required) = AdminRole::from_rank(RANK) else {
            return Err(AppError::forbidden("Admin role required"));
        };
        let store = Arc::<dyn Store>::from_ref(state);
        let admin = resolve_admin_role(store.as_ref(), &session).await;

        if !admin.has_permission(required) {
            tracing::debug!(
                user_id = %session.user_id,
                required = %required,
                "admin rank check failed"
            );
            return Err(AppError::forbidden(format!(
                "{} role or higher required",
                required.label()
            )));
        }

        Ok(AdminRequired { session, admin })
    }
}
