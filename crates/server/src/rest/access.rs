use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use shared_types::{AccessDecision, AppError, ProtectedView};

use crate::auth::access::evaluate_view;
use crate::auth::extractors::MaybeAuth;
use crate::store::Store;

/// GET /api/access/{view}
///
/// Gate decision for a protected view. Always 200; the decision carries the
/// redirect target when access is denied.
#[utoipa::path(
    get,
    path = "/api/access/{view}",
    params(
        ("view" = String, Path, description = "View name, e.g. `admin-console`")
    ),
    responses(
        (status = 200, description = "Gate decision", body = AccessDecision),
        (status = 404, description = "Unknown view", body = AppError)
    ),
    tag = "roles"
)]
pub async fn check_access(
    State(store): State<Arc<dyn Store>>,
    MaybeAuth(session): MaybeAuth,
    Path(view): Path<String>,
) -> Result<Json<AccessDecision>, AppError> {
    let view = ProtectedView::parse(&view)
        .ok_or_else(|| AppError::not_found(format!("Unknown view '{view}'")))?;
    Ok(Json(evaluate_view(store.as_ref(), session.as_ref(), view).await))
}
