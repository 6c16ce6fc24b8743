use shared_types::{decide, AccessDecision, ProtectedView, Session};

use super::roles::resolve_effective_roles;
use crate::store::RoleStore;

/// Server-side gate decision for one view. Resolution always completes here,
/// so the result is never `Resolving`.
pub async fn evaluate_view<S>(
    store: &S,
    session: Option<&Session>,
    view: ProtectedView,
) -> AccessDecision
where
    S: RoleStore + ?Sized,
{
    let roles = match session {
        Some(session) => Some(resolve_effective_roles(store, session).await),
        None => None,
    };
    let state = decide(view, session, roles.as_ref());
    tracing::debug!(view = view.as_str(), ?state, "access evaluated");
    AccessDecision::new(view, state)
}
