use shared_types::{
    select_app_role, select_effective_admin, AdminGrant, AdminRoleAssignment, AdminRoleResolution,
    AppRole, AppRoleResolution, EffectiveRoles, LookupOutcome, Session, UserRoleAssignment,
};

use crate::store::RoleStore;

/// Resolve the application role for a session.
///
/// - No rows: `tenant`.
/// - Lookup error or an unrecognized stored role: `tenant`, logged.
/// - Otherwise the oldest row wins.
pub async fn resolve_app_role<S>(store: &S, session: &Session) -> AppRoleResolution
where
    S: RoleStore + ?Sized,
{
    let rows = match store.user_roles(session.user_id).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "app role lookup failed, defaulting to tenant");
            return AppRoleResolution::defaulted(LookupOutcome::LookupFailed);
        }
    };

    let mut typed = Vec::with_capacity(rows.len());
    for row in &rows {
        match AppRole::parse(&row.role) {
            Some(role) => typed.push(UserRoleAssignment {
                user_id: row.user_id,
                role,
                created_at: row.created_at,
            }),
            None => {
                tracing::warn!(user_id = %session.user_id, role = %row.role, "unrecognized app role, defaulting to tenant");
                return AppRoleResolution::defaulted(LookupOutcome::LookupFailed);
            }
        }
    }

    match select_app_role(&typed) {
        Some(row) => AppRoleResolution::found(row.role),
        None => AppRoleResolution::defaulted(LookupOutcome::NoRows),
    }
}

/// Resolve the effective admin role for a session.
///
/// Errors never grant privilege. Rows with unknown role names are skipped.
pub async fn resolve_admin_role<S>(store: &S, session: &Session) -> AdminRoleResolution
where
    S: RoleStore + ?Sized,
{
    let rows = match store.admin_roles_for(session.user_id).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "admin role lookup failed, treating as non-admin");
            return AdminRoleResolution::none(LookupOutcome::LookupFailed);
        }
    };

    let typed: Vec<AdminRoleAssignment> = rows
        .iter()
        .filter_map(|row| {
            let parsed = row.parse();
            if parsed.is_none() {
                tracing::warn!(assignment_id = %row.id, role = %row.admin_role, "skipping unrecognized admin role");
            }
            parsed
        })
        .collect();

    match select_effective_admin(&typed) {
        Some(row) => AdminRoleResolution::granted(AdminGrant::from(row)),
        None => AdminRoleResolution::none(LookupOutcome::NoRows),
    }
}

/// Both resolutions, run concurrently.
pub async fn resolve_effective_roles<S>(store: &S, session: &Session) -> EffectiveRoles
where
    S: RoleStore + ?Sized,
{
    let (app, admin) = tokio::join!(
        resolve_app_role(store, session),
        resolve_admin_role(store, session)
    );
    EffectiveRoles { app, admin }
}
