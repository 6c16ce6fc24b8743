use axum::extract::FromRef;
use shared_types::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::error_convert::SqlxErrorExt;
use crate::mailgun::MailgunMailer;
use crate::repo::PgStore;
use crate::store::{Mailer, Store};

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract `State<Arc<dyn Store>>` directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// `None` when email delivery is switched off.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self { store, mailer }
    }

    /// Postgres-backed state, with Mailgun when the feature flag is on.
    pub fn postgres(pool: Pool<Postgres>, mailgun_enabled: bool) -> Self {
        let mailer: Option<Arc<dyn Mailer>> = if mailgun_enabled {
            Some(Arc::new(MailgunMailer))
        } else {
            None
        };
        Self::new(Arc::new(PgStore::new(pool)), mailer)
    }
}

/// Create a new database connection pool from environment variables.
/// Uses `connect_lazy` so no connections open until the first query.
pub fn create_pool() -> Result<Pool<Postgres>, AppError> {
    // Load .env file if present (ignored in production where env vars are set directly).
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| AppError::internal("DATABASE_URL must be set"))?;

    let max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&database_url)
        .map_err(SqlxErrorExt::into_app_error)
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::database(format!("migration failed: {e}")))
}
