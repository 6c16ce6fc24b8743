use std::net::SocketAddr;

use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    server::telemetry::init_tracing();

    server::config::load_config();
    let flags = server::config::feature_flags();
    if flags.telemetry {
        server::telemetry::init_telemetry();
    }
    server::health::record_start_time();

    let pool = match server::db::create_pool() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to create database pool");
            std::process::exit(1);
        }
    };
    if let Err(e) = server::db::run_migrations(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    let state = server::db::AppState::postgres(pool, flags.mailgun);
    let mut router = server::openapi::api_router(state);

    if flags.telemetry {
        router = router.layer(server::telemetry::OtelTraceLayer);
    } else {
        router = router.layer(TraceLayer::new_for_http());
    }

    let max_body: usize = std::env::var("MAX_BODY_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1024 * 1024);

    let router = router
        .layer(axum::extract::DefaultBodyLimit::max(max_body))
        .layer(axum::middleware::from_fn(
            server::auth::middleware::auth_middleware,
        ))
        .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
        .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
            tower_http::request_id::MakeRequestUuid,
        ));

    let addr: SocketAddr = match std::env::var("BIND_ADDR") {
        Ok(addr) => match addr.parse() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(%addr, error = %e, "invalid BIND_ADDR");
                std::process::exit(1);
            }
        },
        Err(_) => {
            let port: u16 = std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080);
            SocketAddr::from(([0, 0, 0, 0], port))
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "stazy server listening");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
