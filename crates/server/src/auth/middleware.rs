use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use super::jwt::validate_access_token;

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Permissive auth middleware.
///
/// A valid bearer token puts a `Session` into request extensions. Missing or
/// invalid tokens leave the request anonymous; extractors decide whether
/// that is acceptable.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    let session = extract_bearer_token(req.headers()).and_then(|token| {
        validate_access_token(token)
            .map_err(|e| tracing::debug!(error = %e, "rejected bearer token"))
            .ok()
            .map(|claims| claims.session())
    });

    if let Some(session) = session {
        req.extensions_mut().insert(session);
    }

    next.run(req).await
}
