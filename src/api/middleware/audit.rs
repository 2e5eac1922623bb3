//! Audit logging middleware.
//!
//! Logs every API request with method, path, status and latency, and
//! records it in the bounded audit buffer on `CoreState`.

use std::time::Instant;

use axum::extract::OriginalUri;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ApiContext;
use crate::core_state::AuditEntry;

/// Accesses `ApiContext` from request extensions.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    // Nested routers strip their prefix from `uri()`; log the full path.
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let ctx = req.extensions().get::<ApiContext>().cloned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    tracing::info!(%method, %path, status, latency_ms, "API request");

    if let Some(ctx) = ctx {
        ctx.core.log_access(AuditEntry {
            timestamp: chrono::Utc::now(),
            method,
            path,
            status,
            latency_ms,
        });
    }

    response
}
