//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::{AppState, StoreKind};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub store: StoreKind,
    pub posts: Option<u64>,
}

/// Health check endpoint - server status plus a post count as a store probe.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, posts) = match state.content.stats().await {
        Ok(stats) => ("ok", Some(stats.total)),
        Err(e) => {
            tracing::warn!(error = %e, "Health probe could not reach the post store");
            ("degraded", None)
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: state.store,
        posts,
    };

    if posts.is_some() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
