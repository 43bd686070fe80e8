//! Liveness probe
//!
//! GET /health - 200 whenever the process is serving. The store is
//! in-memory and has no external collaborators to report on beyond
//! simple occupancy counters.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::{full_body, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub timestamp: String,
    pub posts: usize,
    pub users: usize,
}

/// Handle GET /health
pub fn health_check(state: Arc<AppState>) -> Response<BoxBody> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        posts: state.posts.post_count(),
        users: state.users.user_count(),
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"healthy":true}"#.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full_body(body))
        .unwrap()
}
