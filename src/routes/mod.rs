//! HTTP routes for Agora
//!
//! The `/api` surface dispatches here; shared response and body helpers
//! live in this module so the route files stay focused on semantics.

pub mod auth_routes;
pub mod health;
pub mod posts;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{bearer_token, Claims};
use crate::server::AppState;
use crate::types::AgoraError;

pub use health::health_check;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// Map a typed error to its wire shape
pub(crate) fn error_response(err: &AgoraError) -> Response<BoxBody> {
    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.to_string(),
        },
    )
}

pub(crate) fn not_found() -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: "Not found".into(),
        },
    )
}

pub(crate) fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            error: "Method not allowed".into(),
        },
    )
}

/// Read and decode a JSON request body, with a size cap.
pub(crate) async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, AgoraError> {
    let body = req
        .collect()
        .await
        .map_err(|e| AgoraError::Validation(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 65536 {
        return Err(AgoraError::Validation("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| AgoraError::Validation(format!("Invalid JSON: {}", e)))
}

/// Verify the bearer token on a request and extract the caller identity.
///
/// This is the single place where the authentication boundary feeds the
/// store: every mutating handler calls through here before touching state.
pub(crate) fn authenticate(
    req: &Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<Claims, AgoraError> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = bearer_token(header)?;
    Ok(state.jwt.verify_token(token)?)
}

/// Dispatch an `/api/*` request.
pub async fn handle_api_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_string();
    let segments: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(ToString::to_string)
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (&method, segments.as_slice()) {
        (&Method::POST, ["api", "register"]) => auth_routes::register(req, state).await,
        (&Method::POST, ["api", "login"]) => auth_routes::login(req, state).await,
        (_, ["api", "register" | "login"]) => method_not_allowed(),

        (&Method::GET, ["api", "posts"]) => posts::list(state),
        (&Method::POST, ["api", "posts"]) => posts::create(req, state).await,
        (&Method::GET, ["api", "posts", category]) => posts::list_by_category(state, category),

        (&Method::GET, ["api", "post", id, action @ ("upvote" | "downvote" | "unvote")]) => {
            posts::vote(&req, state, id, action)
        }
        (&Method::GET, ["api", "post", id]) => posts::get(state, id),
        (&Method::DELETE, ["api", "post", id]) => posts::delete(&req, state, id),
        (&Method::POST, ["api", "post", id]) => {
            let id = id.to_string();
            posts::add_comment(req, state, &id).await
        }
        (&Method::DELETE, ["api", "post", id, comment_id]) => {
            posts::delete_comment(&req, state, id, comment_id)
        }

        (&Method::GET, ["api", "user", username]) => posts::list_by_author(state, username),

        _ => not_found(),
    }
}
