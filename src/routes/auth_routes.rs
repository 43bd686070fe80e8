//! Registration and login endpoints
//!
//! - POST /api/register - create credentials, answer with a signed token
//! - POST /api/login    - verify credentials, answer with a signed token
//!
//! Token issuance happens only here; everything behind these endpoints
//! sees identity exclusively as verified [`crate::auth::Claims`].

use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::{error_response, json_response, parse_json_body, BoxBody};
use crate::server::AppState;
use crate::types::AgoraError;
use crate::users::UserRecord;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn token_response(
    state: &AppState,
    user: &UserRecord,
    status: StatusCode,
) -> Response<BoxBody> {
    match state.jwt.issue_token(&user.claims()) {
        Ok(token) => json_response(status, &TokenResponse { token }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/register
pub async fn register(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: CredentialsRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state.users.register(&body.username, &body.password) {
        Ok(user) => token_response(&state, &user, StatusCode::CREATED),
        Err(e) => {
            warn!(user = %body.username, "Registration rejected: {}", e);
            error_response(&e)
        }
    }
}

/// POST /api/login
pub async fn login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: CredentialsRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state.users.login(&body.username, &body.password) {
        Ok(user) => token_response(&state, &user, StatusCode::OK),
        Err(e) => {
            warn!(user = %body.username, "Login failed");
            match e {
                // credential failures surface as 401, not 403
                AgoraError::Forbidden(msg) => json_response(
                    StatusCode::UNAUTHORIZED,
                    &super::ErrorResponse { error: msg },
                ),
                other => error_response(&other),
            }
        }
    }
}
