//! HTTP server implementation
//!
//! hyper http1 accept loop with `TokioIo`; one task per connection, manual
//! method/path routing. All state is in memory, so request handling never
//! waits on anything but the body read.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::forum::PostStore;
use crate::routes::{self, BoxBody};
use crate::types::AgoraError;
use crate::users::UserStore;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub jwt: JwtValidator,
    pub users: UserStore,
    pub posts: PostStore,
}

impl AppState {
    pub fn new(args: Args) -> Result<Self, AgoraError> {
        let jwt = if args.dev_mode {
            JwtValidator::new_dev()
        } else {
            let secret = args.jwt_secret.clone().ok_or_else(|| {
                AgoraError::Config("JWT_SECRET is required in production mode".into())
            })?;
            JwtValidator::new(secret, args.jwt_expiry_seconds)?
        };

        Ok(Self {
            args,
            jwt,
            users: UserStore::new(),
            posts: PostStore::new(),
        })
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), AgoraError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Agora listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled - using the insecure dev JWT secret");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(state),

        (Method::OPTIONS, _) => preflight_response(),

        (_, p) if p.starts_with("/api/") => routes::handle_api_request(req, state).await,

        _ => not_found_response(&path),
    };

    Ok(response)
}

fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// CORS preflight response
fn preflight_response() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS")
        .header("Access-Control-Max-Age", "86400")
        .body(full_body(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<BoxBody> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(full_body(body.to_string()))
        .unwrap()
}
