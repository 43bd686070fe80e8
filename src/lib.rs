//! Agora - discussion forum service
//!
//! An in-memory, single-process forum: users register and authenticate,
//! publish posts, comment, and vote. The interesting part is the
//! concurrent aggregate store ([`forum`]) and the claims contract
//! ([`auth`]) that carries verified identity into its mutating calls.

pub mod auth;
pub mod config;
pub mod forum;
pub mod routes;
pub mod server;
pub mod types;
pub mod users;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{AgoraError, AuthError, Result};
