//! Authentication boundary
//!
//! Verifies bearer tokens and turns them into [`Claims`] - the identity
//! value threaded through every mutating store call. Failures are typed
//! ([`crate::types::AuthError`]); they never originate inside the store.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::Claims;
pub use jwt::{bearer_token, JwtValidator};
pub use password::{hash_password, verify_password};
