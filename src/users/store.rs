//! In-memory user registry
//!
//! Volatile credential store keyed by unique username. Register hashes the
//! password with Argon2id; login answers a single hashed-credential lookup
//! with a deliberately generic failure so usernames cannot be enumerated.

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, Claims};
use crate::types::{AgoraError, Result};

/// A registered user record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub password_hash: String,
}

impl UserRecord {
    /// Identity snapshot for token issuance
    pub fn claims(&self) -> Claims {
        Claims::new(self.id.clone(), self.name.clone())
    }
}

/// Thread-safe user registry, indexed by username
#[derive(Default)]
pub struct UserStore {
    users: DashMap<String, UserRecord>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user.
    ///
    /// Fails with `Conflict` if the username is already taken. The entry
    /// API keeps check-and-insert atomic under concurrent registration.
    pub fn register(&self, name: &str, password: &str) -> Result<UserRecord> {
        if name.is_empty() || password.is_empty() {
            return Err(AgoraError::Validation(
                "username and password are required".into(),
            ));
        }

        let password_hash = hash_password(password)?;

        match self.users.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(AgoraError::Conflict(format!(
                "user '{}' is already registered",
                name
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    password_hash,
                };
                slot.insert(record.clone());
                info!(user = name, "Registered new user");
                Ok(record)
            }
        }
    }

    /// Authenticate by username and password.
    ///
    /// Unknown user and wrong password produce the same generic error.
    pub fn login(&self, name: &str, password: &str) -> Result<UserRecord> {
        let invalid = || AgoraError::Forbidden("invalid username or password".into());

        let record = self.users.get(name).ok_or_else(invalid)?.clone();

        if !verify_password(password, &record.password_hash)? {
            return Err(invalid());
        }

        Ok(record)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
