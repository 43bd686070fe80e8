//! Verified caller identity
//!
//! A `Claims` value is produced once per authenticated request by the
//! token verifier and passed by value into every mutating store call.
//! The store never holds a live reference to it; author fields on posts
//! and comments are independent snapshots.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Verified identity attached to an authenticated request.
///
/// Equality and hashing go by subject `id` only - the display name is
/// presentation data and takes no part in identity comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque subject id
    pub id: String,
    /// Display name
    pub username: String,
}

impl Claims {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl PartialEq for Claims {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Claims {}

impl Hash for Claims {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_subject_id() {
        let a = Claims::new("u1", "alice");
        let b = Claims::new("u1", "alice-renamed");
        let c = Claims::new("u2", "alice");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_json_shape() {
        let claims = Claims::new("u1", "alice");
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json, serde_json::json!({"id": "u1", "username": "alice"}));
    }
}
