//! Account records. The core treats the username as an opaque key; this
//! module only exists so moderators can log in and submissions carry a
//! user.

use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique username
    pub username: String,

    /// Stored credential (kept as submitted, matching the reference
    /// system; hardening is out of scope)
    pub password: String,

    /// Role label, e.g. "user" or "admin"
    pub role: String,

    /// Banned accounts cannot log in
    #[serde(default)]
    pub banned: bool,
}

impl Account {
    /// Create a new, unbanned account.
    pub fn new(username: String, password: String, role: String) -> Self {
        Self {
            username,
            password,
            role,
            banned: false,
        }
    }
}
