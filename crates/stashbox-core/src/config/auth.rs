//! Caller identity configuration.
//!
//! Authentication itself happens upstream; Stashbox only trusts the
//! identity header the gateway forwards.

use serde::{Deserialize, Serialize};

/// Identity propagation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Request header carrying the authenticated user id.
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
        }
    }
}

fn default_user_header() -> String {
    "x-user-id".to_string()
}
