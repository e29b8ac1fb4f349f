//! File tree rules.

use serde::{Deserialize, Serialize};

/// Limits and visibility rules for the file tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum nesting depth, which also caps every ancestor walk.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Answer `Forbidden` instead of `NotFound` when a caller touches a
    /// node owned by someone else. Off by default so existence never leaks.
    #[serde(default)]
    pub reveal_foreign_nodes: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            reveal_foreign_nodes: false,
        }
    }
}

fn default_max_depth() -> usize {
    64
}
