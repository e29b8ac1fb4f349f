//! Request context carrying the identity of the caller.

use serde::{Deserialize, Serialize};

use stashbox_core::types::UserId;

/// Context for the current request.
///
/// Built by the API extractor (or the CLI) from the identity the auth
/// provider vouched for, and passed into every service method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The requesting user's identity.
    pub user_id: UserId,
    /// Correlation id recorded on mutation logs, when the caller supplied one.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            request_id: None,
        }
    }

    /// Attach a correlation id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
