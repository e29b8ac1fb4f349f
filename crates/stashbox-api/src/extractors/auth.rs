//! `AuthUser` extractor: reads the caller identity forwarded by the auth
//! provider and injects a request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use stashbox_core::error::AppError;
use stashbox_core::types::UserId;
use stashbox_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying a caller-supplied correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.user_header.as_str();

        let raw = parts
            .headers
            .get(header)
            .ok_or_else(|| AppError::authentication(format!("Missing {header} header")))?
            .to_str()
            .map_err(|_| AppError::authentication(format!("Invalid {header} header")))?;

        let mut ctx = RequestContext::new(UserId::parse(raw)?);

        if let Some(request_id) = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            ctx = ctx.with_request_id(request_id);
        }

        Ok(AuthUser(ctx))
    }
}
