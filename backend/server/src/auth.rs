//! Caller identity.
//!
//! Authentication happens upstream. The proxy in front of this server forwards the
//! authenticated identity in a header (`IDENTITY_HEADER`). When `PROXY_SECRET` is set the
//! proxy must also send it in `x-proxy-secret`, otherwise the identity header is ignored.
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{error::AppError, state::State};

pub const PROXY_SECRET_HEADER: &str = "x-proxy-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl FromRequestParts<Arc<State>> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<State>) -> Result<Self, Self::Rejection> {
        if let Some(secret) = &state.config.proxy_secret {
            if header(parts, PROXY_SECRET_HEADER) != Some(secret.as_str()) {
                warn!("Rejected request without a valid proxy secret");
                return Err(AppError::Unauthorized);
            }
        }

        header(parts, &state.config.identity_header)
            .map(|identity| Caller(identity.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
