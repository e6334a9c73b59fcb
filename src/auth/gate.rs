use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// User id resolved by [`auth_gate`] from the body `token`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i32);

#[derive(Deserialize)]
struct TokenField {
    #[serde(default)]
    token: Option<String>,
}

/// Reads `token` from the JSON body, verifies it and stores [`AuthUser`] in
/// the request extensions. The body is passed on unchanged; on any failure
/// the handler never runs.
pub async fn auth_gate(State(keys): State<JwtKeys>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "unreadable request body");
            return ApiError::Unauthorized.into_response();
        }
    };

    let token = serde_json::from_slice::<TokenField>(&bytes)
        .ok()
        .and_then(|f| f.token);
    let Some(token) = token else {
        warn!(path = %parts.uri.path(), "missing token");
        return ApiError::Unauthorized.into_response();
    };

    let claims = match keys.verify(&token) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, path = %parts.uri.path(), "invalid token");
            return ApiError::Unauthorized.into_response();
        }
    };

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(AuthUser(claims.user_id));
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(ApiError::Unauthorized)
    }
}
