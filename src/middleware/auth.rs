use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{AuthError, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Paths reachable without a bearer token. Matched exactly.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/health",
    "/auth/signup",
    "/auth/login",
    "/auth/refresh",
    "/auth/user",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// JWT authentication middleware that validates tokens and injects the caller
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let user = bearer_token(request.headers())
        .and_then(|token| state.tokens.verify(token))
        .map_err(|err| {
            debug!(path = request.uri().path(), "Rejected request: {}", err);
            ApiError::from(err)
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Handlers take the verified caller as a parameter. Absent only if a route
/// was mounted outside the gate, which is answered with 401.
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
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}
