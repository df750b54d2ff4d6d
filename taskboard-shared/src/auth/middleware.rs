/// Request authentication for Axum
///
/// Turns the `Authorization: Bearer <token>` header into a [`SessionContext`]
/// that handlers read from request extensions. The API crate wires
/// [`authenticate`] into its router with `from_fn_with_state`.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::SessionContext;
///
/// async fn handler(Extension(session): Extension<SessionContext>) -> String {
///     format!("Hello, {}!", session.user_id)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::session::{SessionClaims, SessionError, SessionKeys};
use crate::models::user::UpsertUser;

/// Verified identity of the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// External user id (token `sub`)
    pub user_id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: Option<String>,

    /// Avatar URL
    pub picture: Option<String>,
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        }
    }
}

impl SessionContext {
    /// Profile to sync into the user directory on sign-in
    pub fn to_profile(&self) -> UpsertUser {
        UpsertUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            avatar: self.picture.clone(),
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token verification failed
    #[error("{0}")]
    InvalidToken(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            SessionError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        };
        (status, self.to_string()).into_response()
    }
}

/// Extracts the raw token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Verifies the request's bearer token
pub fn authenticate(headers: &HeaderMap, keys: &SessionKeys) -> Result<SessionContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = keys.verify(token)?;
    Ok(claims.into())
}
