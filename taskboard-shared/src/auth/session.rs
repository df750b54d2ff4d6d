/// Session token verification
///
/// Sessions are established by the external identity provider, which issues
/// an HS256-signed JWT. This module verifies those tokens and exposes their
/// claims. Issuing is included so tests and local tooling can mint tokens
/// with the same secret.
///
/// # Security
///
/// - **Algorithm**: HS256 only
/// - **Validation**: signature, `exp`, `nbf` and `iss` are all checked
/// - **Secret**: at least 32 bytes, shared with the identity provider
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskboard_shared::auth::session::{SessionClaims, SessionKeys};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = SessionKeys::new("a-secret-of-at-least-thirty-two-bytes", "taskboard");
///
/// let claims = SessionClaims::new("google-oauth2|42", "ada@example.com", keys.issuer(), Duration::hours(1));
/// let token = keys.issue(&claims)?;
///
/// let verified = keys.verify(&token)?;
/// assert_eq!(verified.sub, "google-oauth2|42");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Signature, format or claim check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Claims carried by a session token
///
/// `sub` is the provider's stable identifier for the user and becomes the
/// `user_id` everywhere in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// External user id
    pub sub: String,

    /// Email address
    pub email: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl SessionClaims {
    /// Claims valid from now for `expires_in`
    pub fn new(
        sub: impl Into<String>,
        email: impl Into<String>,
        issuer: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: sub.into(),
            email: email.into(),
            name: None,
            picture: None,
            iss: issuer.into(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the avatar URL
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signing and verification keys for one issuer
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Keys derived from a shared secret
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Signs `claims` with HS256
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| SessionError::Create(e.to_string()))
    }

    /// Verifies signature, validity window and issuer
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                ErrorKind::InvalidIssuer => SessionError::InvalidIssuer,
                _ => SessionError::Invalid(e.to_string()),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(SessionError::Invalid("empty subject".to_string()));
        }

        Ok(data.claims)
    }
}
