/// Session authentication
///
/// Taskboard does not manage credentials. Users sign in with an external
/// identity provider, which hands the client a signed session token; every
/// API request carries that token.
///
/// # Modules
///
/// - [`session`]: HS256 token verification (and issuing, for tests and tooling)
/// - [`middleware`]: bearer header parsing and the per-request [`middleware::SessionContext`]
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use taskboard_shared::auth::middleware::authenticate;
/// use taskboard_shared::auth::session::{SessionClaims, SessionKeys};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = SessionKeys::new("a-secret-of-at-least-thirty-two-bytes", "taskboard");
/// let token = keys.issue(&SessionClaims::new("u1", "a@x.com", "taskboard", Duration::hours(1)))?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
///
/// let session = authenticate(&headers, &keys)?;
/// assert_eq!(session.user_id, "u1");
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod session;
