/// User model
///
/// A cached projection of the external identity's profile. The external
/// identity string (`user_id`) is the natural key; there is no internal id.
/// Users are created lazily on first sign-in and refreshed on every later one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id TEXT PRIMARY KEY,
///     email TEXT NOT NULL,
///     name TEXT,
///     avatar TEXT,
///     created_at BIGINT NOT NULL,
///     last_seen BIGINT NOT NULL
/// );
/// CREATE INDEX idx_users_email ON users (email);
/// ```
///
/// # Example
///
/// ```
/// use taskboard_shared::models::user::UpsertUser;
/// use validator::Validate;
///
/// let profile = UpsertUser {
///     user_id: "user_2abc".to_string(),
///     email: "a@x.com".to_string(),
///     name: Some("Ada".to_string()),
///     avatar: None,
/// };
/// assert!(profile.validate().is_ok());
/// ```

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// External identity string (unique)
    pub user_id: String,

    /// Email address from the identity provider
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional avatar URL
    pub avatar: Option<String>,

    /// First sign-in (epoch ms)
    pub created_at: i64,

    /// Most recent sign-in or touch (epoch ms)
    pub last_seen: i64,
}

/// Input for creating or refreshing a user
///
/// `name` and `avatar` left as `None` keep whatever the stored record has.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertUser {
    /// External identity string
    #[validate(length(min = 1, message = "User id must not be empty"))]
    pub user_id: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// Optional avatar URL
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str, avatar: Option<&str>) -> UpsertUser {
        UpsertUser {
            user_id: "u1".to_string(),
            email: email.to_string(),
            name: None,
            avatar: avatar.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_profile() {
        assert!(profile("a@x.com", Some("https://img.example.com/a.png"))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let errors = profile("not-an-email", None).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_invalid_avatar_rejected() {
        let errors = profile("a@x.com", Some("not a url")).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("avatar"));
    }

    #[test]
    fn test_user_serializes_snake_case() {
        let user = User {
            user_id: "u1".to_string(),
            email: "a@x.com".to_string(),
            name: None,
            avatar: None,
            created_at: 1,
            last_seen: 2,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["last_seen"], 2);
    }
}
