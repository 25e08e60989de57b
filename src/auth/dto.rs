use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

/// Request body for user registration. Fields are optional so a missing one
/// becomes our own 400 instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub user: PublicUser,
}

/// Success envelope: `{success: true, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            success: true,
            message,
            data: None,
        }
    }
}

/// Missing and empty strings are both "not provided".
pub(crate) fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_never_carries_password() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            password_hash: "$argon2id$v=19$secret-material".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["email"], "jane@x.com");
        assert!(json["createdAt"].is_string());
        assert!(!json.to_string().contains("secret-material"));

        // the record itself also skips the hash when serialized
        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("password"));
    }

    #[test]
    fn register_request_reads_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"fullName":"Jane Doe","email":"jane@x.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name.as_deref(), Some("Jane Doe"));

        let partial: RegisterRequest = serde_json::from_str(r#"{"email":"jane@x.com"}"#).unwrap();
        assert!(partial.full_name.is_none());
        assert!(partial.password.is_none());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        assert_eq!(provided(&Some("x".into())), Some("x"));
        assert_eq!(provided(&Some(String::new())), None);
        assert_eq!(provided(&None), None);
    }
}
