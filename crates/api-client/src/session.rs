//! Session wire types
//!
//! Request and response bodies for the `/auth/*` endpoints, and the user
//! profile the backend returns on login.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Expecting or new mother
    #[default]
    Mother,
    /// Clinical care provider
    Provider,
    /// Community health worker
    Chw,
}

impl Role {
    /// Get the persisted role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mother => "mother",
            Role::Provider => "provider",
            Role::Chw => "chw",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mother" => Ok(Role::Mother),
            "provider" => Ok(Role::Provider),
            "chw" => Ok(Role::Chw),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User profile returned by the backend
///
/// Fields the client does not know about are kept in `extra` so that the
/// profile round-trips through the session store unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Account role
    #[serde(default)]
    pub role: Role,
    /// Any other fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Create a profile with no extra fields
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            extra: serde_json::Map::new(),
        }
    }
}

// Ids come back as strings from some endpoints and numbers from others.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid user id: {}", other))),
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token
    pub token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    /// User profile
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    /// The refresh token, from either `refreshToken` or `refresh`
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .or(self.refresh.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// Refresh request body
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    /// The stored refresh token
    pub token: &'a str,
}

/// Refresh response body
///
/// Only `token` is required to be usable; a rotated refresh token is
/// picked up when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

impl RefreshResponse {
    /// The new access token, if it is usable
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.trim().is_empty())
    }

    /// The rotated refresh token, if any
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .or(self.refresh.as_deref())
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("provider".parse::<Role>().unwrap(), Role::Provider);
        assert_eq!("CHW".parse::<Role>().unwrap(), Role::Chw);
        assert!("doula".parse::<Role>().is_err());
        assert_eq!(Role::Mother.to_string(), "mother");
    }

    #[test]
    fn test_user_profile_keeps_extra_fields() {
        let value = json!({
            "_id": 42,
            "name": "Ama",
            "email": "ama@example.com",
            "role": "mother",
            "dueDate": "2026-12-01"
        });

        let user: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, Role::Mother);
        assert_eq!(user.extra.get("dueDate"), Some(&json!("2026-12-01")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["dueDate"], "2026-12-01");
        assert_eq!(back["id"], "42");
    }

    #[test]
    fn test_user_profile_defaults_role() {
        let user: UserProfile = serde_json::from_value(json!({"id": "u1"})).unwrap();
        assert_eq!(user.role, Role::Mother);
        assert!(user.name.is_empty());
    }

    #[test]
    fn test_login_response_refresh_field_names() {
        let a: LoginResponse =
            serde_json::from_value(json!({"token": "t", "refreshToken": "r1"})).unwrap();
        assert_eq!(a.refresh_token(), Some("r1"));

        let b: LoginResponse = serde_json::from_value(json!({"token": "t", "refresh": "r2"})).unwrap();
        assert_eq!(b.refresh_token(), Some("r2"));

        let c: LoginResponse = serde_json::from_value(json!({"token": "t"})).unwrap();
        assert_eq!(c.refresh_token(), None);
        assert!(c.user.is_none());
    }

    #[test]
    fn test_refresh_response_requires_usable_token() {
        let empty: RefreshResponse = serde_json::from_value(json!({"token": ""})).unwrap();
        assert_eq!(empty.access_token(), None);

        let missing: RefreshResponse = serde_json::from_value(json!({"ok": true})).unwrap();
        assert_eq!(missing.access_token(), None);

        let good: RefreshResponse =
            serde_json::from_value(json!({"token": "new", "refreshToken": "rot"})).unwrap();
        assert_eq!(good.access_token(), Some("new"));
        assert_eq!(good.refresh_token(), Some("rot"));
    }

    #[test]
    fn test_refresh_request_shape() {
        let body = serde_json::to_value(RefreshRequest { token: "r" }).unwrap();
        assert_eq!(body, json!({"token": "r"}));
    }
}
