use crate::core::error::SyncError;
use crate::models::Validate;
use crate::validation::fields::require_fields;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logged-in principal as returned by the login endpoints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub category_id: i64,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdminRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `{token, admin}` or `{token, user}`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(alias = "admin")]
    pub user: Identity,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[("email", self.email.as_str()), ("password", self.password.as_str())])
    }
}

impl Validate for UserRegistration {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("password", self.password.as_str()),
        ])
    }
}

impl Validate for AdminRegistration {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_accepts_admin_key() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"token":"abc","admin":{"admin_id":1,"name":"Root","email":"root@x.org"}}"#,
        )
        .unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.admin_id, Some(1));
    }

    #[test]
    fn test_login_response_accepts_user_key() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"token":"abc","user":{"user_id":9,"name":"Sara","category_id":2}}"#,
        )
        .unwrap();
        assert_eq!(resp.user.user_id, Some(9));
    }

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse("guest"), None);
    }

    #[test]
    fn test_credentials_require_password() {
        let creds = Credentials {
            email: "a@b.org".to_string(),
            password: String::new(),
        };
        assert!(creds.validate().is_err());
    }
}
