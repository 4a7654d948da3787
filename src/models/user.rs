// src/models/user.rs
// DOCUMENTATION: User account and API token models
// PURPOSE: Database rows plus request/response DTOs for the user API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a user row from the database
/// DOCUMENTATION: `password` is the encoded hash, never the raw password
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

/// Opaque API token, one per user
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

/// Request DTO for POST /api/user/create
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email, length(max = 255))]
    pub email: String,

    #[validate(length(min = 5))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
}

/// Request DTO for PUT/PATCH /api/user/me
/// DOCUMENTATION: Absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,

    #[validate(length(min = 5))]
    pub password: Option<String>,

    #[validate(length(max = 255))]
    pub name: Option<String>,
}

/// Request DTO for POST /api/user/token
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// User DTO exposed via API
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

impl User {
    /// Convert database User into API response
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        let req = CreateUserRequest {
            email: "test@example.com".into(),
            password: "pw".into(),
            name: "Test Name".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let req = CreateUserRequest {
            email: "".into(),
            password: "test123pass".into(),
            name: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_partial_update_validates_present_fields_only() {
        let req = UpdateUserRequest {
            name: Some("Updated".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let req = UpdateUserRequest {
            password: Some("abc".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_has_no_password() {
        let user = User {
            id: 1,
            email: "test@example.com".into(),
            name: "Test".into(),
            password: "pbkdf2_sha256$1$salt$hash".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now(),
        };

        let value = serde_json::to_value(user.to_response()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "test@example.com");
    }
}
