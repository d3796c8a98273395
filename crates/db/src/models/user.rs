//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::de::empty_as_none;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::Caller;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validators::{
    validate_email, validate_max_length, validate_username, NAME_FIELD_SIZE,
};

/// Full user row from the `users` table.
///
/// `last_login` is bound into confirmation codes, so it must never be
/// exposed. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub is_staff: bool,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parsed role. The `ck_users_role` constraint guarantees a known value.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    /// The identity used by permission checks.
    pub fn to_caller(&self) -> Caller {
        Caller {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role(),
            is_staff: self.is_staff,
        }
    }
}

/// Public user representation.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role,
        }
    }
}

/// DTO for creating a user (admin endpoint, signup and import).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateUser {
    /// A plain `user` account with empty profile fields.
    pub fn signup(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::User,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_username(&self.username).map_err(|e| CoreError::field("username", e))?;
        validate_email(&self.email).map_err(|e| CoreError::field("email", e))?;
        validate_max_length(&self.first_name, NAME_FIELD_SIZE)
            .map_err(|e| CoreError::field("first_name", e))?;
        validate_max_length(&self.last_name, NAME_FIELD_SIZE)
            .map_err(|e| CoreError::field("last_name", e))?;
        Ok(())
    }
}

/// DTO for partially updating a user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(username) = &self.username {
            validate_username(username).map_err(|e| CoreError::field("username", e))?;
        }
        if let Some(email) = &self.email {
            validate_email(email).map_err(|e| CoreError::field("email", e))?;
        }
        if let Some(first_name) = &self.first_name {
            validate_max_length(first_name, NAME_FIELD_SIZE)
                .map_err(|e| CoreError::field("first_name", e))?;
        }
        if let Some(last_name) = &self.last_name {
            validate_max_length(last_name, NAME_FIELD_SIZE)
                .map_err(|e| CoreError::field("last_name", e))?;
        }
        Ok(())
    }

    /// Drop the role change; used for self-service profile edits.
    pub fn without_role(self) -> Self {
        Self { role: None, ..self }
    }
}

/// Query parameters for `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    /// Case-insensitive partial match on username.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}
