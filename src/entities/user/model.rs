//! User accounts

use crate::auth::password::{PasswordError, hash_password, verify_password};
use crate::core::{Data, Entity, FieldKind, FieldValue, Principal, QuerySchema, Role, UniqueKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered account
///
/// The password hash and reset token never leave the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user, hashing `password`
    pub fn new(name: &str, email: &str, password: &str, role: Role) -> Result<Self, PasswordError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            role,
            password_hash: hash_password(password)?,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        })
    }

    pub fn set_password(&mut self, password: &str) -> Result<(), PasswordError> {
        self.password_hash = hash_password(password)?;
        Ok(())
    }

    pub fn password_matches(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expire = None;
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn query_schema() -> QuerySchema {
        QuerySchema::new("users")
            .field("name", FieldKind::Text)
            .field("email", FieldKind::Text)
            .field("role", FieldKind::Text)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Entity for User {
    fn resource_name() -> &'static str {
        "users"
    }

    fn display_name() -> &'static str {
        "User"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Data for User {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "role" => Some(self.role.as_str().into()),
            "resetPasswordToken" => Some(self.reset_password_token.clone().into()),
            "resetPasswordExpire" => Some(self.reset_password_expire.into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("email", self.email.clone())]
    }
}

/// Body of `POST /auth/register` and `POST /users`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Option<Role>,
}

/// Body of `PUT /users/{id}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    pub role: Option<Role>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn apply(self, user: &mut User) -> Result<(), PasswordError> {
        if let Some(name) = self.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            user.email = normalize_email(&email);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(password) = self.password {
            user.set_password(&password)?;
        }
        Ok(())
    }
}

/// Body of `PUT /auth/updatedetails`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDetails {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
}

/// Body of `PUT /auth/updatepassword`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    #[serde(default)]
    pub current_password: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Body of `POST /auth/login`; presence is checked by the handler
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /auth/forgotpassword`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPassword {
    #[serde(default)]
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
}

/// Body of `PUT /auth/resetpassword/{token}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPassword {
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}
