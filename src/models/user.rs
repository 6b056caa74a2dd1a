use serde::{Deserialize, Serialize};

use crate::error::AppError;

const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: chrono::NaiveDateTime,
}

/// Public view of a user. Carries no credential material.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupPayload {
    pub fn validate(self) -> Result<CreateUser, AppError> {
        let username = required(self.username, "username")?.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AppError::Validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }

        let email = required(self.email, "email")?.trim().to_string();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::Validation("email is not a valid address".into()));
        }

        let password = required(self.password, "password")?;
        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }

        Ok(CreateUser {
            username,
            email,
            password,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    pub fn validate(self) -> Result<Credentials, AppError> {
        Ok(Credentials {
            email: required(self.email, "email")?.trim().to_string(),
            password: required(self.password, "password")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}
