//! Mock user service.
//!
//! Registered users live in memory for the lifetime of the service.
//! Passwords are compared as given; this is a demo, not an identity provider.

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

#[derive(Default)]
pub struct UserService {
    users: Vec<RegisterData>,
}

impl UserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, data: RegisterData) -> DeskResult<AuthResponse> {
        if self.users.iter().any(|u| u.email == data.email) {
            return Err(DeskError::UserAlreadyExists);
        }
        let response = issue(&data);
        self.users.push(data);
        Ok(response)
    }

    pub fn login(&self, data: &LoginData) -> DeskResult<AuthResponse> {
        self.users
            .iter()
            .find(|u| u.email == data.email && u.password == data.password)
            .map(issue)
            .ok_or(DeskError::InvalidCredentials)
    }

    /// Always succeeds; no mail is sent.
    pub fn request_password_reset(&self, email: &str) -> DeskResult<()> {
        log::info!(
            "Password reset requested for {email} (known: {})",
            self.users.iter().any(|u| u.email == email)
        );
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

// Every successful call hands out a fresh user id and token.
fn issue(user: &RegisterData) -> AuthResponse {
    AuthResponse {
        user: AuthUser {
            id: Uuid::new_v4().simple().to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            organization: user.organization.clone(),
        },
        token: Uuid::new_v4().simple().to_string(),
    }
}
