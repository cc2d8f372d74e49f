//! Request and response bodies for `/auth`.

use serde::{Deserialize, Serialize};

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Generic `{ "message": … }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// Message from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET/PUT /auth/profile` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Display name.
    pub name: String,

    /// Account email.
    pub email: String,

    /// Registration date.
    #[serde(skip_serializing_if = "Option::is_none", alias = "createdAt", alias = "created_at")]
    pub joined: Option<String>,

    /// Last login timestamp.
    #[serde(skip_serializing_if = "Option::is_none", alias = "lastLogin")]
    pub last_login: Option<String>,
}
