use serde::{Deserialize, Serialize};

use crate::users::Role;

/// Request body for login. Fields are optional so that absence maps to a 400.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Request body for admin-driven registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub token: String,
}
