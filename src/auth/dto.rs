use serde::{Deserialize, Serialize};

use super::repo_types::User;
use crate::validation::loose_text;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub last_name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    #[serde(rename = "userInfo")]
    pub user_info: Vec<User>,
}
