use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login account. Teachers log in with their `teacher_id` as username.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    /// Argon2id hash, never the plaintext.
    pub password_hash: String,
    pub role: UserRole,
    pub teacher_id: Option<String>,
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Teacher,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Teacher => "TEACHER",
        }
    }
}
