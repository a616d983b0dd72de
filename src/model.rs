//! Stored records and their wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student row. Serializes in column order: id, student_id, name, age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub student_id: String,
    pub name: String,
    pub age: String,
}

/// Validated writable fields of a student.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentInput {
    pub student_id: String,
    pub name: String,
    pub age: String,
}

impl StudentInput {
    pub fn into_student(self, id: i64) -> Student {
        Student {
            id,
            student_id: self.student_id,
            name: self.name,
            age: self.age,
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

/// Response body of the token endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
