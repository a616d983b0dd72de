//! Persistence seams. Handlers only see these traits; the backend is picked at startup.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::{AuthToken, Student, StudentInput, User};
use async_trait::async_trait;

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// All students ordered by `id`.
    async fn list(&self) -> Result<Vec<Student>, AppError>;

    async fn insert(&self, input: &StudentInput) -> Result<Student, AppError>;

    /// Every row whose `student_id` equals `student_id`, ordered by `id`. At most `limit` rows.
    async fn find_by_student_id(&self, student_id: &str, limit: usize) -> Result<Vec<Student>, AppError>;

    /// Overwrite all writable fields of row `id`. `None` if the row is gone.
    async fn replace(&self, id: i64, input: &StudentInput) -> Result<Option<Student>, AppError>;

    /// Returns whether a row was removed.
    async fn remove(&self, id: i64) -> Result<bool, AppError>;

    /// Cheap round trip for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create the user, or reset the password and reactivate it if it exists.
    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Enable or disable login for `username`. `None` if there is no such user.
    async fn set_user_active(&self, username: &str, active: bool) -> Result<Option<User>, AppError>;

    /// Return the user's token, storing `candidate` first if the user has none.
    async fn get_or_create_token(&self, user_id: i64, candidate: &str) -> Result<AuthToken, AppError>;

    /// Owner of the token `key`, if any.
    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError>;
}
