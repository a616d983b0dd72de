//! In-process store. Used by the test suite and by `STORE_BACKEND=memory`.

use super::{AuthRepository, StudentRepository};
use crate::error::AppError;
use crate::model::{AuthToken, Student, StudentInput, User};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    next_student_id: i64,
    users: Vec<User>,
    next_user_id: i64,
    tokens: Vec<AuthToken>,
}

/// Rows are kept in insertion order, which is also `id` order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Student>, AppError> {
        Ok(self.tables.read().await.students.clone())
    }

    async fn insert(&self, input: &StudentInput) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;
        tables.next_student_id += 1;
        let student = input.clone().into_student(tables.next_student_id);
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn find_by_student_id(&self, student_id: &str, limit: usize) -> Result<Vec<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| s.student_id == student_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn replace(&self, id: i64, input: &StudentInput) -> Result<Option<Student>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.students.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        *row = input.clone().into_student(id);
        Ok(Some(row.clone()))
    }

    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        Ok(tables.students.len() != before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.username == username) {
            user.password_hash = password_hash.to_string();
            user.is_active = true;
            return Ok(user.clone());
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn set_user_active(&self, username: &str, active: bool) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        user.is_active = active;
        Ok(Some(user.clone()))
    }

    async fn get_or_create_token(&self, user_id: i64, candidate: &str) -> Result<AuthToken, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(token) = tables.tokens.iter().find(|t| t.user_id == user_id) {
            return Ok(token.clone());
        }
        let token = AuthToken {
            key: candidate.to_string(),
            user_id,
            created: Utc::now(),
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }

    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        let Some(token) = tables.tokens.iter().find(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(tables.users.iter().find(|u| u.id == token.user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(student_id: &str, name: &str) -> StudentInput {
        StudentInput {
            student_id: student_id.into(),
            name: name.into(),
            age: "20".into(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order_and_never_reused() {
        let store = MemoryStore::new();
        let a = store.insert(&input("1", "a")).await.unwrap();
        let b = store.insert(&input("2", "b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(store.remove(b.id).await.unwrap());
        let c = store.insert(&input("3", "c")).await.unwrap();
        assert_eq!(c.id, 3);
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn find_respects_limit() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert(&input("dup", name)).await.unwrap();
        }
        assert_eq!(store.find_by_student_id("dup", 2).await.unwrap().len(), 2);
        assert!(store.find_by_student_id("none", 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_and_remove_missing_rows() {
        let store = MemoryStore::new();
        assert!(store.replace(42, &input("1", "a")).await.unwrap().is_none());
        assert!(!store.remove(42).await.unwrap());
    }

    #[tokio::test]
    async fn token_is_created_once_per_user() {
        let store = MemoryStore::new();
        let user = store.upsert_user("admin", "hash").await.unwrap();
        let first = store.get_or_create_token(user.id, "k1").await.unwrap();
        let second = store.get_or_create_token(user.id, "k2").await.unwrap();
        assert_eq!(first.key, "k1");
        assert_eq!(second.key, "k1");
        let owner = store.user_for_token("k1").await.unwrap().unwrap();
        assert_eq!(owner.username, "admin");
        assert!(store.user_for_token("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_resets_password() {
        let store = MemoryStore::new();
        let first = store.upsert_user("admin", "old").await.unwrap();
        let second = store.upsert_user("admin", "new").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.find_user("admin").await.unwrap().unwrap().password_hash, "new");
    }

    #[tokio::test]
    async fn deactivation_sticks_until_upsert() {
        let store = MemoryStore::new();
        store.upsert_user("admin", "hash").await.unwrap();
        assert!(store.set_user_active("ghost", false).await.unwrap().is_none());
        store.set_user_active("admin", false).await.unwrap();
        assert!(!store.find_user("admin").await.unwrap().unwrap().is_active);
        let user = store.upsert_user("admin", "hash").await.unwrap();
        assert!(user.is_active);
    }
}
