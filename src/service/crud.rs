//! Student CRUD on top of a [`StudentRepository`].

use crate::error::AppError;
use crate::model::Student;
use crate::service::validation::StudentSerializer;
use crate::store::StudentRepository;
use serde_json::Value;

pub struct CrudService;

impl CrudService {
    pub async fn list(repo: &dyn StudentRepository) -> Result<Vec<Student>, AppError> {
        repo.list().await
    }

    /// Validate then insert. Nothing is written when validation fails.
    pub async fn create(repo: &dyn StudentRepository, body: &Value) -> Result<Student, AppError> {
        let input = StudentSerializer::validate(body).map_err(AppError::Validation)?;
        let student = repo.insert(&input).await?;
        tracing::info!(id = student.id, student_id = %student.student_id, "student created");
        Ok(student)
    }

    /// The single row with this `student_id`. No match and several matches are both not-found.
    pub async fn retrieve(repo: &dyn StudentRepository, student_id: &str) -> Result<Student, AppError> {
        let mut rows = repo.find_by_student_id(student_id, 2).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(AppError::NotFound),
            _ => {
                tracing::warn!(student_id = %student_id, "student_id matches more than one row");
                Err(AppError::NotFound)
            }
        }
    }

    /// Full replacement. Lookup runs before validation.
    pub async fn update(repo: &dyn StudentRepository, student_id: &str, body: &Value) -> Result<Student, AppError> {
        let current = Self::retrieve(repo, student_id).await?;
        let input = StudentSerializer::validate(body).map_err(AppError::Validation)?;
        let student = repo.replace(current.id, &input).await?.ok_or(AppError::NotFound)?;
        tracing::info!(id = student.id, student_id = %student.student_id, "student updated");
        Ok(student)
    }

    pub async fn delete(repo: &dyn StudentRepository, student_id: &str) -> Result<(), AppError> {
        let current = Self::retrieve(repo, student_id).await?;
        if !repo.remove(current.id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(id = current.id, student_id = %student_id, "student deleted");
        Ok(())
    }
}
