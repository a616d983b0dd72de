//! PostgreSQL repositories and table DDL. Tables live in the schema named by `STUDENT_API_SCHEMA`.

use super::{AuthRepository, StudentRepository};
use crate::error::{AppError, ConfigError};
use crate::model::{AuthToken, Student, StudentInput, User};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const STUDENT_COLUMNS: &str = "id, student_id, name, age";
const USER_COLUMNS: &str = "id, username, password_hash, is_active";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
    students: String,
    users: String,
    tokens: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        let table = |name: &str| format!("{}.{}", quoted(schema), quoted(name));
        PgStore {
            pool,
            schema: schema.to_string(),
            students: table("students"),
            users: table("users"),
            tokens: table("auth_tokens"),
        }
    }

    /// Create the schema and tables if they do not exist.
    pub async fn ensure_tables(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&self.schema)))
            .execute(&self.pool)
            .await?;

        let students_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                student_id VARCHAR(20) NOT NULL,
                name VARCHAR(50) NOT NULL,
                age VARCHAR(10) NOT NULL
            )
            "#,
            self.students
        );
        sqlx::query(&students_ddl).execute(&self.pool).await?;
        // Lookups go by student_id; the index is not unique.
        let students_index = format!(
            "CREATE INDEX IF NOT EXISTS students_student_id_idx ON {} (student_id)",
            self.students
        );
        sqlx::query(&students_index).execute(&self.pool).await?;

        let users_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            self.users
        );
        sqlx::query(&users_ddl).execute(&self.pool).await?;

        let tokens_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key VARCHAR(40) PRIMARY KEY,
                user_id BIGINT NOT NULL UNIQUE REFERENCES {} (id) ON DELETE CASCADE,
                created TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.tokens, self.users
        );
        sqlx::query(&tokens_ddl).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for PgStore {
    async fn list(&self) -> Result<Vec<Student>, AppError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", STUDENT_COLUMNS, self.students);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, Student>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn insert(&self, input: &StudentInput) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO {} (student_id, name, age) VALUES ($1, $2, $3) RETURNING {}",
            self.students, STUDENT_COLUMNS
        );
        tracing::debug!(sql = %sql, student_id = %input.student_id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&input.student_id)
            .bind(&input.name)
            .bind(&input.age)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_student_id(&self, student_id: &str, limit: usize) -> Result<Vec<Student>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE student_id = $1 ORDER BY id LIMIT $2",
            STUDENT_COLUMNS, self.students
        );
        tracing::debug!(sql = %sql, student_id = %student_id, "query");
        let rows = sqlx::query_as::<_, Student>(&sql)
            .bind(student_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn replace(&self, id: i64, input: &StudentInput) -> Result<Option<Student>, AppError> {
        let sql = format!(
            "UPDATE {} SET student_id = $1, name = $2, age = $3 WHERE id = $4 RETURNING {}",
            self.students, STUDENT_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&input.student_id)
            .bind(&input.name)
            .bind(&input.age)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.students);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for PgStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE username = $1", USER_COLUMNS, self.users);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn upsert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (username, password_hash, is_active) VALUES ($1, $2, TRUE)
            ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash, is_active = TRUE
            RETURNING {}
            "#,
            self.users, USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_user_active(&self, username: &str, active: bool) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE {} SET is_active = $2 WHERE username = $1 RETURNING {}",
            self.users, USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_or_create_token(&self, user_id: i64, candidate: &str) -> Result<AuthToken, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "INSERT INTO {} (key, user_id, created) VALUES ($1, $2, NOW()) ON CONFLICT (user_id) DO NOTHING",
            self.tokens
        ))
        .bind(candidate)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        let token = sqlx::query_as::<_, AuthToken>(&format!(
            "SELECT key, user_id, created FROM {} WHERE user_id = $1",
            self.tokens
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(token)
    }

    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT u.id, u.username, u.password_hash, u.is_active FROM {} t JOIN {} u ON u.id = t.user_id WHERE t.key = $1",
            self.tokens, self.users
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_connect_options(database_url)?;
    let Some(db_name) = db_name.filter(|name| name != "postgres") else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the maintenance `postgres` database plus the database named in `url`, if any.
fn admin_connect_options(url: &str) -> Result<(PgConnectOptions, Option<String>), ConfigError> {
    let opts = PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
        var: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let db_name = opts
        .get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok((opts.database("postgres"), db_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_comes_from_the_url_path() {
        let (admin, name) = admin_connect_options("postgres://u:p@localhost:5432/student_api?sslmode=disable").unwrap();
        assert_eq!(name.as_deref(), Some("student_api"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
    }

    #[test]
    fn slashes_in_query_parameters_are_not_the_database() {
        let (_, name) =
            admin_connect_options("postgres://u@localhost/student_api?sslrootcert=/etc/ca.pem").unwrap();
        assert_eq!(name.as_deref(), Some("student_api"));
    }

    #[test]
    fn host_is_never_taken_for_the_database() {
        let (admin, name) = admin_connect_options("postgres://u@dbhost:5432").unwrap();
        assert_ne!(name.as_deref(), Some("dbhost"));
        assert_eq!(admin.get_host(), "dbhost");
    }

    #[test]
    fn unparsable_url_is_a_config_error() {
        assert!(matches!(
            admin_connect_options("not a url"),
            Err(ConfigError::Invalid { var: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quoted("public"), "\"public\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }
}
