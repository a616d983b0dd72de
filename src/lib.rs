//! Student API: token-authenticated CRUD over student records.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{AppConfig, StoreBackend};
pub use error::{AppError, ConfigError, FieldErrors};
pub use model::{Student, StudentInput};
pub use routes::{app, auth_routes, common_routes, student_routes};
pub use service::{CrudService, StudentSerializer};
pub use state::AppState;
pub use store::{ensure_database_exists, AuthRepository, MemoryStore, PgStore, StudentRepository};
