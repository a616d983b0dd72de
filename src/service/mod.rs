//! CrudService: student CRUD over the repository, plus payload validation.

mod crud;
pub mod validation;
pub use crud::CrudService;
pub use validation::StudentSerializer;
