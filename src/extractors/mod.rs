//! Request extractors: authenticated user and decoded request body.

mod payload;
mod token;

pub use payload::Payload;
pub use token::AuthUser;
