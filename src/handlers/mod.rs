//! HTTP handlers for the student resource and token exchange.

pub mod auth;
pub mod student;
