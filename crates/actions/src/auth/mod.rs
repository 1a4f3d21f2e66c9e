//! Staff authentication in three layers: domain types, a repository trait
//! and the [`AuthService`] that hashes passwords and issues tokens.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::AuthService;
