//! Database models: immutable value objects returned by the repositories.

pub mod applies;
pub mod projects;
pub mod servers;
pub mod users;
