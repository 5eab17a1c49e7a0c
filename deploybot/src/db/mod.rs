//! Database layer: read-only access to the deployment tables.
//!
//! The deployment workflow owns the schema; this crate only reads it.
//!
//! ```text
//! ┌──────────────┐
//! │ SqlDirectory │  (DeployDirectory for the notification pipeline)
//! └──────┬───────┘
//!        ↓
//! ┌──────────────┐
//! │ Repositories │  (db::handlers - one per table)
//! └──────┬───────┘
//!        ↓
//! ┌──────────────┐
//! │    Models    │  (db::models - immutable value objects)
//! └──────┬───────┘
//!        ↓
//! ┌──────────────┐
//! │    MySQL     │
//! └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`pools`]: pool construction from [`crate::config::DatabaseConfig`]
//! - [`handlers`]: repository implementations
//! - [`models`]: records returned by repositories
//! - [`errors`]: database-specific error types
//! - [`directory`]: the pool-backed [`crate::notify::DeployDirectory`]

pub mod directory;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;

pub use directory::SqlDirectory;
