//! Repository implementations for database access.
//!
//! Each repository wraps a MySQL connection and reads one table:
//!
//! - [`Applies`]: deployment requests (`syd_deploy_apply`)
//! - [`Projects`]: projects and their online clusters (`syd_project`)
//! - [`ServerGroups`]: server groups (`syd_server_group`)
//! - [`Servers`]: servers (`syd_server`)
//! - [`Users`]: user accounts (`syd_user`)
//!
//! ```ignore
//! use deploybot::db::handlers::{Applies, Repository};
//!
//! let mut conn = pool.acquire().await?;
//! let apply = Applies::new(&mut conn).get_by_id(42).await?;
//! ```

pub mod applies;
pub mod projects;
pub mod repository;
pub mod server_groups;
pub mod servers;
pub mod users;

pub use applies::Applies;
pub use projects::Projects;
pub use repository::Repository;
pub use server_groups::ServerGroups;
pub use servers::Servers;
pub use users::Users;
