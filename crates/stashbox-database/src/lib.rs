//! # stashbox-database
//!
//! PostgreSQL connection management, migrations, and the repositories
//! backing the file tree: one for PostgreSQL and one held in memory.

pub mod connection;
mod error;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryNodeRepository, NodeRepository, PgNodeRepository};
