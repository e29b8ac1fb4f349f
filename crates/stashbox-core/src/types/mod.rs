//! Core type definitions used across the Stashbox workspace.

pub mod filter;
pub mod id;

pub use filter::{DeleteMode, ListFilter};
pub use id::{NodeId, UserId};
