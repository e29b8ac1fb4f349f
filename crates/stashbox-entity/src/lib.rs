//! # stashbox-entity
//!
//! Entity models for Stashbox. Files and folders share one row type,
//! [`node::FileNode`], so the whole hierarchy can be walked uniformly.

pub mod node;
