//! File tree operations: creation, listing, moves, trash, and deletion.

pub mod service;
pub mod tree;
pub mod validate;


pub use service::FileTreeService;
