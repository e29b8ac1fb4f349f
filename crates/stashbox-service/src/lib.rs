//! # stashbox-service
//!
//! Business rules for the file tree. [`FileTreeService`] is the only place
//! hierarchy and ownership invariants are enforced; the API and CLI are
//! thin callers around it.
//!
//! Services follow constructor injection: the repository handle and the
//! tree configuration are provided once at construction time.

pub mod context;
pub mod locks;
pub mod node;

pub use context::RequestContext;
pub use node::FileTreeService;
