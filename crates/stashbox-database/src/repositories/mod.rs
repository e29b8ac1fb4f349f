//! Repositories for the `files` table.
//!
//! [`NodeRepository`] is the persistence seam of the file tree. The
//! PostgreSQL implementation is used in production; the in-memory one
//! backs tests and `memory://` local runs.

pub mod memory;
pub mod node;

use async_trait::async_trait;

use stashbox_core::result::AppResult;
use stashbox_core::types::{NodeId, UserId};
use stashbox_entity::node::{FileNode, NodePatch};

pub use memory::MemoryNodeRepository;
pub use node::PgNodeRepository;

/// A flag column that can be queried across a user's whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFlag {
    /// `is_starred`
    Starred,
    /// `is_trash`
    Trash,
}

/// Persistence operations over file tree nodes.
///
/// Repositories do not enforce ownership; that is the service's job. They
/// do guarantee that [`update`](Self::update) never persists a parent link
/// that closes a cycle, checking and writing as one atomic step. Writes
/// only touch the columns they name, so concurrent edits of different
/// fields of one node never undo each other.
#[async_trait]
pub trait NodeRepository: std::fmt::Debug + Send + Sync + 'static {
    /// Find a node by its primary key.
    async fn find_by_id(&self, id: NodeId) -> AppResult<Option<FileNode>>;

    /// Direct children of `parent_id` (root-level nodes when `None`) owned
    /// by `owner`, ordered by `created_at` then `id`.
    async fn find_children(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
    ) -> AppResult<Vec<FileNode>>;

    /// Every node of `owner` whose own row has `flag` set, ordered by
    /// `created_at` then `id`.
    async fn find_flagged(&self, owner: &UserId, flag: NodeFlag) -> AppResult<Vec<FileNode>>;

    /// The node followed by its ancestors, nearest first, returning at most
    /// `limit` entries. Empty when the node does not exist.
    async fn find_lineage(&self, id: NodeId, limit: usize) -> AppResult<Vec<FileNode>>;

    /// Non-trashed nodes of `owner` below `parent_id`, at most `levels`
    /// levels deep, ordered by `created_at` then `id`.
    ///
    /// With `None` the first level is the owner's root-level nodes. A
    /// trashed node is left out together with everything under it.
    async fn find_subtree(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
        levels: usize,
    ) -> AppResult<Vec<FileNode>>;

    /// Number of levels in the subtree rooted at `id` (1 for a leaf, 0 when
    /// missing), never counting past `limit`.
    async fn subtree_height(&self, id: NodeId, limit: usize) -> AppResult<usize>;

    /// Insert a fully-populated node.
    async fn insert(&self, node: &FileNode) -> AppResult<FileNode>;

    /// Write the columns set in `patch` and bump `updated_at`, leaving every
    /// other column as currently stored.
    ///
    /// Fails with a cycle error when the node would appear in the lineage
    /// of its new parent, or when that lineage is longer than `max_depth`.
    async fn update(&self, id: NodeId, patch: &NodePatch, max_depth: usize)
    -> AppResult<FileNode>;

    /// Flip `flag` on the stored row and bump `updated_at`.
    async fn toggle(&self, id: NodeId, flag: NodeFlag) -> AppResult<FileNode>;

    /// Remove a node and all of its descendants. Returns the rows removed.
    async fn delete_subtree(&self, id: NodeId) -> AppResult<u64>;

    /// Remove every trashed node of `owner` together with its descendants.
    async fn delete_trashed(&self, owner: &UserId) -> AppResult<u64>;

    /// Check backing store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
