//! File node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stashbox_core::types::{NodeId, UserId};

/// Value stored in the `type` column of every folder row.
pub const FOLDER_TYPE: &str = "folder";

/// A file or folder in a user's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FileNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// Fully-qualified logical path.
    pub path: String,
    /// Size in bytes (always 0 for folders).
    pub size: i64,
    /// MIME type for files, [`FOLDER_TYPE`] for folders.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub node_type: String,
    /// Locator of the file bytes in object storage (empty for folders).
    pub file_url: String,
    /// Preview locator for previewable files.
    pub thumbnail_url: Option<String>,
    /// Owning identity.
    pub user_id: UserId,
    /// Parent folder (None for root-level nodes).
    pub parent_id: Option<NodeId>,
    /// Whether this node is a folder.
    pub is_folder: bool,
    /// User-set favourite flag.
    pub is_starred: bool,
    /// Soft-delete flag on this row only.
    pub is_trash: bool,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl FileNode {
    /// Check if this is a root-level node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check whether `user_id` owns this node.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Data required to create a node.
///
/// The owner is not part of the payload: it always comes from the
/// authenticated caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFileNode {
    /// Display name.
    pub name: String,
    /// Fully-qualified logical path.
    pub path: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: i64,
    /// MIME type; defaults to [`FOLDER_TYPE`] for folders.
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    /// Storage locator for the file bytes.
    #[serde(default)]
    pub file_url: String,
    /// Preview locator.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Parent folder (None for root-level).
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Whether the node is a folder.
    #[serde(default)]
    pub is_folder: bool,
}

impl NewFileNode {
    /// Build the row to persist, generating the id and timestamps.
    ///
    /// Callers are expected to have validated the payload already.
    pub fn into_node(self, owner: UserId, node_type: String) -> FileNode {
        let now = Utc::now();
        FileNode {
            id: NodeId::new(),
            name: self.name,
            path: self.path,
            size: self.size,
            node_type,
            file_url: self.file_url,
            thumbnail_url: self.thumbnail_url,
            user_id: owner,
            parent_id: self.parent_id,
            is_folder: self.is_folder,
            is_starred: false,
            is_trash: false,
            created_at: now,
            updated_at: now,
        }
    }
}
