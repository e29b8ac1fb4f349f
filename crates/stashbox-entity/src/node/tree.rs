//! Nested tree view of a user's nodes.

use serde::{Deserialize, Serialize};

use super::model::FileNode;

/// A node together with its (non-trashed) descendants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTreeNode {
    /// The node itself.
    pub node: FileNode,
    /// Children, ordered by creation time. Empty for files.
    pub children: Vec<FileTreeNode>,
}

impl FileTreeNode {
    /// Total number of nodes in this subtree, including the root.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(FileTreeNode::count).sum::<usize>()
    }

    /// Sum of file sizes in this subtree.
    pub fn total_size(&self) -> i64 {
        self.node.size + self.children.iter().map(FileTreeNode::total_size).sum::<i64>()
    }
}
