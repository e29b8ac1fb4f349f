//! Partial updates to a node.

use serde::{Deserialize, Deserializer, Serialize};

use stashbox_core::types::NodeId;

/// The mutable subset of a [`FileNode`](super::FileNode).
///
/// `parent_id` distinguishes "leave unchanged" (`None`) from "move to the
/// root" (`Some(None)`), which is why a JSON `null` deserializes to
/// `Some(None)` rather than being treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New parent folder.
    #[serde(default, deserialize_with = "present")]
    pub parent_id: Option<Option<NodeId>>,
    /// New starred flag.
    #[serde(default)]
    pub is_starred: Option<bool>,
    /// New trash flag.
    #[serde(default)]
    pub is_trash: Option<bool>,
}

impl NodePatch {
    /// Returns true when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.is_starred.is_none()
            && self.is_trash.is_none()
    }

    /// Patch that only moves the node.
    pub fn move_to(parent_id: Option<NodeId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_parent_means_move_to_root() {
        let patch: NodePatch = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));
    }

    #[test]
    fn test_missing_parent_means_unchanged() {
        let patch: NodePatch = serde_json::from_str(r#"{"is_starred": true}"#).unwrap();
        assert_eq!(patch.parent_id, None);
        assert_eq!(patch.is_starred, Some(true));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        let patch: NodePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
