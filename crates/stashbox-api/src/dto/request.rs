//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use stashbox_core::error::AppError;
use stashbox_core::types::{DeleteMode, ListFilter, NodeId};
use stashbox_entity::node::NewFileNode;

/// Create file or folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNodeRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Logical path.
    #[validate(length(min = 1, message = "Path is required"))]
    pub path: String,
    /// Size in bytes.
    #[serde(default)]
    #[validate(range(min = 0, message = "Size cannot be negative"))]
    pub size: i64,
    /// MIME type.
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    /// Storage locator.
    #[serde(default)]
    pub file_url: String,
    /// Preview locator.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Parent folder.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Whether this is a folder.
    #[serde(default)]
    pub is_folder: bool,
}

impl From<CreateNodeRequest> for NewFileNode {
    fn from(req: CreateNodeRequest) -> Self {
        Self {
            name: req.name,
            path: req.path,
            size: req.size,
            node_type: req.node_type,
            file_url: req.file_url,
            thumbnail_url: req.thumbnail_url,
            parent_id: req.parent_id,
            is_folder: req.is_folder,
        }
    }
}

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Parent folder ID.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// `GET /api/files` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Folder to list; root-level nodes when absent.
    pub parent_id: Option<NodeId>,
    /// Filter name, `excluding_trash` when absent.
    pub filter: Option<String>,
}

impl ListQuery {
    /// Parsed filter.
    pub fn filter(&self) -> Result<ListFilter, AppError> {
        self.filter
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// `DELETE /api/files/{id}` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteQuery {
    /// `soft` (default) or `hard`.
    pub mode: Option<String>,
}

impl DeleteQuery {
    /// Parsed delete mode.
    pub fn mode(&self) -> Result<DeleteMode, AppError> {
        self.mode
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// `GET /api/folders/tree` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeQuery {
    /// Subtree root; the whole tree when absent.
    pub root: Option<NodeId>,
}

/// Run `validator` checks and convert failures into a validation error.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults_to_excluding_trash() {
        assert_eq!(
            ListQuery::default().filter().unwrap(),
            ListFilter::ExcludingTrash
        );
        let query = ListQuery {
            parent_id: None,
            filter: Some("bogus".to_string()),
        };
        assert!(query.filter().is_err());
    }

    #[test]
    fn test_delete_query_mode() {
        assert_eq!(DeleteQuery::default().mode().unwrap(), DeleteMode::Soft);
        let query = DeleteQuery {
            mode: Some("hard".to_string()),
        };
        assert_eq!(query.mode().unwrap(), DeleteMode::Hard);
    }

    #[test]
    fn test_create_folder_request_validation() {
        let req = CreateFolderRequest {
            parent_id: None,
            name: String::new(),
        };
        assert!(validate_request(&req).is_err());
    }
}
