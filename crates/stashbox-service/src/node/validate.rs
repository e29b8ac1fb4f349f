//! Input checks applied before anything touches the repository.

use stashbox_core::error::AppError;
use stashbox_core::result::AppResult;
use stashbox_entity::node::{FOLDER_TYPE, NewFileNode};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// MIME type recorded for files uploaded without one.
pub const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// Trim and check a display name.
pub fn name(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name cannot be longer than {MAX_NAME_LEN} characters"
        )));
    }
    if trimmed.contains('/') {
        return Err(AppError::validation("Name cannot contain '/'"));
    }
    Ok(trimmed.to_string())
}

/// Check a creation payload in place and return the `type` to store.
///
/// Normalizes the name. Parent resolution happens later, under the owner
/// lock.
pub fn new_node(input: &mut NewFileNode) -> AppResult<String> {
    input.name = name(&input.name)?;

    if input.path.trim().is_empty() {
        return Err(AppError::validation("Path cannot be empty"));
    }
    if input.size < 0 {
        return Err(AppError::validation("Size cannot be negative"));
    }

    let declared = input
        .node_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if input.is_folder {
        if input.size != 0 {
            return Err(AppError::validation("Folders must have size 0"));
        }
        if declared.is_some_and(|t| t != FOLDER_TYPE) {
            return Err(AppError::validation(format!(
                "Folders must have type '{FOLDER_TYPE}'"
            )));
        }
        if !input.file_url.is_empty() || input.thumbnail_url.is_some() {
            return Err(AppError::validation(
                "Folders cannot carry a file or thumbnail URL",
            ));
        }
        return Ok(FOLDER_TYPE.to_string());
    }

    if input.file_url.trim().is_empty() {
        return Err(AppError::validation("Files require a file URL"));
    }
    match declared {
        Some(FOLDER_TYPE) => Err(AppError::validation(format!(
            "Only folders may have type '{FOLDER_TYPE}'"
        ))),
        Some(mime) => Ok(mime.to_string()),
        None => Ok(DEFAULT_FILE_TYPE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashbox_core::error::ErrorKind;

    fn file(name: &str) -> NewFileNode {
        NewFileNode {
            name: name.to_string(),
            path: format!("/uploads/{name}"),
            size: 10,
            file_url: "https://cdn.example.com/a".to_string(),
            ..NewFileNode::default()
        }
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(name("  report.pdf ").unwrap(), "report.pdf");
        assert_eq!(name("   ").unwrap_err().kind, ErrorKind::Validation);
        assert!(name("a/b").is_err());
        assert!(name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_file_type_defaults() {
        let mut input = file("blob");
        assert_eq!(new_node(&mut input).unwrap(), DEFAULT_FILE_TYPE);

        let mut input = file("cat.png");
        input.node_type = Some("image/png".to_string());
        assert_eq!(new_node(&mut input).unwrap(), "image/png");

        let mut input = file("sneaky");
        input.node_type = Some(FOLDER_TYPE.to_string());
        assert!(new_node(&mut input).is_err());
    }

    #[test]
    fn test_folder_rules() {
        let mut input = NewFileNode {
            name: "Photos".to_string(),
            path: "/Photos".to_string(),
            is_folder: true,
            ..NewFileNode::default()
        };
        assert_eq!(new_node(&mut input.clone()).unwrap(), FOLDER_TYPE);

        input.size = 1;
        assert_eq!(new_node(&mut input).unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_file_requires_url_and_path() {
        let mut input = file("a.txt");
        input.file_url.clear();
        assert!(new_node(&mut input).is_err());

        let mut input = file("a.txt");
        input.path = " ".to_string();
        assert!(new_node(&mut input).is_err());

        let mut input = file("a.txt");
        input.size = -1;
        assert!(new_node(&mut input).is_err());
    }
}
