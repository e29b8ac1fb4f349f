//! Listing filters and deletion modes for the file tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Selects which children a listing returns.
///
/// "Trashed" here means *effectively* trashed: the node's own flag is set,
/// or it sits somewhere below a trashed folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFilter {
    /// Every child regardless of flags.
    All,
    /// Starred children that are not trashed.
    StarredOnly,
    /// Trashed children only.
    TrashOnly,
    /// Children that are not trashed.
    #[default]
    ExcludingTrash,
}

impl ListFilter {
    /// Decide whether a node with the given flags passes this filter.
    pub fn admits(self, is_starred: bool, effectively_trashed: bool) -> bool {
        match self {
            Self::All => true,
            Self::StarredOnly => is_starred && !effectively_trashed,
            Self::TrashOnly => effectively_trashed,
            Self::ExcludingTrash => !effectively_trashed,
        }
    }

    /// Return the wire name of this filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::StarredOnly => "starred_only",
            Self::TrashOnly => "trash_only",
            Self::ExcludingTrash => "excluding_trash",
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "starred" | "starred_only" => Ok(Self::StarredOnly),
            "trash" | "trash_only" => Ok(Self::TrashOnly),
            "excluding_trash" => Ok(Self::ExcludingTrash),
            other => Err(AppError::validation(format!("Unknown filter '{other}'"))),
        }
    }
}

/// How a node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Flag the node as trashed; it can be restored.
    #[default]
    Soft,
    /// Remove the row and, for folders, the whole subtree.
    Hard,
}

impl FromStr for DeleteMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(AppError::validation(format!("Unknown delete mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_admits() {
        assert!(ListFilter::All.admits(false, true));
        assert!(ListFilter::StarredOnly.admits(true, false));
        assert!(!ListFilter::StarredOnly.admits(true, true));
        assert!(ListFilter::TrashOnly.admits(false, true));
        assert!(!ListFilter::TrashOnly.admits(true, false));
        assert!(!ListFilter::ExcludingTrash.admits(false, true));
    }

    #[test]
    fn test_filter_parse_accepts_short_names() {
        assert_eq!("trash".parse::<ListFilter>().unwrap(), ListFilter::TrashOnly);
        assert_eq!(
            "starred_only".parse::<ListFilter>().unwrap(),
            ListFilter::StarredOnly
        );
        assert!("everything".parse::<ListFilter>().is_err());
    }

    #[test]
    fn test_default_filter_hides_trash() {
        assert_eq!(ListFilter::default(), ListFilter::ExcludingTrash);
        assert_eq!(DeleteMode::default(), DeleteMode::Soft);
    }
}
