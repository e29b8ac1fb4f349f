//! File tree commands.

use clap::Args;

use stashbox_core::error::AppError;
use stashbox_core::types::{DeleteMode, ListFilter, NodeId};
use stashbox_entity::node::NodePatch;
use stashbox_service::{FileTreeService, RequestContext};

use crate::output::{self, OutputFormat};

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder to list (root-level when omitted)
    pub parent: Option<String>,
    /// all, starred, trash, or excluding_trash
    #[arg(short = 'F', long, default_value = "excluding_trash")]
    pub filter: String,
}

/// Arguments for `tree`
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Subtree root (whole tree when omitted)
    pub root: Option<String>,
}

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,
    /// Parent folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for `mv`
#[derive(Debug, Args)]
pub struct MvArgs {
    /// Node to change
    pub id: String,
    /// New parent folder ID
    #[arg(long, conflicts_with = "root")]
    pub to: Option<String>,
    /// Move to the root level
    #[arg(long)]
    pub root: bool,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
}

/// A single node argument
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Node ID
    pub id: String,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Node ID
    pub id: String,
    /// Remove the node and its subtree instead of trashing it
    #[arg(long)]
    pub hard: bool,
}

fn parse_id(raw: &str) -> Result<NodeId, AppError> {
    raw.parse()
        .map_err(|e| AppError::validation(format!("Invalid node id '{raw}': {e}")))
}

fn parse_opt_id(raw: Option<&String>) -> Result<Option<NodeId>, AppError> {
    raw.map(|s| parse_id(s)).transpose()
}

/// `ls`
pub async fn ls(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &LsArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let filter: ListFilter = args.filter.parse()?;
    let parent = parse_opt_id(args.parent.as_ref())?;
    let nodes = service.list_children(ctx, parent, filter).await?;
    output::print_nodes(&nodes, format);
    Ok(())
}

/// `tree`
pub async fn tree(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &TreeArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let root = parse_opt_id(args.root.as_ref())?;
    let forest = service.tree(ctx, root).await?;
    output::print_tree(&forest, format);
    Ok(())
}

/// `mkdir`
pub async fn mkdir(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &MkdirArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let parent = parse_opt_id(args.parent.as_ref())?;
    let folder = service.create_folder(ctx, &args.name, parent).await?;
    output::print_nodes(std::slice::from_ref(&folder), format);
    Ok(())
}

/// `mv`
pub async fn mv(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &MvArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = parse_id(&args.id)?;
    let parent_id = if args.root {
        Some(None)
    } else {
        parse_opt_id(args.to.as_ref())?.map(Some)
    };

    let patch = NodePatch {
        name: args.name.clone(),
        parent_id,
        ..NodePatch::default()
    };
    if patch.is_empty() {
        return Err(AppError::validation("Nothing to change: pass --to, --root, or --name"));
    }

    let node = service.update(ctx, id, patch).await?;
    output::print_nodes(std::slice::from_ref(&node), format);
    Ok(())
}

/// `star`
pub async fn star(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &IdArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let node = service.toggle_star(ctx, parse_id(&args.id)?).await?;
    output::print_nodes(std::slice::from_ref(&node), format);
    Ok(())
}

/// `trash`
pub async fn trash(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &IdArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let node = service.toggle_trash(ctx, parse_id(&args.id)?).await?;
    output::print_nodes(std::slice::from_ref(&node), format);
    Ok(())
}

/// `rm`
pub async fn rm(
    service: &FileTreeService,
    ctx: &RequestContext,
    args: &RmArgs,
) -> Result<(), AppError> {
    let id = parse_id(&args.id)?;
    let mode = if args.hard {
        DeleteMode::Hard
    } else {
        DeleteMode::Soft
    };

    let removed = service.delete(ctx, id, mode).await?;
    match mode {
        DeleteMode::Soft => output::print_success(&format!("Moved {id} to trash")),
        DeleteMode::Hard => output::print_success(&format!("Removed {removed} node(s)")),
    }
    Ok(())
}

/// `empty-trash`
pub async fn empty_trash(service: &FileTreeService, ctx: &RequestContext) -> Result<(), AppError> {
    let removed = service.empty_trash(ctx).await?;
    output::print_success(&format!("Removed {removed} node(s) from trash"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = NodeId::new();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(parse_id("nope").is_err());
        assert_eq!(parse_opt_id(None).unwrap(), None);
    }
}
