//! Nested views and ancestor chains.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use stashbox_core::error::AppError;
use stashbox_core::result::AppResult;
use stashbox_core::types::NodeId;
use stashbox_entity::node::{FileNode, FileTreeNode};

use super::service::FileTreeService;
use crate::context::RequestContext;

impl FileTreeService {
    /// Chain from the root-level ancestor down to `id`, inclusive.
    pub async fn breadcrumbs(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Vec<FileNode>> {
        let mut chain = self.owned_lineage(ctx, id).await?;
        chain.reverse();
        debug!(user_id = %ctx.user_id, node_id = %id, depth = chain.len(), "Breadcrumbs resolved");
        Ok(chain)
    }

    /// Nested view of the caller's non-trashed nodes.
    ///
    /// With `root` the result holds that single node and its descendants,
    /// or nothing when the node or one of its ancestors is trashed; without
    /// it, every root-level node. Levels below `tree.max_depth` are not
    /// expanded.
    pub async fn tree(
        &self,
        ctx: &RequestContext,
        root: Option<NodeId>,
    ) -> AppResult<Vec<FileTreeNode>> {
        let max_depth = self.config.max_depth;
        let (top, rows) = match root {
            Some(id) => {
                let chain = self.owned_lineage(ctx, id).await?;
                if chain.iter().any(|n| n.is_trash) {
                    return Ok(Vec::new());
                }
                let top: Vec<FileNode> = chain.into_iter().take(1).collect();
                let rows = self
                    .repo
                    .find_subtree(&ctx.user_id, Some(id), max_depth.saturating_sub(1))
                    .await?;
                (top, rows)
            }
            None => self
                .repo
                .find_subtree(&ctx.user_id, None, max_depth)
                .await?
                .into_iter()
                .partition(|n| n.parent_id.is_none()),
        };

        let mut children: HashMap<NodeId, Vec<FileNode>> = HashMap::new();
        for node in rows {
            if let Some(parent_id) = node.parent_id {
                children.entry(parent_id).or_default().push(node);
            }
        }

        debug!(
            user_id = %ctx.user_id,
            root = ?root,
            top = top.len(),
            "Tree loaded"
        );

        Ok(assemble(top, &mut children))
    }

    /// The node followed by its ancestors, nearest first, after checking
    /// that the caller owns the node.
    pub(crate) async fn owned_lineage(
        &self,
        ctx: &RequestContext,
        id: NodeId,
    ) -> AppResult<Vec<FileNode>> {
        let limit = self.config.max_depth.saturating_add(1);
        let chain = self.repo.find_lineage(id, limit).await?;

        match chain.first() {
            Some(node) if node.is_owned_by(&ctx.user_id) => {}
            _ => return Err(AppError::not_found(format!("Node {id} not found"))),
        }
        if chain.len() > self.config.max_depth {
            return Err(AppError::cycle(format!(
                "Ancestor chain of {id} exceeds {} levels",
                self.config.max_depth
            )));
        }
        Ok(chain)
    }
}

/// Build nested nodes from a parent-to-children map.
///
/// Every node is placed at most once, so stored links that loop still
/// produce a finite tree.
pub fn assemble(
    nodes: Vec<FileNode>,
    children: &mut HashMap<NodeId, Vec<FileNode>>,
) -> Vec<FileTreeNode> {
    let mut placed = HashSet::new();
    place(nodes, children, &mut placed)
}

fn place(
    nodes: Vec<FileNode>,
    children: &mut HashMap<NodeId, Vec<FileNode>>,
    placed: &mut HashSet<NodeId>,
) -> Vec<FileTreeNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !placed.insert(node.id) {
            continue;
        }
        let kids = children.remove(&node.id).unwrap_or_default();
        out.push(FileTreeNode {
            children: place(kids, children, placed),
            node,
        });
    }
    out
}
