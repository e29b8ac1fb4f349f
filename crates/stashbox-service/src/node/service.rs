//! File tree CRUD with ownership, hierarchy, and trash rules.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use stashbox_core::config::TreeConfig;
use stashbox_core::error::AppError;
use stashbox_core::result::AppResult;
use stashbox_core::types::{DeleteMode, ListFilter, NodeId};
use stashbox_database::repositories::{NodeFlag, NodeRepository};
use stashbox_entity::node::{FileNode, NewFileNode, NodePatch};

use super::validate;
use crate::context::RequestContext;
use crate::locks::OwnerLocks;

/// Manages a user's files and folders.
#[derive(Debug, Clone)]
pub struct FileTreeService {
    /// Node repository.
    pub(crate) repo: Arc<dyn NodeRepository>,
    /// Depth and visibility rules.
    pub(crate) config: TreeConfig,
    /// Per-owner write serialization.
    locks: OwnerLocks,
}

impl FileTreeService {
    /// Creates a new file tree service.
    pub fn new(repo: Arc<dyn NodeRepository>, config: TreeConfig) -> Self {
        Self {
            repo,
            config,
            locks: OwnerLocks::new(),
        }
    }

    /// Tree rules in effect.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Checks that the backing store answers.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.repo.health_check().await
    }

    /// Creates a file or folder owned by the caller.
    pub async fn create(&self, ctx: &RequestContext, mut input: NewFileNode) -> AppResult<FileNode> {
        let node_type = validate::new_node(&mut input)?;

        let _guard = self.locks.acquire(&ctx.user_id).await;

        if let Some(parent_id) = input.parent_id {
            let depth = self.resolve_parent(ctx, parent_id).await?;
            if depth + 1 > self.config.max_depth {
                return Err(AppError::validation(format!(
                    "Nesting deeper than {} levels is not allowed",
                    self.config.max_depth
                )));
            }
        }

        let node = input.into_node(ctx.user_id.clone(), node_type);
        let node = self.repo.insert(&node).await?;

        info!(
            user_id = %ctx.user_id,
            request_id = ?ctx.request_id,
            node_id = %node.id,
            parent_id = ?node.parent_id,
            is_folder = node.is_folder,
            path = %node.path,
            "Node created"
        );

        Ok(node)
    }

    /// Creates a folder, deriving its path from the parent.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<NodeId>,
    ) -> AppResult<FileNode> {
        let name = validate::name(name)?;

        let path = match parent_id {
            Some(parent_id) => {
                let parent = self
                    .find_owned(ctx, parent_id)
                    .await?
                    .ok_or_else(|| AppError::validation(format!("Parent {parent_id} not found")))?;
                format!("{}/{}", parent.path.trim_end_matches('/'), name)
            }
            None => format!("/{name}"),
        };

        self.create(
            ctx,
            NewFileNode {
                name,
                path,
                parent_id,
                is_folder: true,
                ..NewFileNode::default()
            },
        )
        .await
    }

    /// Gets a node owned by the caller.
    pub async fn get_by_id(&self, ctx: &RequestContext, id: NodeId) -> AppResult<FileNode> {
        self.find_owned(ctx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Lists the direct children of `parent_id`, or the root-level nodes.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        filter: ListFilter,
    ) -> AppResult<Vec<FileNode>> {
        let parent_trashed = match parent_id {
            Some(id) => self.owned_lineage(ctx, id).await?.iter().any(|n| n.is_trash),
            None => false,
        };

        let children: Vec<FileNode> = self
            .repo
            .find_children(&ctx.user_id, parent_id)
            .await?
            .into_iter()
            .filter(|c| filter.admits(c.is_starred, parent_trashed || c.is_trash))
            .collect();

        debug!(
            user_id = %ctx.user_id,
            parent_id = ?parent_id,
            filter = %filter,
            count = children.len(),
            "Children listed"
        );

        Ok(children)
    }

    /// Every starred node of the caller that is not effectively trashed.
    pub async fn list_starred(&self, ctx: &RequestContext) -> AppResult<Vec<FileNode>> {
        let starred = self.repo.find_flagged(&ctx.user_id, NodeFlag::Starred).await?;

        let mut trashed: HashMap<NodeId, bool> = HashMap::new();
        let mut visible = Vec::with_capacity(starred.len());
        for node in starred {
            if node.is_trash {
                continue;
            }
            let hidden = match node.parent_id {
                Some(parent_id) => match trashed.get(&parent_id).copied() {
                    Some(hidden) => hidden,
                    None => {
                        let limit = self.config.max_depth.saturating_add(1);
                        let chain = self.repo.find_lineage(parent_id, limit).await?;
                        let hidden = chain.iter().any(|n| n.is_trash);
                        trashed.insert(parent_id, hidden);
                        hidden
                    }
                },
                None => false,
            };
            if !hidden {
                visible.push(node);
            }
        }
        Ok(visible)
    }

    /// Every node of the caller whose own row is flagged as trashed.
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<Vec<FileNode>> {
        self.repo.find_flagged(&ctx.user_id, NodeFlag::Trash).await
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        patch: NodePatch,
    ) -> AppResult<FileNode> {
        self.modify(ctx, id, patch).await
    }

    /// Flips the starred flag.
    pub async fn toggle_star(&self, ctx: &RequestContext, id: NodeId) -> AppResult<FileNode> {
        self.toggle(ctx, id, NodeFlag::Starred).await
    }

    /// Flips the trash flag.
    pub async fn toggle_trash(&self, ctx: &RequestContext, id: NodeId) -> AppResult<FileNode> {
        self.toggle(ctx, id, NodeFlag::Trash).await
    }

    /// Removes a node. Soft mode only flags it; hard mode removes the node
    /// and its whole subtree. Returns the number of rows removed.
    pub async fn delete(&self, ctx: &RequestContext, id: NodeId, mode: DeleteMode) -> AppResult<u64> {
        match mode {
            DeleteMode::Soft => {
                let patch = NodePatch {
                    is_trash: Some(true),
                    ..NodePatch::default()
                };
                self.modify(ctx, id, patch).await?;
                Ok(0)
            }
            DeleteMode::Hard => {
                let _guard = self.locks.acquire(&ctx.user_id).await;
                self.writable(ctx, id).await?;

                let removed = self.repo.delete_subtree(id).await?;
                info!(
                    user_id = %ctx.user_id,
                    request_id = ?ctx.request_id,
                    node_id = %id,
                    removed,
                    "Node deleted"
                );
                Ok(removed)
            }
        }
    }

    /// Hard-deletes every trashed node of the caller with its subtree.
    pub async fn empty_trash(&self, ctx: &RequestContext) -> AppResult<u64> {
        let _guard = self.locks.acquire(&ctx.user_id).await;
        let removed = self.repo.delete_trashed(&ctx.user_id).await?;
        info!(
            user_id = %ctx.user_id,
            request_id = ?ctx.request_id,
            removed,
            "Trash emptied"
        );
        Ok(removed)
    }

    /// Validates a patch against the stored node and persists the columns
    /// it names, all under the owner lock.
    async fn modify(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        mut patch: NodePatch,
    ) -> AppResult<FileNode> {
        let _guard = self.locks.acquire(&ctx.user_id).await;
        let current = self.writable(ctx, id).await?;

        if patch.is_empty() {
            return Ok(current);
        }
        if let Some(name) = patch.name.take() {
            patch.name = Some(validate::name(&name)?);
        }
        if let Some(parent_id) = patch.parent_id {
            if parent_id == current.parent_id {
                patch.parent_id = None;
            } else {
                self.check_move(ctx, &current, parent_id).await?;
            }
        }

        let updated = self.repo.update(id, &patch, self.config.max_depth).await?;

        info!(
            user_id = %ctx.user_id,
            request_id = ?ctx.request_id,
            node_id = %id,
            parent_id = ?updated.parent_id,
            is_starred = updated.is_starred,
            is_trash = updated.is_trash,
            "Node updated"
        );

        Ok(updated)
    }

    async fn toggle(&self, ctx: &RequestContext, id: NodeId, flag: NodeFlag) -> AppResult<FileNode> {
        let _guard = self.locks.acquire(&ctx.user_id).await;
        self.writable(ctx, id).await?;

        let updated = self.repo.toggle(id, flag).await?;

        info!(
            user_id = %ctx.user_id,
            request_id = ?ctx.request_id,
            node_id = %id,
            is_starred = updated.is_starred,
            is_trash = updated.is_trash,
            "Node flag toggled"
        );

        Ok(updated)
    }

    /// Rejects a move that would break the hierarchy rules.
    async fn check_move(
        &self,
        ctx: &RequestContext,
        node: &FileNode,
        parent_id: Option<NodeId>,
    ) -> AppResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        if parent_id == node.id {
            warn!(user_id = %ctx.user_id, node_id = %node.id, "Rejected move under itself");
            return Err(AppError::cycle(format!("Node {} cannot be its own parent", node.id)));
        }

        let limit = self.config.max_depth.saturating_add(1);
        let chain = self.repo.find_lineage(parent_id, limit).await?;
        let parent = match chain.first() {
            Some(parent) if parent.is_owned_by(&ctx.user_id) => parent,
            _ => return Err(AppError::validation(format!("Parent {parent_id} not found"))),
        };

        if chain.iter().any(|n| n.id == node.id) {
            warn!(
                user_id = %ctx.user_id,
                node_id = %node.id,
                parent_id = %parent_id,
                "Rejected move under own descendant"
            );
            return Err(AppError::cycle(format!(
                "Moving {} under {parent_id} would make it its own ancestor",
                node.id
            )));
        }
        if chain.len() > self.config.max_depth {
            warn!(user_id = %ctx.user_id, parent_id = %parent_id, "Ancestor walk hit depth cap");
            return Err(AppError::cycle(format!(
                "Ancestor chain of {parent_id} exceeds {} levels",
                self.config.max_depth
            )));
        }
        if !parent.is_folder {
            return Err(AppError::validation(format!("Parent {parent_id} is not a folder")));
        }

        let height = self.repo.subtree_height(node.id, limit).await?;
        if chain.len() + height > self.config.max_depth {
            return Err(AppError::validation(format!(
                "Nesting deeper than {} levels is not allowed",
                self.config.max_depth
            )));
        }
        Ok(())
    }

    /// Checks that `parent_id` can receive a new child and returns its depth
    /// (1 for a root-level folder).
    async fn resolve_parent(&self, ctx: &RequestContext, parent_id: NodeId) -> AppResult<usize> {
        let limit = self.config.max_depth.saturating_add(1);
        let chain = self.repo.find_lineage(parent_id, limit).await?;
        let parent = match chain.first() {
            Some(parent) if parent.is_owned_by(&ctx.user_id) => parent,
            _ => return Err(AppError::validation(format!("Parent {parent_id} not found"))),
        };
        if !parent.is_folder {
            return Err(AppError::validation(format!("Parent {parent_id} is not a folder")));
        }
        Ok(chain.len())
    }

    async fn find_owned(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Option<FileNode>> {
        Ok(self
            .repo
            .find_by_id(id)
            .await?
            .filter(|n| n.is_owned_by(&ctx.user_id)))
    }

    /// Loads a node the caller is about to mutate.
    async fn writable(&self, ctx: &RequestContext, id: NodeId) -> AppResult<FileNode> {
        let node = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        if node.is_owned_by(&ctx.user_id) {
            return Ok(node);
        }
        if self.config.reveal_foreign_nodes {
            warn!(user_id = %ctx.user_id, node_id = %id, "Mutation of foreign node refused");
            Err(AppError::forbidden("You do not own this node"))
        } else {
            Err(AppError::not_found(format!("Node {id} not found")))
        }
    }
}
