//! PostgreSQL file node repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use stashbox_core::error::AppError;
use stashbox_core::result::AppResult;
use stashbox_core::types::{NodeId, UserId};
use stashbox_entity::node::{FileNode, NodePatch};

use super::{NodeFlag, NodeRepository};
use crate::error::db_error;

/// Repository for file node CRUD and hierarchy queries.
#[derive(Debug, Clone)]
pub struct PgNodeRepository {
    pool: PgPool,
}

impl PgNodeRepository {
    /// Create a new node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn depth_bound(limit: usize) -> i32 {
    i32::try_from(limit).unwrap_or(i32::MAX)
}

#[async_trait]
impl NodeRepository for PgNodeRepository {
    async fn find_by_id(&self, id: NodeId) -> AppResult<Option<FileNode>> {
        sqlx::query_as::<_, FileNode>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find node", e))
    }

    async fn find_children(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
    ) -> AppResult<Vec<FileNode>> {
        let query = match parent_id {
            Some(parent_id) => sqlx::query_as::<_, FileNode>(
                "SELECT * FROM files WHERE user_id = $1 AND parent_id = $2 \
                 ORDER BY created_at ASC, id ASC",
            )
            .bind(owner)
            .bind(parent_id),
            None => sqlx::query_as::<_, FileNode>(
                "SELECT * FROM files WHERE user_id = $1 AND parent_id IS NULL \
                 ORDER BY created_at ASC, id ASC",
            )
            .bind(owner),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list children", e))
    }

    async fn find_flagged(&self, owner: &UserId, flag: NodeFlag) -> AppResult<Vec<FileNode>> {
        let sql = match flag {
            NodeFlag::Starred => {
                "SELECT * FROM files WHERE user_id = $1 AND is_starred \
                 ORDER BY created_at ASC, id ASC"
            }
            NodeFlag::Trash => {
                "SELECT * FROM files WHERE user_id = $1 AND is_trash \
                 ORDER BY created_at ASC, id ASC"
            }
        };

        sqlx::query_as::<_, FileNode>(sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list flagged nodes", e))
    }

    async fn find_lineage(&self, id: NodeId, limit: usize) -> AppResult<Vec<FileNode>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, FileNode>(
            "WITH RECURSIVE lineage AS ( \
                SELECT f.*, 1 AS depth FROM files f WHERE f.id = $1 \
                UNION ALL \
                SELECT p.*, l.depth + 1 FROM files p \
                INNER JOIN lineage l ON p.id = l.parent_id \
                WHERE l.depth < $2 \
             ) SELECT * FROM lineage ORDER BY depth ASC",
        )
        .bind(id)
        .bind(depth_bound(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to walk ancestors", e))
    }

    async fn find_subtree(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
        levels: usize,
    ) -> AppResult<Vec<FileNode>> {
        if levels == 0 {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, FileNode>(
            "WITH RECURSIVE subtree AS ( \
                SELECT f.*, 1 AS depth FROM files f \
                WHERE f.user_id = $1 AND f.parent_id IS NOT DISTINCT FROM $2 AND NOT f.is_trash \
                UNION ALL \
                SELECT c.*, s.depth + 1 FROM files c \
                INNER JOIN subtree s ON c.parent_id = s.id \
                WHERE s.depth < $3 AND c.user_id = $1 AND NOT c.is_trash \
             ) SELECT * FROM subtree ORDER BY created_at ASC, id ASC",
        )
        .bind(owner)
        .bind(parent_id)
        .bind(depth_bound(levels))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load subtree", e))
    }

    async fn subtree_height(&self, id: NodeId, limit: usize) -> AppResult<usize> {
        if limit == 0 {
            return Ok(0);
        }

        let height: i32 = sqlx::query_scalar(
            "WITH RECURSIVE subtree AS ( \
                SELECT id, 1 AS depth FROM files WHERE id = $1 \
                UNION ALL \
                SELECT f.id, s.depth + 1 FROM files f \
                INNER JOIN subtree s ON f.parent_id = s.id \
                WHERE s.depth < $2 \
             ) SELECT COALESCE(MAX(depth), 0) FROM subtree",
        )
        .bind(id)
        .bind(depth_bound(limit))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to measure subtree", e))?;

        Ok(usize::try_from(height).unwrap_or(0))
    }

    async fn insert(&self, node: &FileNode) -> AppResult<FileNode> {
        sqlx::query_as::<_, FileNode>(
            "INSERT INTO files (id, name, path, size, \"type\", file_url, thumbnail_url, \
             user_id, parent_id, is_folder, is_starred, is_trash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
        )
        .bind(node.id)
        .bind(&node.name)
        .bind(&node.path)
        .bind(node.size)
        .bind(&node.node_type)
        .bind(&node.file_url)
        .bind(&node.thumbnail_url)
        .bind(&node.user_id)
        .bind(node.parent_id)
        .bind(node.is_folder)
        .bind(node.is_starred)
        .bind(node.is_trash)
        .bind(node.created_at)
        .bind(node.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create node", e))
    }

    async fn update(
        &self,
        id: NodeId,
        patch: &NodePatch,
        max_depth: usize,
    ) -> AppResult<FileNode> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let owner: UserId = sqlx::query_scalar("SELECT user_id FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to find node", e))?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        // Serializes structural writes per owner across server processes.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&owner)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock owner tree", e))?;

        sqlx::query("SELECT id FROM files WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock node", e))?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        if let Some(Some(parent_id)) = patch.parent_id {
            let (closes_cycle, lineage_len): (bool, i64) = sqlx::query_as(
                "WITH RECURSIVE lineage AS ( \
                    SELECT id, parent_id, 1 AS depth FROM files WHERE id = $1 \
                    UNION ALL \
                    SELECT p.id, p.parent_id, l.depth + 1 FROM files p \
                    INNER JOIN lineage l ON p.id = l.parent_id \
                    WHERE l.depth < $3 \
                 ) SELECT COALESCE(bool_or(id = $2), false), COUNT(*) FROM lineage",
            )
            .bind(parent_id)
            .bind(id)
            .bind(depth_bound(max_depth.saturating_add(1)))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to check ancestry", e))?;

            if closes_cycle {
                return Err(AppError::cycle(format!(
                    "Moving {id} under {parent_id} would make it its own ancestor"
                )));
            }
            if usize::try_from(lineage_len).unwrap_or(usize::MAX) > max_depth {
                return Err(AppError::cycle(format!(
                    "Ancestor chain of {parent_id} exceeds {max_depth} levels"
                )));
            }
        }

        let updated = sqlx::query_as::<_, FileNode>(
            "UPDATE files SET \
                name = COALESCE($2, name), \
                parent_id = CASE WHEN $3 THEN $4 ELSE parent_id END, \
                is_starred = COALESCE($5, is_starred), \
                is_trash = COALESCE($6, is_trash), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.parent_id.is_some())
        .bind(patch.parent_id.flatten())
        .bind(patch.is_starred)
        .bind(patch.is_trash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update node", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit node update", e))?;

        debug!(node_id = %id, "Node row updated");
        Ok(updated)
    }

    async fn toggle(&self, id: NodeId, flag: NodeFlag) -> AppResult<FileNode> {
        let sql = match flag {
            NodeFlag::Starred => {
                "UPDATE files SET is_starred = NOT is_starred, updated_at = NOW() \
                 WHERE id = $1 RETURNING *"
            }
            NodeFlag::Trash => {
                "UPDATE files SET is_trash = NOT is_trash, updated_at = NOW() \
                 WHERE id = $1 RETURNING *"
            }
        };

        sqlx::query_as::<_, FileNode>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to toggle flag", e))?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    async fn delete_subtree(&self, id: NodeId) -> AppResult<u64> {
        let result = sqlx::query(
            "WITH RECURSIVE subtree AS ( \
                SELECT id FROM files WHERE id = $1 \
                UNION \
                SELECT f.id FROM files f INNER JOIN subtree s ON f.parent_id = s.id \
             ) DELETE FROM files WHERE id IN (SELECT id FROM subtree)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete node", e))?;

        debug!(node_id = %id, removed = result.rows_affected(), "Subtree deleted");
        Ok(result.rows_affected())
    }

    async fn delete_trashed(&self, owner: &UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "WITH RECURSIVE doomed AS ( \
                SELECT id FROM files WHERE user_id = $1 AND is_trash \
                UNION \
                SELECT f.id FROM files f INNER JOIN doomed d ON f.parent_id = d.id \
             ) DELETE FROM files WHERE id IN (SELECT id FROM doomed)",
        )
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to empty trash", e))?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| db_error("Health check failed", e))
    }
}
