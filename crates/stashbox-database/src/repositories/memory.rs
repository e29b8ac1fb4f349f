//! In-memory file node repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stashbox_core::error::AppError;
use stashbox_core::result::AppResult;
use stashbox_core::types::{NodeId, UserId};
use stashbox_entity::node::{FileNode, NodePatch};

use super::{NodeFlag, NodeRepository};

/// Node repository holding every row in a process-local map.
///
/// All writes go through one lock, so a cycle check and the write it
/// guards can never interleave with another write.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeRepository {
    nodes: Arc<RwLock<HashMap<NodeId, FileNode>>>,
}

impl MemoryNodeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Whether the repository holds no nodes.
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    /// Store a node as-is, bypassing every check.
    ///
    /// Only meant for seeding fixtures such as deliberately corrupted trees.
    pub async fn put_unchecked(&self, node: FileNode) {
        self.nodes.write().await.insert(node.id, node);
    }
}

fn sorted(mut nodes: Vec<FileNode>) -> Vec<FileNode> {
    nodes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    nodes
}

fn lineage(nodes: &HashMap<NodeId, FileNode>, id: NodeId, limit: usize) -> Vec<FileNode> {
    let mut chain = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if chain.len() >= limit {
            break;
        }
        match nodes.get(&current) {
            Some(node) => {
                cursor = node.parent_id;
                chain.push(node.clone());
            }
            None => break,
        }
    }
    chain
}

/// Ids of `roots` and every node below them. Visits each id once, so a
/// corrupted cyclic tree still terminates.
fn collect_subtree(nodes: &HashMap<NodeId, FileNode>, roots: Vec<NodeId>) -> HashSet<NodeId> {
    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for node in nodes.values() {
        if let Some(parent_id) = node.parent_id {
            children.entry(parent_id).or_default().push(node.id);
        }
    }

    let mut seen = HashSet::new();
    let mut stack = roots;
    while let Some(id) = stack.pop() {
        if !nodes.contains_key(&id) || !seen.insert(id) {
            continue;
        }
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }
    seen
}

#[async_trait]
impl NodeRepository for MemoryNodeRepository {
    async fn find_by_id(&self, id: NodeId) -> AppResult<Option<FileNode>> {
        Ok(self.nodes.read().await.get(&id).cloned())
    }

    async fn find_children(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
    ) -> AppResult<Vec<FileNode>> {
        let nodes = self.nodes.read().await;
        let children = nodes
            .values()
            .filter(|n| &n.user_id == owner && n.parent_id == parent_id)
            .cloned()
            .collect();
        Ok(sorted(children))
    }

    async fn find_flagged(&self, owner: &UserId, flag: NodeFlag) -> AppResult<Vec<FileNode>> {
        let nodes = self.nodes.read().await;
        let flagged = nodes
            .values()
            .filter(|n| &n.user_id == owner)
            .filter(|n| match flag {
                NodeFlag::Starred => n.is_starred,
                NodeFlag::Trash => n.is_trash,
            })
            .cloned()
            .collect();
        Ok(sorted(flagged))
    }

    async fn find_lineage(&self, id: NodeId, limit: usize) -> AppResult<Vec<FileNode>> {
        let nodes = self.nodes.read().await;
        Ok(lineage(&nodes, id, limit))
    }

    async fn find_subtree(
        &self,
        owner: &UserId,
        parent_id: Option<NodeId>,
        levels: usize,
    ) -> AppResult<Vec<FileNode>> {
        let nodes = self.nodes.read().await;
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut level = vec![parent_id];

        for _ in 0..levels {
            let next: Vec<FileNode> = nodes
                .values()
                .filter(|n| &n.user_id == owner && !n.is_trash && level.contains(&n.parent_id))
                .filter(|n| seen.insert(n.id))
                .cloned()
                .collect();
            if next.is_empty() {
                break;
            }
            level = next.iter().map(|n| Some(n.id)).collect();
            found.extend(next);
        }
        Ok(sorted(found))
    }

    async fn subtree_height(&self, id: NodeId, limit: usize) -> AppResult<usize> {
        let nodes = self.nodes.read().await;
        if limit == 0 || !nodes.contains_key(&id) {
            return Ok(0);
        }

        let mut height = 1;
        let mut level = vec![id];
        while height < limit {
            let next: Vec<NodeId> = nodes
                .values()
                .filter(|n| n.parent_id.is_some_and(|p| level.contains(&p)))
                .map(|n| n.id)
                .collect();
            if next.is_empty() {
                break;
            }
            height += 1;
            level = next;
        }
        Ok(height)
    }

    async fn insert(&self, node: &FileNode) -> AppResult<FileNode> {
        let mut nodes = self.nodes.write().await;
        if nodes.contains_key(&node.id) {
            return Err(AppError::conflict(format!("Node {} already exists", node.id)));
        }
        if let Some(parent_id) = node.parent_id {
            if !nodes.contains_key(&parent_id) {
                return Err(AppError::validation(format!(
                    "Parent {parent_id} no longer exists"
                )));
            }
        }
        nodes.insert(node.id, node.clone());
        Ok(node.clone())
    }

    async fn update(
        &self,
        id: NodeId,
        patch: &NodePatch,
        max_depth: usize,
    ) -> AppResult<FileNode> {
        let mut nodes = self.nodes.write().await;
        if !nodes.contains_key(&id) {
            return Err(AppError::not_found(format!("Node {id} not found")));
        }

        if let Some(Some(parent_id)) = patch.parent_id {
            if !nodes.contains_key(&parent_id) {
                return Err(AppError::validation(format!(
                    "Parent {parent_id} no longer exists"
                )));
            }
            let chain = lineage(&nodes, parent_id, max_depth.saturating_add(1));
            if chain.iter().any(|n| n.id == id) {
                return Err(AppError::cycle(format!(
                    "Moving {id} under {parent_id} would make it its own ancestor"
                )));
            }
            if chain.len() > max_depth {
                return Err(AppError::cycle(format!(
                    "Ancestor chain of {parent_id} exceeds {max_depth} levels"
                )));
            }
        }

        let stored = nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        if let Some(name) = &patch.name {
            stored.name = name.clone();
        }
        if let Some(parent_id) = patch.parent_id {
            stored.parent_id = parent_id;
        }
        if let Some(is_starred) = patch.is_starred {
            stored.is_starred = is_starred;
        }
        if let Some(is_trash) = patch.is_trash {
            stored.is_trash = is_trash;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn toggle(&self, id: NodeId, flag: NodeFlag) -> AppResult<FileNode> {
        let mut nodes = self.nodes.write().await;
        let stored = nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        match flag {
            NodeFlag::Starred => stored.is_starred = !stored.is_starred,
            NodeFlag::Trash => stored.is_trash = !stored.is_trash,
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_subtree(&self, id: NodeId) -> AppResult<u64> {
        let mut nodes = self.nodes.write().await;
        let doomed = collect_subtree(&nodes, vec![id]);
        nodes.retain(|id, _| !doomed.contains(id));
        Ok(doomed.len() as u64)
    }

    async fn delete_trashed(&self, owner: &UserId) -> AppResult<u64> {
        let mut nodes = self.nodes.write().await;
        let roots = nodes
            .values()
            .filter(|n| &n.user_id == owner && n.is_trash)
            .map(|n| n.id)
            .collect();
        let doomed = collect_subtree(&nodes, roots);
        nodes.retain(|id, _| !doomed.contains(id));
        Ok(doomed.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use stashbox_core::error::ErrorKind;
    use stashbox_entity::node::FOLDER_TYPE;

    fn owner() -> UserId {
        UserId::parse("user_mem").unwrap()
    }

    fn folder(name: &str, parent_id: Option<NodeId>, offset_secs: i64) -> FileNode {
        let at = Utc::now() + Duration::seconds(offset_secs);
        FileNode {
            id: NodeId::new(),
            name: name.to_string(),
            path: format!("/{name}"),
            size: 0,
            node_type: FOLDER_TYPE.to_string(),
            file_url: String::new(),
            thumbnail_url: None,
            user_id: owner(),
            parent_id,
            is_folder: true,
            is_starred: false,
            is_trash: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_children_ordered_by_creation() {
        let repo = MemoryNodeRepository::new();
        let later = folder("later", None, 10);
        let earlier = folder("earlier", None, 0);
        repo.insert(&later).await.unwrap();
        repo.insert(&earlier).await.unwrap();

        let roots = repo.find_children(&owner(), None).await.unwrap();
        let names: Vec<_> = roots.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["earlier", "later"]);
    }

    #[tokio::test]
    async fn test_lineage_terminates_on_corrupted_cycle() {
        let repo = MemoryNodeRepository::new();
        let mut a = folder("a", None, 0);
        let b = folder("b", Some(a.id), 1);
        a.parent_id = Some(b.id);
        repo.put_unchecked(a.clone()).await;
        repo.put_unchecked(b.clone()).await;

        let chain = repo.find_lineage(a.id, 10).await.unwrap();
        assert_eq!(chain.len(), 10);

        let removed = repo.delete_subtree(a.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_rejects_cycle_without_writing() {
        let repo = MemoryNodeRepository::new();
        let a = folder("a", None, 0);
        let b = folder("b", Some(a.id), 1);
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let err = repo
            .update(a.id, &NodePatch::move_to(Some(b.id)), 64)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cycle);

        let stored = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.parent_id, None);
    }

    #[tokio::test]
    async fn test_subtree_height_and_delete() {
        let repo = MemoryNodeRepository::new();
        let a = folder("a", None, 0);
        let b = folder("b", Some(a.id), 1);
        let c = folder("c", Some(b.id), 2);
        let other = folder("other", None, 3);
        for node in [&a, &b, &c, &other] {
            repo.insert(node).await.unwrap();
        }

        assert_eq!(repo.subtree_height(a.id, 64).await.unwrap(), 3);
        assert_eq!(repo.subtree_height(a.id, 2).await.unwrap(), 2);
        assert_eq!(repo.subtree_height(NodeId::new(), 64).await.unwrap(), 0);

        assert_eq!(repo.delete_subtree(a.id).await.unwrap(), 3);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_trashed_takes_descendants() {
        let repo = MemoryNodeRepository::new();
        let mut a = folder("a", None, 0);
        a.is_trash = true;
        let b = folder("b", Some(a.id), 1);
        let keep = folder("keep", None, 2);
        for node in [&a, &b, &keep] {
            repo.insert(node).await.unwrap();
        }

        assert_eq!(repo.delete_trashed(&owner()).await.unwrap(), 2);
        let left = repo.find_children(&owner(), None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "keep");
    }

    #[tokio::test]
    async fn test_update_leaves_unpatched_columns() {
        let repo = MemoryNodeRepository::new();
        let a = folder("a", None, 0);
        repo.insert(&a).await.unwrap();

        repo.toggle(a.id, NodeFlag::Starred).await.unwrap();
        let rename = NodePatch {
            name: Some("renamed".to_string()),
            ..NodePatch::default()
        };
        let stored = repo.update(a.id, &rename, 64).await.unwrap();
        assert_eq!(stored.name, "renamed");
        assert!(stored.is_starred);
        assert!(stored.updated_at >= a.updated_at);
    }

    #[tokio::test]
    async fn test_subtree_prunes_trash_and_stops_at_levels() {
        let repo = MemoryNodeRepository::new();
        let a = folder("a", None, 0);
        let b = folder("b", Some(a.id), 1);
        let c = folder("c", Some(b.id), 2);
        let mut binned = folder("binned", None, 3);
        binned.is_trash = true;
        let under_bin = folder("under_bin", Some(binned.id), 4);
        for node in [&a, &b, &c, &binned, &under_bin] {
            repo.insert(node).await.unwrap();
        }

        let all = repo.find_subtree(&owner(), None, 64).await.unwrap();
        let names: Vec<_> = all.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        let two = repo.find_subtree(&owner(), None, 2).await.unwrap();
        assert_eq!(two.len(), 2);

        let below_a = repo.find_subtree(&owner(), Some(a.id), 64).await.unwrap();
        let names: Vec<_> = below_a.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }
}
