//! PostgreSQL repository tests.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when it is not set. Every test works under its own user id, so they can
//! share one database.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use stashbox_core::config::DatabaseConfig;
use stashbox_core::error::ErrorKind;
use stashbox_core::types::{NodeId, UserId};
use stashbox_database::repositories::NodeFlag;
use stashbox_database::{DatabasePool, NodeRepository, PgNodeRepository, migration};
use stashbox_entity::node::{FOLDER_TYPE, FileNode, NodePatch};

/// Repository over a migrated pool, plus a fresh owner to work under.
struct TestDb {
    repo: PgNodeRepository,
    pool: PgPool,
    owner: UserId,
}

impl TestDb {
    async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };
        let config = DatabaseConfig {
            url,
            max_connections: 5,
            min_connections: 0,
            ..DatabaseConfig::in_memory()
        };
        let pool = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect to test database")
            .into_pool();
        migration::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            repo: PgNodeRepository::new(pool.clone()),
            pool,
            owner: UserId::parse(format!("pg_test_{}", NodeId::new())).unwrap(),
        })
    }

    async fn folder(&self, name: &str, parent_id: Option<NodeId>, offset_secs: i64) -> FileNode {
        let at = Utc::now() + Duration::seconds(offset_secs);
        let node = FileNode {
            id: NodeId::new(),
            name: name.to_string(),
            path: format!("/{name}"),
            size: 0,
            node_type: FOLDER_TYPE.to_string(),
            file_url: String::new(),
            thumbnail_url: None,
            user_id: self.owner.clone(),
            parent_id,
            is_folder: true,
            is_starred: false,
            is_trash: false,
            created_at: at,
            updated_at: at,
        };
        self.repo.insert(&node).await.unwrap()
    }

    async fn cleanup(self) {
        sqlx::query("DELETE FROM files WHERE user_id = $1")
            .bind(&self.owner)
            .execute(&self.pool)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_update_rejects_cycle_without_writing() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;
    let b = db.folder("b", Some(a.id), 1).await;
    let c = db.folder("c", Some(b.id), 2).await;

    let err = db
        .repo
        .update(a.id, &NodePatch::move_to(Some(c.id)), 64)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);

    let stored = db.repo.find_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(stored.parent_id, None);
    assert_eq!(stored.updated_at, a.updated_at);

    let d = db.folder("d", None, 3).await;
    let err = db
        .repo
        .update(d.id, &NodePatch::move_to(Some(b.id)), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);

    let moved = db
        .repo
        .update(c.id, &NodePatch::move_to(None), 64)
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);

    db.cleanup().await;
}

#[tokio::test]
async fn test_update_writes_only_patched_columns() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;

    let starred = db.repo.toggle(a.id, NodeFlag::Starred).await.unwrap();
    assert!(starred.is_starred);

    let rename = NodePatch {
        name: Some("renamed".to_string()),
        ..NodePatch::default()
    };
    let stored = db.repo.update(a.id, &rename, 64).await.unwrap();
    assert_eq!(stored.name, "renamed");
    assert!(stored.is_starred);
    assert!(!stored.is_trash);

    let err = db
        .repo
        .update(NodeId::new(), &rename, 64)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    db.cleanup().await;
}

#[tokio::test]
async fn test_delete_counts_whole_subtree() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;
    let b = db.folder("b", Some(a.id), 1).await;
    db.folder("c", Some(b.id), 2).await;
    let binned = db.folder("binned", None, 3).await;
    db.folder("under_bin", Some(binned.id), 4).await;
    let keep = db.folder("keep", None, 5).await;

    assert_eq!(db.repo.delete_subtree(a.id).await.unwrap(), 3);

    db.repo.toggle(binned.id, NodeFlag::Trash).await.unwrap();
    assert_eq!(db.repo.delete_trashed(&db.owner).await.unwrap(), 2);

    let left = db.repo.find_children(&db.owner, None).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, keep.id);

    db.cleanup().await;
}

#[tokio::test]
async fn test_lineage_and_height_stop_at_limit() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;
    let b = db.folder("b", Some(a.id), 1).await;
    let c = db.folder("c", Some(b.id), 2).await;

    let chain = db.repo.find_lineage(c.id, 64).await.unwrap();
    let ids: Vec<_> = chain.iter().map(|n| n.id).collect();
    assert_eq!(ids, [c.id, b.id, a.id]);
    assert_eq!(db.repo.find_lineage(c.id, 2).await.unwrap().len(), 2);
    assert!(db.repo.find_lineage(NodeId::new(), 64).await.unwrap().is_empty());

    assert_eq!(db.repo.subtree_height(a.id, 64).await.unwrap(), 3);
    assert_eq!(db.repo.subtree_height(a.id, 2).await.unwrap(), 2);

    // Corrupt the tree into a loop behind the repository's back.
    sqlx::query("UPDATE files SET parent_id = $1 WHERE id = $2")
        .bind(b.id)
        .bind(a.id)
        .execute(&db.pool)
        .await
        .unwrap();

    assert_eq!(db.repo.find_lineage(a.id, 10).await.unwrap().len(), 10);
    assert_eq!(db.repo.subtree_height(a.id, 10).await.unwrap(), 10);

    db.cleanup().await;
}

#[tokio::test]
async fn test_subtree_prunes_trash() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;
    let b = db.folder("b", Some(a.id), 1).await;
    db.folder("c", Some(b.id), 2).await;
    let binned = db.folder("binned", None, 3).await;
    db.folder("under_bin", Some(binned.id), 4).await;
    db.repo.toggle(binned.id, NodeFlag::Trash).await.unwrap();

    let all = db.repo.find_subtree(&db.owner, None, 64).await.unwrap();
    let names: Vec<_> = all.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let below_a = db.repo.find_subtree(&db.owner, Some(a.id), 1).await.unwrap();
    assert_eq!(below_a.len(), 1);
    assert_eq!(below_a[0].id, b.id);

    db.cleanup().await;
}

#[tokio::test]
async fn test_cross_moves_from_two_pools_cannot_loop() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let Some(other) = TestDb::connect().await else {
        return;
    };
    let a = db.folder("a", None, 0).await;
    let b = db.folder("b", None, 1).await;

    let move_a = NodePatch::move_to(Some(b.id));
    let move_b = NodePatch::move_to(Some(a.id));
    let (first, second) = tokio::join!(
        db.repo.update(a.id, &move_a, 64),
        other.repo.update(b.id, &move_b, 64),
    );
    assert!(first.is_ok() != second.is_ok());

    assert!(db.repo.find_lineage(a.id, 64).await.unwrap().len() <= 2);
    assert!(db.repo.find_lineage(b.id, 64).await.unwrap().len() <= 2);

    db.cleanup().await;
}
