//! Per-owner serialization of tree mutations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use stashbox_core::types::UserId;

/// One async mutex per owner.
///
/// Every structural write for an owner holds that owner's guard from its
/// first validation read until the write lands, so two requests cannot
/// both pass a cycle check and then jointly create a loop. Different
/// owners never contend because their trees cannot reference each other.
///
/// An owner's entry lives only while some task holds or waits for its
/// mutex, so the table stays as small as the number of active writers.
#[derive(Debug, Clone, Default)]
pub struct OwnerLocks {
    inner: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the guard of `owner`.
    pub async fn acquire(&self, owner: &UserId) -> OwnerGuard {
        let lock = self.inner.entry(owner.clone()).or_default().clone();
        let mut held = OwnerGuard {
            table: Arc::clone(&self.inner),
            owner: owner.clone(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    /// Number of owners currently holding or waiting for a lock.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no owner holds or waits for a lock.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held lock of one owner. Dropping it releases the mutex and forgets the
/// owner once nobody else is queued on it.
#[derive(Debug)]
pub struct OwnerGuard {
    table: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
    owner: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        self.guard.take();
        // `entry` and `remove_if` share the shard lock, so a task cannot
        // pick up the mutex between the count check and the removal.
        self.table
            .remove_if(&self.owner, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_owner_waits() {
        let locks = OwnerLocks::new();
        let owner = UserId::parse("user_a").unwrap();

        let guard = locks.acquire(&owner).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&owner)).await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&owner)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_owners_are_independent() {
        let locks = OwnerLocks::new();
        let a = UserId::parse("user_a").unwrap();
        let b = UserId::parse("user_b").unwrap();

        let _guard = locks.acquire(&a).await;
        let other = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&b)).await;
        assert!(other.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_released_owners_are_forgotten() {
        let locks = OwnerLocks::new();
        for i in 0..1_000 {
            let owner = UserId::parse(format!("user_{i}")).unwrap();
            let guard = locks.acquire(&owner).await;
            assert_eq!(locks.len(), 1);
            drop(guard);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = OwnerLocks::new();
        let owner = UserId::parse("user_a").unwrap();

        let first = locks.acquire(&owner).await;
        let waiter = {
            let locks = locks.clone();
            let owner = owner.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&owner).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
