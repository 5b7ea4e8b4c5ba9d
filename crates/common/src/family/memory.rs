use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;
use uuid::Uuid;

use super::provider::{Relationship, RelationshipStore, RelationshipStoreError};

/// In-memory relationship store. Keyed by child id, which gives the
/// single-parent constraint for free.
#[derive(Debug, Clone, Default)]
pub struct MemoryRelationshipStore {
    inner: Arc<RwLock<HashMap<Uuid, Relationship>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryRelationshipStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> RelationshipStoreError<MemoryRelationshipStoreError> {
    RelationshipStoreError::Provider(MemoryRelationshipStoreError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    type Error = MemoryRelationshipStoreError;

    async fn link(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<Relationship, RelationshipStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        if inner.contains_key(&child_id) {
            return Err(RelationshipStoreError::ChildTaken);
        }
        let edge = Relationship {
            parent_id,
            child_id,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.insert(child_id, edge.clone());
        Ok(edge)
    }

    async fn unlink_child(
        &self,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        Ok(inner.remove(&child_id).is_some())
    }

    async fn unlink_edge(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        match inner.get(&child_id) {
            Some(edge) if edge.parent_id == parent_id => {
                inner.remove(&child_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn unlink_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<usize, RelationshipStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        let before = inner.len();
        inner.retain(|_, edge| edge.parent_id != parent_id);
        Ok(before - inner.len())
    }

    async fn parent_of(
        &self,
        child_id: Uuid,
    ) -> Result<Option<Relationship>, RelationshipStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_err)?;
        Ok(inner.get(&child_id).cloned())
    }

    async fn children_of(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<Relationship>, RelationshipStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_err)?;
        let mut edges: Vec<Relationship> = inner
            .values()
            .filter(|edge| edge.parent_id == parent_id)
            .cloned()
            .collect();
        edges.sort_by_key(|edge| edge.created_at);
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn link_is_insert_if_absent() {
        let store = MemoryRelationshipStore::new();
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();

        store.link(parent, child).await.unwrap();

        // second link for the same child fails, even to the same parent
        let result = store.link(parent, child).await;
        assert!(matches!(result, Err(RelationshipStoreError::ChildTaken)));

        let result = store.link(Uuid::new_v4(), child).await;
        assert!(matches!(result, Err(RelationshipStoreError::ChildTaken)));
    }

    #[tokio::test]
    async fn unlink_child_is_idempotent() {
        let store = MemoryRelationshipStore::new();
        let child = Uuid::new_v4();
        store.link(Uuid::new_v4(), child).await.unwrap();

        assert!(store.unlink_child(child).await.unwrap());
        assert!(!store.unlink_child(child).await.unwrap());
    }

    #[tokio::test]
    async fn unlink_edge_only_matches_the_named_parent() {
        let store = MemoryRelationshipStore::new();
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        store.link(parent, child).await.unwrap();

        assert!(!store.unlink_edge(Uuid::new_v4(), child).await.unwrap());
        assert!(store.parent_of(child).await.unwrap().is_some());

        assert!(store.unlink_edge(parent, child).await.unwrap());
        assert!(!store.unlink_edge(parent, child).await.unwrap());
    }

    #[tokio::test]
    async fn unlink_parent_severs_all_edges() {
        let store = MemoryRelationshipStore::new();
        let parent = Uuid::new_v4();
        store.link(parent, Uuid::new_v4()).await.unwrap();
        store.link(parent, Uuid::new_v4()).await.unwrap();
        store.link(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        assert_eq!(store.unlink_parent(parent).await.unwrap(), 2);
        assert!(store.children_of(parent).await.unwrap().is_empty());
    }
}
