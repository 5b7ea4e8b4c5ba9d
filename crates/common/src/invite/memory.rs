use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;
use uuid::Uuid;

use super::code::InviteCode;
use super::provider::{InviteRecord, InviteStatus, InviteStore, InviteStoreError};

/// In-memory invite store backed by HashMaps. Used by the linking
/// engine's unit tests; the daemon substitutes its SQLite store.
#[derive(Debug, Clone, Default)]
pub struct MemoryInviteStore {
    inner: Arc<RwLock<MemoryInviteStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryInviteStoreInner {
    /// Every record ever stored, keyed by code value. Superseded rows
    /// are kept so `lookup` can report their status.
    records: HashMap<InviteCode, InviteRecord>,
    /// parent_id -> code of the current active row.
    active: HashMap<Uuid, InviteCode>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryInviteStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
}

impl MemoryInviteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> InviteStoreError<MemoryInviteStoreError> {
    InviteStoreError::Provider(MemoryInviteStoreError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

#[async_trait]
impl InviteStore for MemoryInviteStore {
    type Error = MemoryInviteStoreError;

    async fn put_active(&self, record: InviteRecord) -> Result<(), InviteStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_err)?;

        // Reject a value already held by someone else's active row.
        if let Some(existing) = inner.records.get(&record.code) {
            if existing.status == InviteStatus::Active && existing.parent_id != record.parent_id {
                return Err(InviteStoreError::Collision);
            }
        }

        // Supersede the parent's previous active row, if any.
        if let Some(prev_code) = inner.active.remove(&record.parent_id) {
            if let Some(prev) = inner.records.get_mut(&prev_code) {
                prev.status = InviteStatus::Superseded;
            }
        }

        inner.active.insert(record.parent_id, record.code.clone());
        inner.records.insert(record.code.clone(), record);
        Ok(())
    }

    async fn lookup(
        &self,
        code: &InviteCode,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_err)?;
        Ok(inner.records.get(code).cloned())
    }

    async fn current_for(
        &self,
        parent_id: Uuid,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_err)?;
        let now = OffsetDateTime::now_utc();
        Ok(inner
            .active
            .get(&parent_id)
            .and_then(|code| inner.records.get(code))
            .filter(|r| r.is_redeemable(now))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn record(parent_id: Uuid, code: &str, ttl: Option<Duration>) -> InviteRecord {
        let now = OffsetDateTime::now_utc();
        InviteRecord {
            parent_id,
            code: InviteCode::parse(code).unwrap(),
            status: InviteStatus::Active,
            created_at: now,
            expires_at: ttl.map(|t| now + t),
        }
    }

    #[tokio::test]
    async fn put_active_supersedes_previous() {
        let store = MemoryInviteStore::new();
        let parent = Uuid::new_v4();

        store.put_active(record(parent, "AAAA2222", None)).await.unwrap();
        store.put_active(record(parent, "BBBB3333", None)).await.unwrap();

        let old = store
            .lookup(&InviteCode::parse("AAAA2222").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old.status, InviteStatus::Superseded);

        let current = store.current_for(parent).await.unwrap().unwrap();
        assert_eq!(current.code.as_str(), "BBBB3333");
    }

    #[tokio::test]
    async fn active_collision_is_rejected() {
        let store = MemoryInviteStore::new();
        store
            .put_active(record(Uuid::new_v4(), "CCCC4444", None))
            .await
            .unwrap();

        let result = store
            .put_active(record(Uuid::new_v4(), "CCCC4444", None))
            .await;
        assert!(matches!(result, Err(InviteStoreError::Collision)));
    }

    #[tokio::test]
    async fn expired_active_row_reads_as_absent() {
        let store = MemoryInviteStore::new();
        let parent = Uuid::new_v4();
        store
            .put_active(record(parent, "DDDD5555", Some(Duration::days(-1))))
            .await
            .unwrap();

        assert!(store.current_for(parent).await.unwrap().is_none());
        // but lookup still returns the row; callers decide validity
        let row = store
            .lookup(&InviteCode::parse("DDDD5555").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!row.is_redeemable(OffsetDateTime::now_utc()));
    }
}
