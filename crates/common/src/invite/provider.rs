use std::fmt::{Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::code::InviteCode;

/// Lifecycle status of a stored invitation code.
///
/// Expiry is deliberately not a stored status: a row stays `Active` in
/// the store and is treated as expired lazily, at read time, whenever
/// `now > expires_at`. There is no background sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Active,
    Superseded,
}

/// A stored invitation code owned by one parent account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRecord {
    pub parent_id: Uuid,
    pub code: InviteCode,
    pub status: InviteStatus,
    pub created_at: OffsetDateTime,
    /// None means the code never expires.
    pub expires_at: Option<OffsetDateTime>,
}

impl InviteRecord {
    /// Whether this code can still form a link at instant `now`.
    pub fn is_redeemable(&self, now: OffsetDateTime) -> bool {
        self.status == InviteStatus::Active
            && self.expires_at.map(|exp| now <= exp).unwrap_or(true)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InviteStoreError<T> {
    #[error("unhandled invite store error: {0}")]
    Provider(#[from] T),
    /// The code value collides with another currently-active code.
    /// Callers re-draw and retry.
    #[error("code value collides with an active code")]
    Collision,
}

/// Persistence contract for invitation codes.
///
/// Invariant the implementation must uphold: at most one `Active` row
/// per parent at any observable instant. `put_active` supersedes and
/// inserts as one atomic unit so there is never a window with two
/// active rows, and never a row that is both active and superseded.
#[async_trait]
pub trait InviteStore: Send + Sync + Clone + 'static {
    type Error: Display + Debug;

    /// Atomically mark any prior active code for `record.parent_id` as
    /// superseded and store `record` as the new active code.
    ///
    /// Fails with `Collision` when `record.code` matches another
    /// currently-active code (for any parent).
    async fn put_active(&self, record: InviteRecord) -> Result<(), InviteStoreError<Self::Error>>;

    /// Exact-match lookup. Returns the record regardless of status or
    /// expiry; callers decide validity.
    async fn lookup(
        &self,
        code: &InviteCode,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>>;

    /// The current active, unexpired code for a parent, if any. A
    /// lingering active-but-expired row reads as `None`.
    async fn current_for(
        &self,
        parent_id: Uuid,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>>;
}
