use std::fmt::{Debug, Display};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// A committed parent <-> child edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub parent_id: Uuid,
    pub child_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationshipStoreError<T> {
    #[error("unhandled relationship store error: {0}")]
    Provider(#[from] T),
    /// The child side of the edge already exists. Raised by the store's
    /// insert-if-absent so concurrent redemptions cannot double-link a
    /// child.
    #[error("child is already linked to a parent")]
    ChildTaken,
}

/// Persistence contract for relationship edges.
///
/// The single-parent constraint (a child has at most one edge) is the
/// store's responsibility: `link` must be an atomic insert-if-absent on
/// the child id, not a read-then-write.
#[async_trait]
pub trait RelationshipStore: Send + Sync + Clone + 'static {
    type Error: Display + Debug;

    /// Create the edge. Fails with `ChildTaken` if the child already
    /// has any relationship, including to the same parent.
    async fn link(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<Relationship, RelationshipStoreError<Self::Error>>;

    /// Remove the child's edge if present. Returns whether an edge was
    /// actually removed; removing a non-existent edge is not an error.
    async fn unlink_child(
        &self,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>>;

    /// Remove the exact `(parent_id, child_id)` edge if it exists.
    /// Returns whether an edge was removed. The parent match must be
    /// part of the delete itself, not a prior read, so a child that
    /// has since relinked elsewhere is never touched.
    async fn unlink_edge(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>>;

    /// Remove every edge where `parent_id` is the supervising side.
    /// Returns the number of edges removed.
    async fn unlink_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<usize, RelationshipStoreError<Self::Error>>;

    /// The child's edge, if any.
    async fn parent_of(
        &self,
        child_id: Uuid,
    ) -> Result<Option<Relationship>, RelationshipStoreError<Self::Error>>;

    /// All edges supervised by a parent.
    async fn children_of(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<Relationship>, RelationshipStoreError<Self::Error>>;
}
