use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::account::{Identity, Role};
use crate::invite::{
    InviteCode, InviteCodeError, InviteRecord, InviteStatus, InviteStore, InviteStoreError,
};

use super::provider::{Relationship, RelationshipStore, RelationshipStoreError};

/// How many fresh codes to draw before giving up on a collision streak.
/// With 32^8 values this only trips if the RNG is broken.
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(thiserror::Error, Debug)]
pub enum LinkError<IE, RE>
where
    IE: std::fmt::Display + std::fmt::Debug,
    RE: std::fmt::Display + std::fmt::Debug,
{
    #[error("invite store error: {0}")]
    InviteStore(IE),
    #[error("relationship store error: {0}")]
    RelationshipStore(RE),
    /// Caller's role does not permit the operation.
    #[error("operation requires the {0} role")]
    Forbidden(Role),
    #[error("invalid code: {0}")]
    InvalidFormat(#[from] InviteCodeError),
    #[error("no such invitation code")]
    NotFound,
    /// Covers both a superseded code and a lapsed expiry.
    #[error("invitation code is no longer redeemable")]
    Expired,
    #[error("account is already linked to a parent")]
    AlreadyLinked,
    /// Lost a concurrent-write race; safe to retry once.
    #[error("could not commit a unique code, retry")]
    Conflict,
}

/// The state machine governing code generation, redemption, unlink and
/// relink. All mutation of invite and relationship rows goes through
/// here; handlers and query modules only read.
///
/// Per-parent code lifecycle: NONE -> ACTIVE -> (SUPERSEDED | EXPIRED),
/// re-entrant via `generate_code`.
#[derive(Debug, Clone)]
pub struct LinkingEngine<I, R> {
    invites: I,
    relationships: R,
}

type LinkResult<T, I, R> =
    Result<T, LinkError<<I as InviteStore>::Error, <R as RelationshipStore>::Error>>;

impl<I, R> LinkingEngine<I, R>
where
    I: InviteStore,
    R: RelationshipStore,
{
    pub fn new(invites: I, relationships: R) -> Self {
        Self {
            invites,
            relationships,
        }
    }

    /// Generate a fresh code for a parent, superseding any prior active
    /// code in the same store transaction. Existing relationships are
    /// unaffected.
    pub async fn generate_code(
        &self,
        caller: &Identity,
        ttl: Option<Duration>,
    ) -> LinkResult<InviteRecord, I, R> {
        if !caller.is_parent() {
            return Err(LinkError::Forbidden(Role::Parent));
        }

        let now = OffsetDateTime::now_utc();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let record = InviteRecord {
                parent_id: caller.id,
                code: InviteCode::generate(),
                status: InviteStatus::Active,
                created_at: now,
                expires_at: ttl.map(|t| now + t),
            };

            match self.invites.put_active(record.clone()).await {
                Ok(()) => {
                    tracing::info!(parent_id = %caller.id, code = %record.code, "issued invitation code");
                    return Ok(record);
                }
                Err(InviteStoreError::Collision) => {
                    tracing::warn!(parent_id = %caller.id, "invitation code collision, redrawing");
                    continue;
                }
                Err(InviteStoreError::Provider(e)) => return Err(LinkError::InviteStore(e)),
            }
        }

        Err(LinkError::Conflict)
    }

    /// Redeem a code as a child, forming the relationship edge.
    ///
    /// Checks run in a fixed order so the first failing check determines
    /// the error: role, format, existence, redeemability, existing link.
    /// The same active code may be redeemed by any number of distinct
    /// children; only the caller's own prior link blocks redemption.
    pub async fn redeem_code(
        &self,
        caller: &Identity,
        raw_code: &str,
    ) -> LinkResult<(InviteRecord, Relationship), I, R> {
        if !caller.is_child() {
            return Err(LinkError::Forbidden(Role::Child));
        }

        let code = InviteCode::parse(raw_code)?;

        let record = self
            .invites
            .lookup(&code)
            .await
            .map_err(Self::invite_err)?
            .ok_or(LinkError::NotFound)?;

        if !record.is_redeemable(OffsetDateTime::now_utc()) {
            return Err(LinkError::Expired);
        }

        let existing = self
            .relationships
            .parent_of(caller.id)
            .await
            .map_err(Self::relationship_err)?;
        if existing.is_some() {
            return Err(LinkError::AlreadyLinked);
        }

        // The store's insert-if-absent closes the read-then-write race:
        // two concurrent redemptions by the same child resolve to one
        // edge and one AlreadyLinked.
        match self.relationships.link(record.parent_id, caller.id).await {
            Ok(edge) => {
                tracing::info!(parent_id = %record.parent_id, child_id = %caller.id, "relationship formed");
                Ok((record, edge))
            }
            Err(RelationshipStoreError::ChildTaken) => Err(LinkError::AlreadyLinked),
            Err(RelationshipStoreError::Provider(e)) => Err(LinkError::RelationshipStore(e)),
        }
    }

    /// Sever the caller's own link(s). A child drops its single edge; a
    /// parent drops every edge it supervises. Idempotent: severing
    /// nothing is still success.
    pub async fn leave(&self, caller: &Identity) -> LinkResult<(), I, R> {
        match caller.role {
            Role::Child => {
                let removed = self
                    .relationships
                    .unlink_child(caller.id)
                    .await
                    .map_err(Self::relationship_err)?;
                if removed {
                    tracing::info!(child_id = %caller.id, "child left family");
                }
            }
            Role::Parent => {
                let removed = self
                    .relationships
                    .unlink_parent(caller.id)
                    .await
                    .map_err(Self::relationship_err)?;
                if removed > 0 {
                    tracing::info!(parent_id = %caller.id, removed, "parent dissolved family links");
                }
            }
        }
        Ok(())
    }

    /// Parent-only removal of one named child. The delete matches on
    /// both endpoints of the edge, so a parent can never sever another
    /// family's edge, even if the child relinked mid-request.
    pub async fn remove_child(&self, caller: &Identity, child_id: Uuid) -> LinkResult<(), I, R> {
        if !caller.is_parent() {
            return Err(LinkError::Forbidden(Role::Parent));
        }

        let removed = self
            .relationships
            .unlink_edge(caller.id, child_id)
            .await
            .map_err(Self::relationship_err)?;
        if !removed {
            return Err(LinkError::Forbidden(Role::Parent));
        }

        tracing::info!(parent_id = %caller.id, child_id = %child_id, "parent removed child");
        Ok(())
    }

    fn invite_err(e: InviteStoreError<I::Error>) -> LinkError<I::Error, R::Error> {
        match e {
            InviteStoreError::Provider(e) => LinkError::InviteStore(e),
            // lookup/current_for never collide; treat as a lost race
            InviteStoreError::Collision => LinkError::Conflict,
        }
    }

    fn relationship_err(e: RelationshipStoreError<R::Error>) -> LinkError<I::Error, R::Error> {
        match e {
            RelationshipStoreError::Provider(e) => LinkError::RelationshipStore(e),
            RelationshipStoreError::ChildTaken => LinkError::AlreadyLinked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::memory::MemoryRelationshipStore;
    use crate::invite::memory::MemoryInviteStore;

    fn engine() -> LinkingEngine<MemoryInviteStore, MemoryRelationshipStore> {
        LinkingEngine::new(MemoryInviteStore::new(), MemoryRelationshipStore::new())
    }

    fn parent() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Parent)
    }

    fn child() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Child)
    }

    #[tokio::test]
    async fn generate_requires_parent_role() {
        let engine = engine();
        let result = engine.generate_code(&child(), None).await;
        assert!(matches!(result, Err(LinkError::Forbidden(Role::Parent))));
    }

    #[tokio::test]
    async fn generate_twice_leaves_exactly_one_active() {
        let engine = engine();
        let p = parent();

        let first = engine.generate_code(&p, None).await.unwrap();
        let second = engine.generate_code(&p, None).await.unwrap();
        assert_ne!(first.code, second.code);

        let current = engine.invites.current_for(p.id).await.unwrap().unwrap();
        assert_eq!(current.code, second.code);

        let old = engine.invites.lookup(&first.code).await.unwrap().unwrap();
        assert_eq!(old.status, InviteStatus::Superseded);

        // the superseded code is no longer redeemable
        let c = child();
        let result = engine.redeem_code(&c, first.code.as_str()).await;
        assert!(matches!(result, Err(LinkError::Expired)));

        // the fresh one is
        engine.redeem_code(&c, second.code.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn redeem_creates_exactly_one_edge() {
        let engine = engine();
        let p = parent();
        let c = child();

        let record = engine.generate_code(&p, Some(Duration::days(7))).await.unwrap();
        let (redeemed, edge) = engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        assert_eq!(redeemed.parent_id, p.id);
        assert_eq!(edge.parent_id, p.id);
        assert_eq!(edge.child_id, c.id);

        let edges = engine.relationships.children_of(p.id).await.unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[tokio::test]
    async fn same_code_links_multiple_children() {
        let engine = engine();
        let p = parent();
        let record = engine.generate_code(&p, None).await.unwrap();

        engine.redeem_code(&child(), record.code.as_str()).await.unwrap();
        engine.redeem_code(&child(), record.code.as_str()).await.unwrap();

        let edges = engine.relationships.children_of(p.id).await.unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn linked_child_cannot_redeem_again() {
        let engine = engine();
        let p = parent();
        let c = child();
        let record = engine.generate_code(&p, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        // same code, same parent
        let result = engine.redeem_code(&c, record.code.as_str()).await;
        assert!(matches!(result, Err(LinkError::AlreadyLinked)));

        // a different parent's valid code does not allow switching
        let other = engine.generate_code(&parent(), None).await.unwrap();
        let result = engine.redeem_code(&c, other.code.as_str()).await;
        assert!(matches!(result, Err(LinkError::AlreadyLinked)));
    }

    #[tokio::test]
    async fn error_precedence_is_deterministic() {
        let engine = engine();
        let p = parent();
        let c = child();
        let record = engine.generate_code(&p, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        // a malformed code on an already-linked child reports the
        // format error, not AlreadyLinked
        let result = engine.redeem_code(&c, "not a code!").await;
        assert!(matches!(result, Err(LinkError::InvalidFormat(_))));

        // a parent redeeming anything reports Forbidden first
        let result = engine.redeem_code(&p, "not a code!").await;
        assert!(matches!(result, Err(LinkError::Forbidden(Role::Child))));
    }

    #[tokio::test]
    async fn unknown_and_expired_codes_are_distinguished() {
        let engine = engine();
        let c = child();

        let result = engine.redeem_code(&c, "AB3DFQ7K").await;
        assert!(matches!(result, Err(LinkError::NotFound)));

        // a well-formed, existing, but lapsed code
        let p = parent();
        let record = engine
            .generate_code(&p, Some(Duration::days(-1)))
            .await
            .unwrap();
        let result = engine.redeem_code(&c, record.code.as_str()).await;
        assert!(matches!(result, Err(LinkError::Expired)));
    }

    #[tokio::test]
    async fn leave_is_idempotent_for_both_roles() {
        let engine = engine();
        let p = parent();
        let c = child();
        let record = engine.generate_code(&p, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        engine.leave(&c).await.unwrap();
        engine.leave(&c).await.unwrap();
        assert!(engine.relationships.parent_of(c.id).await.unwrap().is_none());

        // and the child can relink afterwards
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        engine.leave(&p).await.unwrap();
        engine.leave(&p).await.unwrap();
        assert!(engine.relationships.children_of(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_child_only_severs_own_edge() {
        let engine = engine();
        let p = parent();
        let stranger = parent();
        let c = child();
        let record = engine.generate_code(&p, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        // another parent cannot sever this family's edge
        let result = engine.remove_child(&stranger, c.id).await;
        assert!(matches!(result, Err(LinkError::Forbidden(_))));

        // neither can a child use the parent-only operation
        let result = engine.remove_child(&c, c.id).await;
        assert!(matches!(result, Err(LinkError::Forbidden(_))));

        engine.remove_child(&p, c.id).await.unwrap();
        assert!(engine.relationships.parent_of(c.id).await.unwrap().is_none());

        // removing an unlinked child is Forbidden, not a no-op
        let result = engine.remove_child(&p, c.id).await;
        assert!(matches!(result, Err(LinkError::Forbidden(_))));
    }

    #[tokio::test]
    async fn remove_child_never_severs_a_relinked_childs_new_edge() {
        let engine = engine();
        let old_parent = parent();
        let new_parent = parent();
        let c = child();

        let record = engine.generate_code(&old_parent, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        // the child moves families before old_parent's removal lands
        engine.leave(&c).await.unwrap();
        let record = engine.generate_code(&new_parent, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        let result = engine.remove_child(&old_parent, c.id).await;
        assert!(matches!(result, Err(LinkError::Forbidden(_))));

        // the new family's edge is untouched
        let edge = engine.relationships.parent_of(c.id).await.unwrap().unwrap();
        assert_eq!(edge.parent_id, new_parent.id);
    }

    #[tokio::test]
    async fn generate_does_not_disturb_relationships() {
        let engine = engine();
        let p = parent();
        let c = child();
        let record = engine.generate_code(&p, None).await.unwrap();
        engine.redeem_code(&c, record.code.as_str()).await.unwrap();

        engine.generate_code(&p, None).await.unwrap();

        let edges = engine.relationships.children_of(p.id).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].child_id, c.id);
    }
}
