//! Role-derived authorization over the shared resource tree.
//!
//! Decisions are computed fresh for every request from a `FamilyView`
//! snapshot of the relationship directory; nothing here is cached,
//! because relationships can change between calls.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::account::{Identity, Role};

/// What the request wants to do with the target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Granted access level. A parent reading a child's data is always
/// `ReadOnly`, never `ReadWrite`, regardless of the requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Per-request authorization decision. Ephemeral; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(AccessMode),
    /// Denials carry not-found semantics so an unrelated caller cannot
    /// distinguish "absent" from "exists but hidden".
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Snapshot of the requester's side of the relationship directory,
/// loaded once per request.
#[derive(Debug, Clone, Default)]
pub struct FamilyView {
    /// Children linked to the requester (parents only).
    pub children: HashSet<Uuid>,
    /// The requester's parent (children only).
    pub parent: Option<Uuid>,
}

impl FamilyView {
    pub fn for_parent(children: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            children: children.into_iter().collect(),
            parent: None,
        }
    }

    pub fn for_child(parent: Option<Uuid>) -> Self {
        Self {
            children: HashSet::new(),
            parent,
        }
    }
}

/// Decide whether `requester` may perform `op` on a resource owned by
/// `target_owner`. Rules evaluate in order; the first match wins:
///
/// 1. self-access is always read-write
/// 2. a parent linked to the owner gets read-only, even for writes
/// 3. everything else (including child -> parent) is denied
pub fn authorize(
    requester: &Identity,
    view: &FamilyView,
    target_owner: Uuid,
    op: Operation,
) -> Decision {
    if requester.id == target_owner {
        return Decision::Allow(AccessMode::ReadWrite);
    }

    if requester.role == Role::Parent && view.children.contains(&target_owner) {
        return match op {
            Operation::Read => Decision::Allow(AccessMode::ReadOnly),
            // never escalate a parent to write access
            Operation::Write => Decision::Deny,
        };
    }

    Decision::Deny
}

/// The set of owner ids whose resources `requester` may read across in
/// list-style operations. Writes are always scoped to the requester
/// alone; use `authorize` per target for those.
pub fn scope_for(requester: &Identity, view: &FamilyView) -> Vec<Uuid> {
    let mut scope = vec![requester.id];
    if requester.role == Role::Parent {
        let mut children: Vec<Uuid> = view.children.iter().copied().collect();
        children.sort();
        scope.extend(children);
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Parent)
    }

    fn child() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Child)
    }

    #[test]
    fn self_access_is_read_write_for_any_role() {
        for id in [parent(), child()] {
            let view = FamilyView::default();
            assert_eq!(
                authorize(&id, &view, id.id, Operation::Write),
                Decision::Allow(AccessMode::ReadWrite)
            );
        }
    }

    #[test]
    fn linked_parent_reads_but_never_writes() {
        let p = parent();
        let c = child();
        let view = FamilyView::for_parent([c.id]);

        assert_eq!(
            authorize(&p, &view, c.id, Operation::Read),
            Decision::Allow(AccessMode::ReadOnly)
        );
        assert_eq!(authorize(&p, &view, c.id, Operation::Write), Decision::Deny);
    }

    #[test]
    fn unrelated_parent_is_denied() {
        let p = parent();
        let c = child();
        let view = FamilyView::for_parent([]);

        assert_eq!(authorize(&p, &view, c.id, Operation::Read), Decision::Deny);
    }

    #[test]
    fn child_never_sees_parent_data() {
        let p = parent();
        let c = child();
        let view = FamilyView::for_child(Some(p.id));

        assert_eq!(authorize(&c, &view, p.id, Operation::Read), Decision::Deny);
        assert_eq!(authorize(&c, &view, p.id, Operation::Write), Decision::Deny);
    }

    #[test]
    fn scope_covers_self_and_children_for_parents() {
        let p = parent();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let view = FamilyView::for_parent([c1, c2]);

        let scope = scope_for(&p, &view);
        assert_eq!(scope[0], p.id);
        assert_eq!(scope.len(), 3);
        assert!(scope.contains(&c1) && scope.contains(&c2));
    }

    #[test]
    fn scope_is_self_only_for_children() {
        let c = child();
        let view = FamilyView::for_child(Some(Uuid::new_v4()));
        assert_eq!(scope_for(&c, &view), vec![c.id]);
    }
}
