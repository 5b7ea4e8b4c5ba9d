use axum::http::StatusCode;
use uuid::Uuid;

use common::prelude::{authorize, Decision, FamilyView, Identity, Operation};

/// Why a fetched resource is withheld from the caller.
#[derive(Debug, thiserror::Error)]
pub enum AccessDenied {
    /// The caller may read the resource but asked to change it.
    #[error("read-only access")]
    ReadOnly,
    /// Indistinguishable from the resource not existing.
    #[error("not found")]
    Hidden,
}

impl AccessDenied {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessDenied::ReadOnly => StatusCode::FORBIDDEN,
            AccessDenied::Hidden => StatusCode::NOT_FOUND,
        }
    }
}

/// Gate a fetched resource against the caller's relationship view.
///
/// A denied write on a resource the caller can read reports 403; every
/// other denial collapses into 404 so unrelated callers cannot probe
/// for existence.
pub fn gate(
    caller: &Identity,
    view: &FamilyView,
    owner: Uuid,
    op: Operation,
) -> Result<(), AccessDenied> {
    match authorize(caller, view, owner, op) {
        Decision::Allow(_) => Ok(()),
        Decision::Deny => {
            if op == Operation::Write
                && authorize(caller, view, owner, Operation::Read).is_allowed()
            {
                Err(AccessDenied::ReadOnly)
            } else {
                Err(AccessDenied::Hidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::Role;

    #[test]
    fn parent_write_on_child_reports_read_only() {
        let parent = Identity::new(Uuid::new_v4(), Role::Parent);
        let child_id = Uuid::new_v4();
        let view = FamilyView::for_parent([child_id]);

        assert!(gate(&parent, &view, child_id, Operation::Read).is_ok());
        assert!(matches!(
            gate(&parent, &view, child_id, Operation::Write),
            Err(AccessDenied::ReadOnly)
        ));
    }

    #[test]
    fn stranger_access_is_hidden() {
        let caller = Identity::new(Uuid::new_v4(), Role::Parent);
        let view = FamilyView::for_parent([]);

        assert!(matches!(
            gate(&caller, &view, Uuid::new_v4(), Operation::Read),
            Err(AccessDenied::Hidden)
        ));
        assert!(matches!(
            gate(&caller, &view, Uuid::new_v4(), Operation::Write),
            Err(AccessDenied::Hidden)
        ));
    }
}
