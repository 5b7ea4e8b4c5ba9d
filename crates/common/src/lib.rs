/**
 * Account identity and role types shared by the
 *  linking engine and the authorization filter.
 */
pub mod account;
/**
 * The role-derived authorization filter. Pure
 *  decision logic over a per-request snapshot of
 *  the relationship directory.
 */
pub mod authz;
/**
 * Parent <-> child relationship edges: the storage
 *  provider contract, an in-memory provider, and
 *  the linking engine that owns all mutations.
 */
pub mod family;
/**
 * Invitation codes: value type, generation over an
 *  unambiguous alphabet, and the code store
 *  provider contract.
 */
pub mod invite;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::account::{compose_profile, Identity, LinkedAccount, Profile, Role};
    pub use crate::authz::{authorize, scope_for, AccessMode, Decision, FamilyView, Operation};
    pub use crate::family::{LinkError, LinkingEngine, Relationship, RelationshipStore};
    pub use crate::invite::{InviteCode, InviteRecord, InviteStatus, InviteStore};
    pub use crate::version::BuildInfo;
}
