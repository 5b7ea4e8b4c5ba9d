mod linking;
pub mod memory;
mod provider;

pub use linking::{LinkError, LinkingEngine};
pub use provider::{Relationship, RelationshipStore, RelationshipStoreError};
