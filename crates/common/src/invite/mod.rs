mod code;
pub mod memory;
mod provider;

pub use code::{InviteCode, InviteCodeError, CODE_ALPHABET, CODE_LENGTH};
pub use provider::{InviteRecord, InviteStatus, InviteStore, InviteStoreError};
