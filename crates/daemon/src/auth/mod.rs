mod extract;
mod jwt;
pub mod password;

pub use extract::{AuthRejection, Requester};
pub use jwt::{Claims, TokenError, TokenIssuer};
