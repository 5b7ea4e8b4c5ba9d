pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Health, Me, Serve, Signin, Signup, Version};
