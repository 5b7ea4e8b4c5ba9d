pub mod health;
pub mod me;
pub mod serve;
pub mod signin;
pub mod signup;
pub mod version;

pub use health::Health;
pub use me::Me;
pub use serve::Serve;
pub use signin::Signin;
pub use signup::Signup;
pub use version::Version;
