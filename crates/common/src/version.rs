use serde::Serialize;

/// Build metadata baked in at compile time via [`build_info!`].
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nestnote {} ({}, built {})",
            self.version, self.build_profile, self.build_timestamp
        )
    }
}

/// Expand build metadata in the calling crate, so the env vars emitted
/// by that crate's build script are the ones that get baked in.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            build_profile: option_env!("BUILD_PROFILE").unwrap_or("unknown"),
            build_timestamp: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        }
    };
}
