//! Build metadata reported by the logger and the health route.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, if `TOILETS_REVISION` was set at build time.
pub const REVISION: Option<&str> = option_env!("TOILETS_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
