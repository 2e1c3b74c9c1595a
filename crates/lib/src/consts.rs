pub const APP_NAME: &str = "mumps";

/// Upstream MUMPS release this recipe builds.
pub const MUMPS_VERSION: &str = "4.10.0";

/// Environment variable overriding the download cache directory.
pub const CACHE_DIR_ENV: &str = "MUMPS_CACHE_DIR";
