//! Exports configuration data from the build system

pub const PKG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR"),
);
pub const PKG_RELEASE: &str = env!("CARGO_PKG_VERSION_PATCH");
pub const PKG_REPOID: &str = env!("REPOID");

#[macro_export]
macro_rules! REPOGC_STATE_DIR_M {
    () => {
        "/var/lib/repogc"
    };
}

#[macro_export]
macro_rules! REPOGC_CACHE_DIR_M {
    () => {
        "/var/cache/repogc"
    };
}

/// namespaced directory for persistent GC state (the `.sndx` cache lives under here by default)
pub const REPOGC_STATE_DIR: &str = REPOGC_STATE_DIR_M!();

/// namespaced directory for the committed-content index cache
pub const REPOGC_CACHE_DIR: &str = REPOGC_CACHE_DIR_M!();

/// Prepend the cache directory to a file name.
///
/// #### Example:
/// ```
/// use repogc_buildcfg::cachedir;
/// let p = cachedir!("/index");
/// ```
#[macro_export]
macro_rules! cachedir {
    ($subdir:expr) => {
        concat!($crate::REPOGC_CACHE_DIR_M!(), $subdir)
    };
}
