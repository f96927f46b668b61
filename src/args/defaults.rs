pub(crate) const DEFAULT_USER_AGENT: &str = concat!("zombie/", env!("CARGO_PKG_VERSION"));

/// Config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["zombie.toml", "zombie.json"];

/// Bind address used when `[api] enabled = true` omits `addr`.
pub(crate) const DEFAULT_API_ADDR: &str = "0.0.0.0:9090";
