//! Logging setup
//!
//! Library code logs through the `log` macros directly; binaries call
//! [`init_with_default`] once at startup.

/// Initialize logging with a default filter used when `RUST_LOG` is unset
pub fn init_with_default(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}
