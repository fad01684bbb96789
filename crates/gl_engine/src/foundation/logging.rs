//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize the logger
///
/// `default_level` is an env_logger filter (`"info"`, `"gl_engine=debug"`);
/// `RUST_LOG` overrides it. Repeated calls are ignored.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
