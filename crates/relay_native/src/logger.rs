//! Logger setup

use relay_dispatch::LOG_ENV;

/// Install `env_logger` with `filter`, unless `RELAY_LOG` says otherwise.
/// Returns false if a logger was already installed.
pub fn init(filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
