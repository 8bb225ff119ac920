//! Tracing subscriber setup for binaries and tests embedding the core

use tracing::Level;

/// Install a fmt subscriber at `level`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
