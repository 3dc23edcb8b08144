//! Test logging initialization

use std::sync::Once;

use simplelog::{Config, LevelFilter, TestLogger};

static INIT: Once = Once::new();

/// Installs a test logger once per test binary.
///
/// `RUST_LOG` picks the level; defaults to `info`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let level = std::env::var("RUST_LOG")
            .map(|level| persona_mint::logging::parse_level_filter(&level))
            .unwrap_or(LevelFilter::Info);
        let _ = TestLogger::init(level, Config::default());
    });
}
