//! Logger setup shared by both binaries.
//!
//! `RUST_LOG` wins when set; otherwise everything at `info` and above is shown.
//! Per-poll sensor readings and per-symbol annotations are logged at `trace`.

use log::LevelFilter;

pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}
