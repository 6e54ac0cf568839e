//! Timestamped console logging
//!
//! Progress lines print as `[<timestamp>]: <message>`, errors as
//! `[<timestamp>] ==== ERROR: ====> <message>`.

use log::{Level, LevelFilter};
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Install the stdout logger. Level defaults to info, `RUST_LOG` overrides it.
///
/// Calling this more than once is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
            match record.level() {
                Level::Error => writeln!(buf, "[{}] ==== ERROR: ====> {}", now, record.args()),
                Level::Warn => writeln!(buf, "[{}] ==== WARNING: ====> {}", now, record.args()),
                _ => writeln!(buf, "[{}]: {}", now, record.args()),
            }
        })
        .try_init();
}
