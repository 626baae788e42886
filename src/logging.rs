//! Logger setup and runtime verbosity
//!
//! `env_logger` is installed once with every level enabled; what actually gets
//! printed is decided by `log::max_level()`, which the logging features move
//! while the run is in progress. The starting level is `warn`, or the level
//! named by `DRY_LOG`.

use log::LevelFilter;
use std::env;
use std::io::Write;

/// Environment variable overriding the starting level
pub const LOG_ENV: &str = "DRY_LOG";

/// Level used when nothing else is requested
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Install the logger and apply the starting level.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .format(|buf, record| {
            writeln!(
                buf,
                "[dry] {} {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    set_level(starting_level(env::var(LOG_ENV).ok().as_deref()));
}

/// Level named by `value`, the default when absent or not a level name
pub fn starting_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Level selected by one of the verbosity shortcut flags
pub fn level_for_flag(flag: &str) -> Option<LevelFilter> {
    match flag {
        "-s" | "--silent" => Some(LevelFilter::Error),
        "-q" | "--quiet" => Some(LevelFilter::Warn),
        "-d" => Some(LevelFilter::Info),
        "--verbose" | "-dd" => Some(LevelFilter::Debug),
        "-ddd" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Level matching an npm `--loglevel` value
pub fn level_for_name(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "silent" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "notice" | "http" | "info" => Some(LevelFilter::Info),
        "verbose" | "debug" => Some(LevelFilter::Debug),
        "silly" | "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
