//! Logging setup for duplicate-cleaner.
//!
//! The library only talks to the `log` facade; the binary installs an
//! `env_logger` backend once, at startup, through [`init_logging`].
//!
//! Level selection, highest priority first:
//!
//! 1. `RUST_LOG`, if set
//! 2. `--quiet` → errors only
//! 3. `-v` → debug, `-vv` → trace
//! 4. info
//!
//! Debug builds prefix each line with a timestamp (and the module path once
//! `-v` is given). Release builds print `LEVEL message`.
//!
//! ```rust,no_run
//! use duplicate_cleaner::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible at -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Install the global logger.
///
/// Calling it a second time is harmless: the first logger stays in place
/// and the failure is ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    if from_env {
        log::debug!("Logging configured from RUST_LOG");
    } else {
        log::debug!("Logging initialized at level: {}", log::max_level());
    }
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let style = buf.default_level_style(level);
            if verbose >= 1 {
                writeln!(
                    buf,
                    "{timestamp} {style}{level:<5}{style:#} [{}] {}",
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(buf, "{timestamp} {style}{level:<5}{style:#} {}", record.args())
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
        });
    }
}
