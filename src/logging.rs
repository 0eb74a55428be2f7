//! `env_logger` setup for the demo driver; the library only uses `log` macros.

use std::sync::Once;

use log::LevelFilter;

static INIT: Once = Once::new();

/// Level used when `RUST_LOG` is unset
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the global logger. `RUST_LOG` overrides `verbose`; repeat calls are no-ops.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match std::env::var("RUST_LOG") {
            Ok(filter) => {
                builder.parse_filters(&filter);
            }
            Err(_) => {
                builder.filter_level(default_level(verbose));
            }
        }
        builder.format_timestamp_millis();
        if builder.try_init().is_err() {
            log::warn!("a logger was already installed");
        }
    });
}
