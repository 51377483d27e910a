//! Tracing subscriber setup.
//!
//! The subscriber is installed before the configuration is read so that
//! problems found while loading it are reported. The configured level is
//! applied afterwards through a reload handle.

use tracing::{debug, warn, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use crate::config::Config;

/// Filter for the crate at `level`, everything else at `warn`
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("reel_client={},warn", level))
}

/// Handle to the installed filter
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    /// Set by `RUST_LOG` or `--verbose`; the config file does not override it
    pinned: bool,
}

impl LogControl {
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Switch to `logging.log_level` unless the level was pinned at start-up
    pub fn apply_config(&self, config: &Config) {
        if self.pinned {
            return;
        }
        match self.handle.reload(filter_for(&config.logging.log_level)) {
            Ok(()) => debug!("Log level set to {}", config.logging.log_level),
            Err(e) => warn!("Could not apply log level {}: {}", config.logging.log_level, e),
        }
    }
}

/// Filter used until the configuration is known
fn startup_filter(verbose: bool) -> (EnvFilter, bool) {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) if verbose => (filter_for("debug"), true),
        Err(_) => (filter_for("info"), false),
    }
}

/// Subscriber writing to `writer`, with a reloadable filter
pub fn subscriber<W>(
    filter: EnvFilter,
    pinned: bool,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, LogControl)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));

    (subscriber, LogControl { handle, pinned })
}

/// Install the global subscriber on stdout
pub fn init(verbose: bool) -> LogControl {
    let (filter, pinned) = startup_filter(verbose);
    let (subscriber, control) = subscriber(filter, pinned, std::io::stdout);
    subscriber.init();
    control
}
