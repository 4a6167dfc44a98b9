//! Logging setup for the worker binary.

use tracing_subscriber::EnvFilter;

/// Log configuration. The worker writes all diagnostics to stderr, keeping
/// stdout free for whatever the process is piped into.
#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Tracing filter directives, e.g. "debug" or "cmp_worker=trace".
    ///
    /// The default is "info": the reporter publishes its statistics line at
    /// INFO, and a worker that is silent in normal operation is
    /// indistinguishable from a stuck one. RUST_LOG, when set, overrides
    /// this flag.
    #[arg(long = "log-level", default_value = "info")]
    pub level: String,

    /// Emit one JSON object per log line. This is also the default whenever
    /// stderr is not an interactive terminal.
    #[arg(long = "log-json")]
    pub json: bool,
}

impl LogArgs {
    fn json_output(&self) -> bool {
        self.json || !atty::is(atty::Stream::Stderr)
    }
}

/// Initializes the global tracing subscriber. Panics if called twice.
pub fn init_logging(args: &LogArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if args.json_output() {
        builder.json().flatten_event(true).init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}
