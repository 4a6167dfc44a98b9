use url::Url;

/// Command-line configuration of the comparison worker.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "cmp-worker", about = "Comparison worker of the regression platform")]
pub struct Options {
    /// Base URL of the job-source and stats-sink REST service.
    #[arg(long, env = "CMP_API_URL")]
    pub api_url: Url,

    /// Collector sleep between empty polls, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    pub polling_interval: u64,

    /// Reporter tick period, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub status_report_interval: u64,

    /// Number of processor tasks. Defaults to the number of available CPUs.
    #[arg(long)]
    pub processors: Option<usize>,

    #[command(flatten)]
    pub log: crate::logging::LogArgs,
}

impl Options {
    pub fn processor_count(&self) -> usize {
        self.processors.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
