use crate::options::Options;
use crate::queue::JobQueue;
use crate::rest::{ApiClient, Platform};
use crate::stats::Stats;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Resources shared by every pipeline role for the process lifetime.
#[derive(Default)]
pub struct Resources {
    pub queue: JobQueue,
    pub stats: Stats,
}

impl Resources {
    pub fn new() -> Resources {
        Resources {
            queue: JobQueue::new(),
            stats: Stats::new(),
        }
    }
}

/// Run the worker against the real REST platform until SIGINT or SIGTERM.
pub async fn run(options: Options) -> anyhow::Result<()> {
    let platform = Arc::new(ApiClient::new(options.api_url.clone()));
    let shutdown = CancellationToken::new();

    let signals = register_signal_handlers()?;
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals.await;
            tracing::info!("caught shutdown signal; stopping");
            shutdown.cancel();
        }
    });

    run_with(platform, options, shutdown).await
}

/// Run the collector, processors and reporter until `shutdown` is
/// cancelled: the collector stops polling, processors drain the queue, and
/// the reporter performs one final flush.
pub async fn run_with(
    platform: Arc<dyn Platform>,
    options: Options,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let options = Arc::new(options);
    let resources = Arc::new(Resources::new());

    // Close the queue on cancellation so draining processors observe an end.
    tokio::spawn({
        let resources = resources.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            resources.queue.close();
        }
    });

    let mut tasks = tokio::task::JoinSet::new();
    tasks.spawn(collector(
        platform.clone(),
        resources.clone(),
        options.clone(),
        shutdown.clone(),
    ));
    for _ in 0..options.processor_count() {
        tasks.spawn(processor(resources.clone(), options.clone()));
    }
    tasks.spawn(reporter(
        platform.clone(),
        resources.clone(),
        options.clone(),
        shutdown.clone(),
    ));

    while let Some(joined) = tasks.join_next().await {
        joined?;
    }
    Ok(())
}

/// Poll the platform for jobs and feed the queue.
async fn collector(
    platform: Arc<dyn Platform>,
    resources: Arc<Resources>,
    options: Arc<Options>,
    shutdown: CancellationToken,
) {
    let interval = Duration::from_millis(options.polling_interval);
    while !shutdown.is_cancelled() {
        tracing::debug!("polling for new comparison jobs");
        let tic = Instant::now();
        let jobs = match platform.retrieve_jobs().await {
            Ok(jobs) => jobs,
            Err(err) => {
                tracing::warn!(?err, "failed to retrieve comparison jobs");
                if !sleep_or_cancel(&shutdown, interval).await {
                    break;
                }
                continue;
            }
        };

        // With no jobs there is nothing to do but wait.
        if jobs.is_empty() {
            if !sleep_or_cancel(&shutdown, interval).await {
                break;
            }
            continue;
        }

        tracing::info!(count = jobs.len(), "received comparison jobs");
        resources
            .stats
            .update_collector_stats(tic.elapsed().as_millis() as u64, jobs.len());
        for job in jobs {
            resources.queue.push(job);
        }
    }
}

/// Pop and process jobs until the queue reports closed. A failed job is
/// logged and dropped, never requeued.
async fn processor(resources: Arc<Resources>, options: Arc<Options>) {
    while let Ok(job) = resources.queue.pop().await {
        let desc = job.describe();
        tracing::debug!(job = %desc, "processing");
        let tic = Instant::now();

        if let Err(err) = job.process(&options).await {
            tracing::error!(job = %desc, ?err, "failed to process job");
            continue;
        }

        let elapsed_ms = tic.elapsed().as_millis() as u64;
        tracing::info!(job = %desc, elapsed_ms, "processed");
        resources.stats.update_processor_stats(elapsed_ms);
    }
}

/// Periodically render the stats snapshot, suppressing duplicates of the
/// previously emitted text, and publish-and-reset once both roles have
/// made progress. Performs a final flush on shutdown.
async fn reporter(
    platform: Arc<dyn Platform>,
    resources: Arc<Resources>,
    options: Arc<Options>,
    shutdown: CancellationToken,
) {
    let interval = Duration::from_millis(options.status_report_interval);
    let mut previous = String::new();
    loop {
        let stop = !sleep_or_cancel(&shutdown, interval).await;
        flush(platform.as_ref(), &resources, &mut previous).await;
        if stop {
            break;
        }
    }
}

async fn flush(platform: &dyn Platform, resources: &Resources, previous: &mut String) {
    let report = resources.stats.report();
    if report == *previous {
        return;
    }
    tracing::info!("{report}");
    *previous = report.clone();

    // Publishing an all-idle window would be noise; wait until both the
    // collector and a processor have recorded progress.
    if resources.stats.job_count_collect() == 0 || resources.stats.job_count_process() == 0 {
        return;
    }
    if let Err(err) = platform.post_stats(&report).await {
        tracing::warn!(?err, "failed to report statistics");
    }
    resources.stats.reset();
}

/// Sleep for `interval`, returning false if cancelled first.
async fn sleep_or_cancel(shutdown: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}

fn register_signal_handlers() -> anyhow::Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => (),
            _ = sigint.recv() => (),
        }
    })
}
