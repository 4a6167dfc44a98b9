use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stats aggregates collector and processor activity over a reporting
/// window.
///
/// Counters are individually atomic; `report` reads them without a lock, so
/// the rendered snapshot is tolerably racy. The rendered text carries no
/// timestamps: equal text means nothing happened since the last render,
/// which is what the reporter's duplicate suppression keys on.
#[derive(Debug, Default)]
pub struct Stats {
    job_count_collect: AtomicU64,
    job_count_process: AtomicU64,
    collect_duration_ms: AtomicU64,
    process_duration_ms: AtomicU64,
    last_reset_ms: AtomicU64,
}

impl Stats {
    pub fn new() -> Stats {
        let stats = Stats::default();
        stats.last_reset_ms.store(now_ms(), Ordering::Relaxed);
        stats
    }

    /// Record one collector poll which yielded `job_count` jobs.
    pub fn update_collector_stats(&self, duration_ms: u64, job_count: usize) {
        self.job_count_collect
            .fetch_add(job_count as u64, Ordering::Relaxed);
        self.collect_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    /// Record one successfully processed job.
    pub fn update_processor_stats(&self, duration_ms: u64) {
        self.job_count_process.fetch_add(1, Ordering::Relaxed);
        self.process_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn job_count_collect(&self) -> u64 {
        self.job_count_collect.load(Ordering::Relaxed)
    }

    pub fn job_count_process(&self) -> u64 {
        self.job_count_process.load(Ordering::Relaxed)
    }

    /// Epoch milliseconds of the last reset (or of construction).
    pub fn last_reset_ms(&self) -> u64 {
        self.last_reset_ms.load(Ordering::Relaxed)
    }

    /// Render the current counters as a stable snapshot line.
    pub fn report(&self) -> String {
        let collected = self.job_count_collect();
        let collect_ms = self.collect_duration_ms.load(Ordering::Relaxed);
        let processed = self.job_count_process();
        let process_ms = self.process_duration_ms.load(Ordering::Relaxed);
        let average_ms = if processed == 0 {
            0
        } else {
            process_ms / processed
        };
        format!(
            "collected {collected} jobs in {collect_ms} ms, \
             processed {processed} jobs in {process_ms} ms ({average_ms} ms per job)"
        )
    }

    /// Zero every counter and stamp the reset time.
    pub fn reset(&self) {
        self.job_count_collect.store(0, Ordering::Relaxed);
        self.job_count_process.store(0, Ordering::Relaxed);
        self.collect_duration_ms.store(0, Ordering::Relaxed);
        self.process_duration_ms.store(0, Ordering::Relaxed);
        self.last_reset_ms.store(now_ms(), Ordering::Relaxed);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
