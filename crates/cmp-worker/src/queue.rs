use crate::job::Job;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// Popping from a closed and drained queue yields this error.
#[derive(Debug, thiserror::Error)]
#[error("job queue is closed")]
pub struct QueueClosed;

/// JobQueue is an unbounded multi-producer multi-consumer FIFO.
///
/// The queue exclusively owns every job between push and pop, so exactly one
/// processor ever observes a given job. `pop` suspends without busy-waiting
/// until a job arrives or the queue is closed; a closed queue still hands
/// out already-queued jobs before reporting [`QueueClosed`].
#[derive(Default)]
pub struct JobQueue {
    state: Mutex<State>,
    notify: Notify,
}

#[derive(Default)]
struct State {
    items: VecDeque<Box<dyn Job>>,
    closed: bool,
}

impl JobQueue {
    pub fn new() -> JobQueue {
        JobQueue::default()
    }

    /// Enqueue a job and wake one waiting consumer. Jobs pushed after close
    /// are dropped.
    pub fn push(&self, job: Box<dyn Job>) {
        {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return;
            }
            state.items.push_back(job);
        }
        self.notify.notify_one();
    }

    /// Await the next job in FIFO order.
    pub async fn pop(&self) -> Result<Box<dyn Job>, QueueClosed> {
        loop {
            // Register for a wakeup before inspecting the queue, so a push
            // racing this pop cannot be missed.
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap();
                if let Some(job) = state.items.pop_front() {
                    return Ok(job);
                }
                if state.closed {
                    return Err(QueueClosed);
                }
            }
            notified.await;
        }
    }

    /// Close the queue, waking every blocked consumer.
    pub fn close(&self) {
        self.state.lock().unwrap().closed = true;
        self.notify.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::JobQueue;
    use crate::job::Job;
    use crate::options::Options;
    use std::sync::Arc;
    use std::time::Duration;

    struct TestJob(String);

    #[async_trait::async_trait]
    impl Job for TestJob {
        fn describe(&self) -> String {
            self.0.clone()
        }
        async fn process(&self, _options: &Options) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn job(name: &str) -> Box<dyn Job> {
        Box::new(TestJob(name.to_string()))
    }

    #[tokio::test]
    async fn test_fifo_order_per_producer() {
        let queue = JobQueue::new();
        queue.push(job("a"));
        queue.push(job("b"));
        queue.push(job("c"));
        assert_eq!(queue.len(), 3);

        for expect in ["a", "b", "c"] {
            assert_eq!(queue.pop().await.unwrap().describe(), expect);
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_suspends_until_push() {
        let queue = Arc::new(JobQueue::new());

        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move { queue.pop().await.unwrap().describe() }
        });
        // Let the waiter block before pushing.
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(job("late"));

        let got = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, "late");
    }

    #[tokio::test]
    async fn test_close_drains_then_stops() {
        let queue = JobQueue::new();
        queue.push(job("a"));
        queue.push(job("b"));
        queue.close();

        assert_eq!(queue.pop().await.unwrap().describe(), "a");
        assert_eq!(queue.pop().await.unwrap().describe(), "b");
        assert!(queue.pop().await.is_err());

        // Pushes after close are dropped.
        queue.push(job("c"));
        assert!(queue.pop().await.is_err());
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_consumers() {
        let queue = Arc::new(JobQueue::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.pop().await.is_err() })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        for waiter in waiters {
            let stopped = tokio::time::timeout(Duration::from_secs(5), waiter)
                .await
                .unwrap()
                .unwrap();
            assert!(stopped);
        }
    }

    #[tokio::test]
    async fn test_each_job_is_observed_once() {
        let queue = Arc::new(JobQueue::new());
        for i in 0..100 {
            queue.push(job(&i.to_string()));
        }
        queue.close();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Ok(job) = queue.pop().await {
                        seen.push(job.describe());
                    }
                    seen
                })
            })
            .collect();

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_by_key(|name| name.parse::<usize>().unwrap());
        let expect: Vec<_> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(all, expect);
    }
}
