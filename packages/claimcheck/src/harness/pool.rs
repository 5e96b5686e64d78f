//! Fixed-width worker pool over a shared queue.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

/// `workers` tasks pull items from one queue; each finishes an item before
/// taking the next. Outputs arrive on a channel in completion order.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Widths below 1 behave as 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start processing `items`. The receiver closes once every worker is done.
    pub fn run<I, O, F, Fut>(&self, items: Vec<I>, handler: F) -> mpsc::UnboundedReceiver<O>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let width = self.workers.min(items.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let handler = Arc::new(handler);

        for worker in 0..width {
            let queue = queue.clone();
            let handler = handler.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let mut processed = 0usize;
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some(item) = next else { break };

                    let output = handler(item).await;
                    processed += 1;
                    if tx.send(output).is_err() {
                        break;
                    }
                }
                debug!(worker, processed, "Worker finished");
            });
        }

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_processes_every_item() {
        let mut rx = WorkerPool::new(3).run((0..20).collect(), |n: u32| async move { n * 2 });

        let mut outputs = Vec::new();
        while let Some(out) = rx.recv().await {
            outputs.push(out);
        }
        outputs.sort_unstable();
        assert_eq!(outputs, (0..20).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_width() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (a, p) = (active.clone(), peak.clone());
        let mut rx = WorkerPool::new(4).run((0..12).collect::<Vec<u64>>(), move |n| {
            let (active, peak) = (a.clone(), p.clone());
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10 + n)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        });

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 12);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_input_closes_immediately() {
        let mut rx = WorkerPool::new(5).run(Vec::<u8>::new(), |n| async move { n });
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_zero_width_is_one() {
        assert_eq!(WorkerPool::new(0).workers(), 1);
    }
}
