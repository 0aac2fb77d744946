use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, unbounded};
use log::error;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::errors::{GmimError, Result};

///
/// A fixed-size worker pool with a submit/await-all contract.
///
/// Every task owns its inputs and reports exactly once into its own result
/// slot; the caller blocks until every slot is filled or the deadline passes.
///
pub struct TaskPool {
    pool: ThreadPool,
    threads: usize,
}

impl TaskPool {
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(GmimError::InvalidConfig(
                "Must select > 0 threads".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| GmimError::InvalidConfig(format!("Could not build thread pool: {e}")))?;

        Ok(TaskPool { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    ///
    /// Run every task on the pool and collect the results in submission order.
    ///
    /// A task that panics fills its own slot with `TaskPanicked`; its siblings
    /// are unaffected. With a timeout, exceeding it aborts the wait with
    /// `PhaseTimeout`; tasks still in flight are left to finish on their own
    /// and their results are discarded.
    ///
    pub fn run_all<T, F>(&self, tasks: Vec<F>, timeout: Option<Duration>) -> Result<Vec<Result<T>>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let n_tasks = tasks.len();
        let (sender, receiver) = unbounded::<(usize, Result<T>)>();

        for (slot, task) in tasks.into_iter().enumerate() {
            let sender = sender.clone();
            self.pool.spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
                    let msg = panic_message(&*payload);
                    error!("Worker task {} panicked: {}", slot, msg);
                    GmimError::TaskPanicked(msg)
                });
                // the collector may have given up already
                let _ = sender.send((slot, result));
            });
        }
        drop(sender);

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut slots: Vec<Option<Result<T>>> = (0..n_tasks).map(|_| None).collect();
        let mut received = 0;

        while received < n_tasks {
            let message = match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => match receiver.recv_deadline(deadline) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(GmimError::PhaseTimeout(timeout, n_tasks - received));
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(GmimError::TaskLost(n_tasks - received));
                    }
                },
                _ => receiver
                    .recv()
                    .map_err(|_| GmimError::TaskLost(n_tasks - received))?,
            };

            let (slot, result) = message;
            slots[slot] = Some(result);
            received += 1;
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(GmimError::TaskLost(0))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::thread::sleep;

    #[rstest]
    fn test_results_keep_submission_order() {
        let pool = TaskPool::new(4).unwrap();
        let tasks: Vec<_> = (0..16u64)
            .map(|i| {
                move || {
                    // later tasks finish first
                    sleep(Duration::from_millis(16 - i));
                    i * 10
                }
            })
            .collect();

        let results: Vec<u64> = pool
            .run_all(tasks, None)
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results, (0..16u64).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_failures_are_values() {
        let pool = TaskPool::new(2).unwrap();
        let tasks: Vec<Box<dyn FnOnce() -> std::result::Result<u32, String> + Send>> = vec![
            Box::new(|| Ok(1)),
            Box::new(|| Err("boom".to_string())),
            Box::new(|| Ok(3)),
        ];
        let results: Vec<_> = pool
            .run_all(tasks, None)
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results, vec![Ok(1), Err("boom".to_string()), Ok(3)]);
    }

    #[rstest]
    fn test_empty_phase() {
        let pool = TaskPool::new(1).unwrap();
        let tasks: Vec<fn() -> u8> = vec![];
        assert!(pool.run_all(tasks, None).unwrap().is_empty());
    }

    #[rstest]
    fn test_timeout_aborts_wait() {
        let pool = TaskPool::new(1).unwrap();
        let tasks = vec![|| sleep(Duration::from_millis(500))];
        let res = pool.run_all(tasks, Some(Duration::from_millis(20)));
        assert!(matches!(res, Err(GmimError::PhaseTimeout(_, 1))));
    }

    #[rstest]
    fn test_panicking_task_keeps_sibling_results() {
        let pool = TaskPool::new(2).unwrap();
        let tasks: Vec<Box<dyn FnOnce() -> u8 + Send>> = vec![
            Box::new(|| 1),
            Box::new(|| panic!("task failed")),
            Box::new(|| 3),
        ];
        let results = pool.run_all(tasks, None).unwrap();

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(1)));
        match &results[1] {
            Err(GmimError::TaskPanicked(msg)) => assert_eq!(msg, "task failed"),
            other => panic!("expected a panicked slot, got {other:?}"),
        }
        assert!(matches!(results[2], Ok(3)));
    }

    #[rstest]
    fn test_zero_threads() {
        assert!(TaskPool::new(0).is_err());
    }
}
