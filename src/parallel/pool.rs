//! Worker count for batch simulation.
//!
//! [WorkerPool::install] runs a closure either on the global Rayon pool or on a dedicated
//! pool with a fixed thread count.

use rayon::ThreadPoolBuilder;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// 0 means the global pool (one thread per core).
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(e) => {
                warn!(
                    workers = self.workers,
                    error = %e,
                    "could not build thread pool, using global pool"
                );
                f()
            }
        }
    }
}
