// =============================================================================
// Fit Executor
// =============================================================================
//
// The concurrency strategy for a search phase, chosen explicitly by the
// caller and injected into the orchestrator - never inferred from global
// state. Two strategies:
//
//   Sequential         run tasks in order on the calling thread
//   WorkerPool { n }   bounded rayon pool, n worker threads
//
// `run` is a single fan-out/fan-in barrier: it returns only when every
// task has produced its value, in task-index order. Tasks must be pure
// functions of their index over shared read-only state; nothing here
// cancels, times out, or retries.
//
// The rayon pool is built when `run` is entered and dropped when it
// returns, so pool lifetime is scoped to one phase even on panic
// unwinding.
//
// =============================================================================

use log::warn;
use rayon::prelude::*;

/// Execution strategy for a phase's candidate fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    #[default]
    Sequential,
    WorkerPool {
        workers: usize,
    },
}

impl Executor {
    /// Map a core count from the configuration surface onto a strategy:
    /// 0 or 1 cores means sequential.
    pub fn from_cores(cores: usize) -> Self {
        if cores <= 1 {
            Executor::Sequential
        } else {
            Executor::WorkerPool { workers: cores }
        }
    }

    /// Run `n_tasks` independent tasks and collect their results in task
    /// order. Barrier semantics: all tasks complete before this returns.
    pub fn run<T, F>(&self, n_tasks: usize, task: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Executor::Sequential => (0..n_tasks).map(task).collect(),
            Executor::WorkerPool { workers } => {
                match rayon::ThreadPoolBuilder::new().num_threads(*workers).build() {
                    Ok(pool) => pool.install(|| (0..n_tasks).into_par_iter().map(task).collect()),
                    Err(e) => {
                        warn!("could not build worker pool ({e}); running sequentially");
                        (0..n_tasks).map(task).collect()
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
