//! # Thread Utilities

use core::str::FromStr;
use std::{env, num::NonZeroUsize, thread};

/// The search list of environment variables that Rayon uses to control parallelism.
///
/// These are honoured by both map stage backends, so that
/// ``RAYON_NUM_THREADS=1`` behaves the same either way.
pub const RAYON_VARS: &[&str] = &["RAYON_NUM_THREADS", "RAYON_RS_NUM_CPUS"];

/// Get the max parallelism available.
///
/// Scans `RAYON_VARS` first; then falls back to ``thread::available_parallelism()``.
pub fn est_max_parallelism() -> NonZeroUsize {
    for name in RAYON_VARS {
        if let Some(x) = env::var(name)
            .ok()
            .and_then(|s| usize::from_str(s.trim()).ok())
            .and_then(NonZeroUsize::new)
        {
            return x;
        }
    }

    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Resolve a worker count.
///
/// An explicit request wins; otherwise one worker per available
/// execution unit, see [`est_max_parallelism`].
pub fn resolve_workers(requested: Option<NonZeroUsize>) -> NonZeroUsize {
    requested.unwrap_or_else(est_max_parallelism)
}

/// Resolve the size of a thread pool running `workers` jobs.
///
/// ``min(workers, est_max_parallelism())``
pub fn resolve_pool_size(workers: NonZeroUsize) -> NonZeroUsize {
    core::cmp::min(workers, est_max_parallelism())
}
