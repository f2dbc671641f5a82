//! Worker pool for the compute phase
//!
//! Each run gets its own rayon pool rather than the global one, so the
//! thread count follows the run's configuration.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

/// Worker count for a requested thread setting
///
/// `None` or `Some(0)` means "use what the machine offers", honouring
/// `RAYON_NUM_THREADS` when it is set.
pub(crate) fn desired_threads(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => std::env::var("RAYON_NUM_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            }),
    }
}

/// Build a private pool for one aggregation run
///
/// Returns `None` when a single worker is wanted or when no pool can be
/// created at all; callers then run sequentially.
pub(crate) fn build_pool(threads: usize) -> Option<ThreadPool> {
    if threads <= 1 {
        return None;
    }

    let built = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("neighbourer-{}", i))
        .build();

    match built {
        Ok(pool) => {
            debug!("Aggregating with {} worker threads", threads);
            Some(pool)
        }
        Err(err) => {
            warn!(
                "Could not start {} worker threads ({}); falling back to sequential aggregation",
                threads, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_thread_count_wins() {
        assert_eq!(desired_threads(Some(3)), 3);
        assert!(desired_threads(None) >= 1);
        assert!(desired_threads(Some(0)) >= 1);
    }

    #[test]
    fn test_single_thread_has_no_pool() {
        assert!(build_pool(1).is_none());
        assert!(build_pool(0).is_none());
    }

    #[test]
    fn test_pool_has_requested_size() {
        let pool = build_pool(2).expect("pool");
        assert_eq!(pool.current_num_threads(), 2);

        let name = pool.install(|| std::thread::current().name().map(str::to_string));
        assert!(name.unwrap().starts_with("neighbourer-"));
    }
}
