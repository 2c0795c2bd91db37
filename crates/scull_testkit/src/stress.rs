//! Stress tests for scull stores.
//!
//! These runs exercise the per-store lock under concurrent access and
//! check that every byte read back is the byte that was written.

use crate::fixtures::{pattern, read_until_stop, write_fully};
use scull_storage::{ReadOutcome, Store, StoreConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations, including data mismatches.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Write/read-back rounds per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Bytes written per round.
    pub chunk_size: usize,
    /// Store configuration for every store involved.
    pub store: StoreConfig,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
            chunk_size: 100,
            store: StoreConfig::new().quantum_size(64).qset_size(8),
        }
    }
}

/// Gives each thread its own store and checks that none observes another's
/// data.
///
/// Every thread writes a thread-tagged chunk at the same offsets and
/// reads it straight back.
pub fn stress_isolated_stores(config: &StressConfig) -> StressTestResult {
    let stores: Vec<Arc<Store>> = (0..config.threads)
        .map(|_| Store::new(config.store.clone()).map(Arc::new))
        .collect::<Result<_, _>>()
        .expect("stress store config is valid");

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = stores
        .iter()
        .enumerate()
        .map(|(t, store)| {
            let store = Arc::clone(store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            let chunk: Vec<u8> = pattern(config.chunk_size)
                .into_iter()
                .map(|b| b ^ (t as u8).wrapping_mul(37))
                .collect();

            thread::spawn(move || {
                for i in 0..operations {
                    let offset = (i * chunk.len()) as u64;
                    let ok = write_fully(&store, offset, &chunk).is_ok()
                        && matches!(
                            read_until_stop(&store, offset, chunk.len()),
                            Ok((ref out, _)) if *out == chunk
                        );
                    let counter = if ok { &successful } else { &failed };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Runs every thread against one shared store, each on its own disjoint
/// byte range, then verifies the whole store.
///
/// The final verification counts as one extra operation.
pub fn stress_shared_store(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let span = config.operations * config.chunk_size;
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            let chunk_size = config.chunk_size;

            thread::spawn(move || {
                let chunk = vec![t as u8 + 1; chunk_size];
                for i in 0..operations {
                    let offset = (t * span + i * chunk_size) as u64;
                    let counter = if write_fully(&store, offset, &chunk).is_ok() {
                        &successful
                    } else {
                        &failed
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let total = span * config.threads;
    let verified = match read_until_stop(&store, 0, total) {
        Ok((out, ReadOutcome::Transferred(_))) if out.len() == total => out
            .chunks(span.max(1))
            .enumerate()
            .all(|(t, range)| range.iter().all(|&b| b == t as u8 + 1)),
        _ => false,
    };
    if verified {
        successful.fetch_add(1, Ordering::Relaxed);
    } else {
        failed.fetch_add(1, Ordering::Relaxed);
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> StressConfig {
        StressConfig {
            operations: 20,
            threads: 3,
            chunk_size: 50,
            ..Default::default()
        }
    }

    #[test]
    fn stress_isolated_stores_all_succeed() {
        let result = stress_isolated_stores(&quick());
        assert_eq!(result.total_ops, 60);
        assert_eq!(result.failed_ops, 0);
    }

    #[test]
    fn stress_shared_store_verifies() {
        let config = quick();
        let store = Arc::new(Store::new(config.store.clone()).unwrap());
        let result = stress_shared_store(Arc::clone(&store), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 61);
        assert_eq!(store.size(), 3 * 20 * 50);
    }

    #[test]
    fn stress_result_rates() {
        let result = StressTestResult::new(90, 10, Duration::from_secs(2));
        assert_eq!(result.total_ops, 100);
        assert!((result.ops_per_second - 50.0).abs() < f64::EPSILON);
    }
}
