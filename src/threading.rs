//! Thread partitioning and rayon-based parallel execution over tile ranges.
//!
//! The tile index space of a plan is split into contiguous ranges, one per
//! worker. Workers run as rayon tasks on the current pool or on an injected
//! [`WorkerPool`] and are joined before the call returns. Ranges never share
//! destination elements, so no synchronization is needed beyond the join.

use std::ops::Range;

#[cfg(feature = "parallel")]
use crate::Result;

/// A raw pointer wrapper that is `Send` + `Sync`.
///
/// # Safety
/// The caller must guarantee that the pointed-to data is valid for the
/// lifetime of any parallel operation and that different threads write to
/// disjoint regions.
pub(crate) struct SendPtr<T>(pub(crate) *mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn from_const(ptr: *const T) -> Self {
        Self(ptr as *mut T)
    }

    pub(crate) fn as_ptr(self) -> *mut T {
        self.0
    }

    pub(crate) fn as_const(self) -> *const T {
        self.0 as *const T
    }
}

/// Minimum number of elements to justify multi-threaded execution.
pub const MINTHREADLENGTH: usize = 1 << 15;

/// Split `0..total` into at most `parts` contiguous ranges.
///
/// Range lengths differ by at most one, the first `total % parts` ranges get
/// the extra element, and empty ranges are dropped.
///
/// ```
/// use strided_transpose::partition;
///
/// assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
/// assert_eq!(partition(2, 4), vec![0..1, 1..2]);
/// ```
pub fn partition(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let base = total / parts;
    let rem = total % parts;
    let mut ranges = Vec::with_capacity(parts.min(total));
    let mut start = 0;
    for p in 0..parts {
        let len = base + usize::from(p < rem);
        if len == 0 {
            break;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// A dedicated rayon pool that plan executions can be pinned to.
///
/// Without a pool, parallel executions run on rayon's global pool.
#[cfg(feature = "parallel")]
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl WorkerPool {
    /// Build a pool with `num_threads` workers (0 lets rayon choose).
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("transpose-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Run `f` once per range and join.
///
/// A single range runs inline on the caller. Otherwise the ranges are halved
/// recursively with `rayon::join`, on `pool` when one is given.
#[cfg(feature = "parallel")]
pub(crate) fn run_ranges<F>(ranges: &[Range<usize>], pool: Option<&WorkerPool>, f: &F)
where
    F: Fn(Range<usize>) + Sync,
{
    match ranges {
        [] => {}
        [range] => f(range.clone()),
        _ => match pool {
            Some(pool) => pool.pool.install(|| join_ranges(ranges, f)),
            None => join_ranges(ranges, f),
        },
    }
}

#[cfg(feature = "parallel")]
fn join_ranges<F>(ranges: &[Range<usize>], f: &F)
where
    F: Fn(Range<usize>) + Sync,
{
    match ranges {
        [] => {}
        [range] => f(range.clone()),
        _ => {
            let (left, right) = ranges.split_at(ranges.len() / 2);
            rayon::join(|| join_ranges(left, f), || join_ranges(right, f));
        }
    }
}

/// Serial fallback: ranges run in order on the caller.
#[cfg(not(feature = "parallel"))]
pub(crate) fn run_ranges<F>(ranges: &[Range<usize>], f: &F)
where
    F: Fn(Range<usize>) + Sync,
{
    for range in ranges {
        f(range.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even() {
        assert_eq!(partition(12, 4), vec![0..3, 3..6, 6..9, 9..12]);
    }

    #[test]
    fn test_partition_remainder_goes_first() {
        let ranges = partition(11, 4);
        let lens: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![3, 3, 3, 2]);
        assert_eq!(ranges.last().map(|r| r.end), Some(11));
    }

    #[test]
    fn test_partition_drops_empty_ranges() {
        assert_eq!(partition(3, 8), vec![0..1, 1..2, 2..3]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn test_partition_zero_parts_is_serial() {
        assert_eq!(partition(5, 0), vec![0..5]);
        assert_eq!(partition(5, 1), vec![0..5]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_run_ranges_visits_every_index_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits: Vec<AtomicUsize> = (0..100).map(|_| AtomicUsize::new(0)).collect();
        let ranges = partition(100, 7);
        run_ranges(&ranges, None, &|r: Range<usize>| {
            for i in r {
                hits[i].fetch_add(1, Ordering::Relaxed);
            }
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_worker_pool() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.num_threads(), 3);
        let sum = AtomicUsize::new(0);
        run_ranges(&partition(10, 3), Some(&pool), &|r: Range<usize>| {
            sum.fetch_add(r.sum::<usize>(), Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 45);
    }
}
