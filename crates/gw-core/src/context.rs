//! Explicit execution context for data-parallel steps.
//!
//! Replaces process-wide toggles: every operation that fans work out or draws
//! random numbers receives an `ExecContext`. Parallel helpers partition a
//! slice across a dedicated rayon pool and join before returning, so callers
//! always see results in input order.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::GwResult;

/// Seed used when none is supplied.
pub const DEFAULT_SEED: u64 = 1337;

/// Worker count plus RNG seed, threaded through every parallel or random step.
#[derive(Clone, Debug)]
pub struct ExecContext {
    workers: usize,
    seed: u64,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ExecContext {
    /// Build a context with `workers` threads. `workers <= 1` runs everything
    /// on the calling thread.
    pub fn new(workers: usize, seed: u64) -> GwResult<Self> {
        let pool = if workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("gw-worker-{i}"))
                .build()?;
            Some(Arc::new(pool))
        } else {
            None
        };
        Ok(Self {
            workers: workers.max(1),
            seed,
            pool,
        })
    }

    /// Single-threaded context with the given seed.
    pub fn sequential(seed: u64) -> Self {
        Self {
            workers: 1,
            seed,
            pool: None,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Fresh deterministic RNG for one operation.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Map `f` over `items`, in parallel when the context has a pool.
    pub fn par_map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            None => items.iter().map(f).collect(),
        }
    }

    /// Keep the items for which `keep` holds, preserving order.
    pub fn par_filter<T, F>(&self, items: Vec<T>, keep: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&T) -> bool + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().filter(|t| keep(t)).collect()),
            None => items.into_iter().filter(|t| keep(t)).collect(),
        }
    }

    /// Split items into `(matching, rest)`, preserving order within each half.
    pub fn par_partition<T, F>(&self, items: Vec<T>, pred: F) -> (Vec<T>, Vec<T>)
    where
        T: Send,
        F: Fn(&T) -> bool + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().partition(|t| pred(t))),
            None => items.into_iter().partition(|t| pred(t)),
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers, DEFAULT_SEED).unwrap_or_else(|_| Self::sequential(DEFAULT_SEED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn sequential_and_parallel_agree() {
        let items: Vec<u32> = (0..1000).collect();
        let seq = ExecContext::sequential(1);
        let par = ExecContext::new(4, 1).unwrap();

        assert_eq!(seq.par_map(&items, |x| x * 2), par.par_map(&items, |x| x * 2));
        assert_eq!(
            seq.par_filter(items.clone(), |x| x % 3 == 0),
            par.par_filter(items.clone(), |x| x % 3 == 0)
        );
        assert_eq!(
            seq.par_partition(items.clone(), |x| *x < 500),
            par.par_partition(items, |x| *x < 500)
        );
    }

    #[test]
    fn rng_is_reproducible() {
        let ctx = ExecContext::sequential(42);
        let a: f64 = ctx.rng().r#gen();
        let b: f64 = ctx.rng().r#gen();
        assert_eq!(a, b);
        assert!(!ExecContext::sequential(42).is_parallel());
    }
}
