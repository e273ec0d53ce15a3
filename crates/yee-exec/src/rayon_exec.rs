//! Multi-threaded host execution on a rayon pool.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use yee_core::error::BackendErrorKind;
use yee_core::{BackendError, Scalar};
use yee_grid::{CellRange, Extent, Index, MultiArray};

use crate::policy::ExecPolicy;

/// Dispatches the `x` rows of a range concurrently.
///
/// Uses rayon's global pool unless built with
/// [`with_threads`](Self::with_threads). Cells within a row run in order;
/// rows run in no particular order, and the grouping of partial sums in
/// [`reduce_sum`](ExecPolicy::reduce_sum) may vary between calls.
#[derive(Clone, Debug, Default)]
pub struct ExecRayon {
    pool: Option<Arc<ThreadPool>>,
}

impl ExecRayon {
    /// A policy on rayon's global pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// A policy on a dedicated pool of `threads` workers.
    ///
    /// # Errors
    ///
    /// [`BackendErrorKind::ThreadPool`] if the pool cannot be built.
    #[track_caller]
    pub fn with_threads(threads: usize) -> Result<Self, BackendError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("yee-exec-{i}"))
            .build()
            .map_err(|e| BackendError::new(BackendErrorKind::ThreadPool(e.to_string())))?;
        tracing::debug!(threads, "built dedicated rayon pool");
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Worker count of the pool in use.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn run<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl ExecPolicy for ExecRayon {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn for_each_cell<F>(&self, extent: Extent, range: CellRange, f: F)
    where
        F: Fn(Index, usize) + Send + Sync,
    {
        let (x0, x1) = (range.begin.get(0), range.end.get(0));
        self.run(|| {
            (0..range.row_count()).into_par_iter().for_each(|k| {
                let (y, z) = range.row(k);
                for x in x0..x1 {
                    let idx = Index::new(x, y, z);
                    f(idx, extent.linear(idx));
                }
            });
        });
    }

    fn update_cells<F>(&self, out: &mut MultiArray, range: CellRange, f: F)
    where
        F: Fn(Index, usize, Scalar) -> Scalar + Send + Sync,
    {
        let extent = out.extent();
        let row_len = extent.get(0) as usize;
        let e1 = extent.get(1);
        let (x0, x1) = (range.begin.get(0), range.end.get(0));
        if range.is_empty() {
            return;
        }
        self.run(|| {
            out.as_mut_slice()
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(k, row)| {
                    let y = k as u32 % e1;
                    let z = k as u32 / e1;
                    if y < range.begin.get(1)
                        || y >= range.end.get(1)
                        || z < range.begin.get(2)
                        || z >= range.end.get(2)
                    {
                        return;
                    }
                    let base = k * row_len;
                    for x in x0..x1 {
                        let cell = &mut row[x as usize];
                        *cell = f(Index::new(x, y, z), base + x as usize, *cell);
                    }
                });
        });
    }

    fn reduce_sum<F>(&self, extent: Extent, range: CellRange, f: F) -> Scalar
    where
        F: Fn(Index, usize) -> Scalar + Send + Sync,
    {
        let (x0, x1) = (range.begin.get(0), range.end.get(0));
        self.run(|| {
            (0..range.row_count())
                .into_par_iter()
                .map(|k| {
                    let (y, z) = range.row(k);
                    (x0..x1)
                        .map(|x| {
                            let idx = Index::new(x, y, z);
                            f(idx, extent.linear(idx))
                        })
                        .sum::<Scalar>()
                })
                .sum()
        })
    }
}
