//! Thread control shared by binning, split search and prediction.

use rayon::prelude::*;

/// Whether a component may fan out over rayon.
///
/// Components never build thread pools themselves; [`run_with_threads`]
/// installs one and hands them this flag. Every parallel path produces the
/// same result as its sequential twin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// `1` is sequential, any larger count is parallel, and `0` defers to
    /// the size of the current rayon pool.
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        match n_threads {
            1 => Self::Sequential,
            0 if rayon::current_num_threads() == 1 => Self::Sequential,
            _ => Self::Parallel,
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        self == Self::Parallel
    }

    /// Ordered map over per-feature work items.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, items: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        match self {
            Self::Parallel => items.into_par_iter().map(f).collect(),
            Self::Sequential => items.into_iter().map(f).collect(),
        }
    }

    #[inline]
    pub fn maybe_par_for_each<T, I, F>(self, items: I, f: F)
    where
        T: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) + Sync + Send,
    {
        match self {
            Self::Parallel => items.into_par_iter().for_each(f),
            Self::Sequential => items.into_iter().for_each(f),
        }
    }
}

/// Run `f` inside a pool of `n_threads` workers (`0` = one per core).
///
/// A sequential request runs on the calling thread. When a dedicated pool
/// cannot be built, `f` runs on rayon's global pool instead.
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    match Parallelism::from_threads(n_threads) {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel => match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
            Ok(pool) => pool.install(|| f(Parallelism::Parallel)),
            Err(_) => f(Parallelism::Parallel),
        },
    }
}
