//! Compatibility layer for rayon/sequential execution.
//!
//! With the `parallel` feature, [`map_indexed`] fans work out over rayon's
//! pool when the caller asks for it. Without the feature (e.g. WASM builds)
//! the same call runs sequentially, so call sites need no `cfg`.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Map `f(index, item)` over `items`, preserving order.
#[cfg(feature = "parallel")]
pub(crate) fn map_indexed<T, U, F>(items: &[T], parallel: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> U + Sync + Send,
{
    if parallel {
        items.par_iter().enumerate().map(|(i, t)| f(i, t)).collect()
    } else {
        items.iter().enumerate().map(|(i, t)| f(i, t)).collect()
    }
}

/// Sequential stand-in used when the `parallel` feature is off.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_indexed<T, U, F>(items: &[T], _parallel: bool, f: F) -> Vec<U>
where
    F: Fn(usize, &T) -> U,
{
    items.iter().enumerate().map(|(i, t)| f(i, t)).collect()
}
