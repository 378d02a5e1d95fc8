use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

static POOL: Lazy<Option<ThreadPool>> = Lazy::new(|| {
    ThreadPoolBuilder::new()
        .num_threads(worker_count())
        .thread_name(|index| format!("dts-emit-{}", index))
        .build()
        .ok()
});

pub fn worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Map `items` on the emit pool, keeping input order. Runs inline when the
/// pool could not be started.
pub fn run_parallel<T, R, F>(items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    match POOL.as_ref() {
        Some(pool) if items.len() > 1 => pool.install(|| items.into_par_iter().map(&f).collect()),
        _ => items.into_iter().map(f).collect(),
    }
}
