//! Fan-out/join helpers shared by aggregation and action dispatch
//!
//! All helpers run the given futures concurrently, at most `limit` at a time,
//! and return only once every future has completed. Results keep the input
//! order even though the calls themselves complete in any order.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run every future and return all outputs in input order
pub async fn join_all_bounded<I, F>(futures: I, limit: usize) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    stream::iter(futures).buffered(limit.max(1)).collect().await
}

/// Run every future, keep the successes and hand each failure to `on_error`
///
/// Used where a failing item is recovered locally by omission.
pub async fn join_partial<I, F, T, E, H>(futures: I, limit: usize, mut on_error: H) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    H: FnMut(E),
{
    join_all_bounded(futures, limit)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(e) => {
                on_error(e);
                None
            }
        })
        .collect()
}

/// Run every future; succeed only if none failed, otherwise return every failure
///
/// A failing call never cancels its siblings.
pub async fn join_collect<I, F, T, E>(futures: I, limit: usize) -> Result<Vec<T>, Vec<E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let (values, errors): (Vec<_>, Vec<_>) = join_all_bounded(futures, limit)
        .await
        .into_iter()
        .partition(Result::is_ok);

    if errors.is_empty() {
        Ok(values.into_iter().filter_map(Result::ok).collect())
    } else {
        Err(errors.into_iter().filter_map(Result::err).collect())
    }
}
