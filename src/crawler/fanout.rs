//! Bounded best-effort fan-out
//!
//! Runs one future per work item with at most `limit` in flight, all polled on
//! the calling task. Nothing is spawned, so task bodies may borrow from the
//! caller and results need no synchronization. A failed item never cancels its
//! siblings: every outcome is kept and partitioned once all items finish.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Partitioned outcomes of a fan-out, in completion order
#[derive(Debug)]
pub struct FanOut<T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<E>,
}

impl<T, E> Default for FanOut<T, E> {
    fn default() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T, E> FanOut<T, E> {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

impl<T, E> FromIterator<Result<T, E>> for FanOut<T, E> {
    fn from_iter<I: IntoIterator<Item = Result<T, E>>>(iter: I) -> Self {
        let mut fan_out = Self::default();
        for outcome in iter {
            match outcome {
                Ok(value) => fan_out.successes.push(value),
                Err(error) => fan_out.failures.push(error),
            }
        }
        fan_out
    }
}

/// Runs `task` for every item, at most `limit` at a time, and waits for all of them
pub async fn fan_out<I, F, Fut, T, E>(items: I, limit: usize, task: F) -> FanOut<T, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items)
        .map(task)
        .buffer_unordered(limit.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect()
}
