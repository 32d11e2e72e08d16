use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::config::BatchConfig;
use crate::utilities::generate_random_delay::generate_random_delay;

/// Pacing for a batch of extractions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub delay_ms: u64,
    pub jitter_ms: u64,
    /// 1 (the default) runs strictly one after another with a delay in between.
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            delay_ms: config.delay_ms,
            jitter_ms: config.jitter_ms,
            concurrency: config.concurrency,
        }
    }
}

/// Run `task` over `items`, returning results in input order.
///
/// Sequential mode sleeps between consecutive items but not after the last one.
/// With `concurrency > 1` up to that many tasks run at once and no delay is
/// applied.
pub async fn run_paced<T, R, F, Fut>(items: Vec<T>, options: &BatchOptions, task: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    if options.concurrency > 1 {
        return stream::iter(items)
            .map(&task)
            .buffered(options.concurrency)
            .collect()
            .await;
    }

    let total = items.len();
    let mut results = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        results.push(task(item).await);

        if index + 1 < total {
            generate_random_delay(options.delay_ms, options.jitter_ms).await;
        }
    }

    results
}
