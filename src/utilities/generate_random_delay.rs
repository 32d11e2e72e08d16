use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};
use tracing::debug;

/// `base_ms` plus a uniformly random extra in `0..=jitter_ms`.
pub fn random_delay(base_ms: u64, jitter_ms: u64) -> Duration {
    let extra = if jitter_ms == 0 {
        0
    } else {
        let mut rng = StdRng::from_entropy();
        rng.gen_range(0..=jitter_ms)
    };

    Duration::from_millis(base_ms.saturating_add(extra))
}

/// Sleep between two requests to the same retailers.
pub async fn generate_random_delay(base_ms: u64, jitter_ms: u64) {
    let delay = random_delay(base_ms, jitter_ms);
    if delay.is_zero() {
        return;
    }

    debug!(delay_ms = delay.as_millis() as u64, "Waiting before next request");
    sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_in_range() {
        assert_eq!(random_delay(2000, 0), Duration::from_millis(2000));

        for _ in 0..50 {
            let delay = random_delay(100, 50);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }
}
