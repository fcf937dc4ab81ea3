use std::time::Duration;

use rand::Rng;

/// Extend `base_ms` by a random amount of up to `jitter_percent` percent.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms.saturating_add(rng.random_range(0..jitter_range))
}

/// [`jitter_wait`] over a `Duration`, saturating at `u64::MAX` milliseconds.
pub fn jittered(base: Duration, jitter_percent: u8) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(jitter_wait(base_ms, u32::from(jitter_percent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_jitter_is_exact() {
        assert_eq!(jitter_wait(600_000, 0), 600_000);
        assert_eq!(jittered(Duration::from_secs(30), 0), Duration::from_secs(30));
    }

    proptest! {
        #[test]
        fn jitter_stays_within_percent(base in 1u64..86_400_000, pct in 0u32..=100) {
            let w = jitter_wait(base, pct);
            prop_assert!(w >= base);
            prop_assert!(w <= base + std::cmp::max(1, base * u64::from(pct) / 100));
        }
    }
}
