//! Adaptive wait computation between two fetches.
//!
//! The remote source publishes tomorrow's color once a day, late in the
//! morning. The worker only needs to poll often while that publication is
//! pending; once tomorrow is known nothing changes before the next tariff
//! day starts.

use std::time::Duration;

use chrono::{DateTime, Days, TimeZone};
use tempo_types::SchedulePolicy;

use crate::time::local_at;

/// Shortest wait ever returned.
const MIN_WAIT: Duration = Duration::from_secs(1);

/// Which rule produced a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitBranch {
    /// Nothing fetched yet.
    Bootstrap,
    /// Tomorrow known, confirmation time passed: sleep until the next change-hour.
    NextChange,
    /// Tomorrow known, before confirmation time: sleep until confirmation time.
    UntilConfirmation,
    /// Tomorrow unknown, before the change-hour: sleep until the change-hour.
    UntilChangeHour,
    /// Tomorrow unknown, after the change-hour: short retry.
    Retry,
    /// Horizon not in an expected shape: fixed fallback.
    Fallback,
}

/// A computed wait together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitDecision {
    /// Rule applied.
    pub branch: WaitBranch,
    /// Strictly positive sleep duration.
    pub wait: Duration,
}

fn until<Z: TimeZone>(now: &DateTime<Z>, target: &DateTime<Z>) -> Duration {
    target
        .clone()
        .signed_duration_since(now.clone())
        .to_std()
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or(MIN_WAIT)
}

/// Decide how long to sleep given the current time and the known data horizon.
///
/// The horizon is compared by civil date in the timezone of `now`: an end two
/// days ahead means tomorrow's color is known, one day ahead means only today
/// is known. Any other distance is treated as an anomaly.
#[must_use]
pub fn plan_next_wait<Z: TimeZone>(
    now: &DateTime<Z>,
    known_data_end: Option<&DateTime<Z>>,
    policy: &SchedulePolicy,
) -> WaitDecision {
    let Some(end) = known_data_end else {
        return WaitDecision {
            branch: WaitBranch::Bootstrap,
            wait: policy.bootstrap_wait.max(MIN_WAIT),
        };
    };

    let tz = now.timezone();
    let today = now.date_naive();
    let days_ahead = end
        .with_timezone(&tz)
        .date_naive()
        .signed_duration_since(today)
        .num_days();

    let decision = match days_ahead {
        2 => {
            let confirmation = local_at(&tz, today, policy.confirm_hour, policy.confirm_minute);
            if *now >= confirmation {
                let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
                let next_change = local_at(&tz, tomorrow, policy.change_hour, 0);
                WaitDecision {
                    branch: WaitBranch::NextChange,
                    wait: until(now, &next_change),
                }
            } else {
                WaitDecision {
                    branch: WaitBranch::UntilConfirmation,
                    wait: until(now, &confirmation),
                }
            }
        }
        1 => {
            let change = local_at(&tz, today, policy.change_hour, 0);
            if *now < change {
                WaitDecision {
                    branch: WaitBranch::UntilChangeHour,
                    wait: until(now, &change),
                }
            } else {
                WaitDecision {
                    branch: WaitBranch::Retry,
                    wait: policy.retry_wait.max(MIN_WAIT),
                }
            }
        }
        _other => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                days_ahead = _other,
                "unexpected data horizon, using fallback wait"
            );
            WaitDecision {
                branch: WaitBranch::Fallback,
                wait: policy.fallback_wait.max(MIN_WAIT),
            }
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(branch = ?decision.branch, wait_secs = decision.wait.as_secs(), "next wait computed");

    decision
}

/// Sleep duration before the next fetch. See [`plan_next_wait`].
#[must_use]
pub fn compute_next_wait<Z: TimeZone>(
    now: &DateTime<Z>,
    known_data_end: Option<&DateTime<Z>>,
    policy: &SchedulePolicy,
) -> Duration {
    plan_next_wait(now, known_data_end, policy).wait
}
