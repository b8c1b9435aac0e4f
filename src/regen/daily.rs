use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EnergyConfig;
use crate::error::ResourceError;
use crate::regen::clock;
use crate::regen::energy::EnergyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClaim {
    /// Energy actually added after clamping to max.
    pub granted: u32,
    pub streak: u32,
}

/// Claims the daily energy bonus on a synced copy of `energy`.
pub fn claim_daily_bonus(
    energy: &EnergyState,
    config: &EnergyConfig,
    now_ms: i64,
) -> Result<(EnergyState, DailyClaim), ResourceError> {
    let last = energy.last_daily_bonus_claim;
    if !clock::can_claim(last, now_ms) {
        return Err(ResourceError::BonusNotReady {
            seconds_remaining: clock::time_to_claim(last, now_ms),
        });
    }

    let synced = energy.sync(config, now_ms);
    let mut next = synced.grant(config.daily_bonus_amount);
    let granted = next.current - synced.current;
    next.daily_streak = clock::next_streak(last, now_ms, energy.daily_streak);
    next.last_daily_bonus_claim = Some(now_ms);
    info!(granted, streak = next.daily_streak, "daily bonus claimed");
    Ok((
        next.clone(),
        DailyClaim {
            granted,
            streak: next.daily_streak,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;
    const DAY_MS: i64 = 86_400_000;

    fn state(current: u32) -> EnergyState {
        EnergyState {
            current,
            max: 100,
            last_update: T0,
            last_daily_bonus_claim: None,
            daily_streak: 0,
        }
    }

    #[test]
    fn first_claim_starts_streak_and_clamps() {
        let config = EnergyConfig::default();
        let (next, claim) = claim_daily_bonus(&state(80), &config, T0).unwrap();
        assert_eq!(claim, DailyClaim { granted: 20, streak: 1 });
        assert_eq!(next.current, 100);
    }

    #[test]
    fn second_claim_within_a_day_is_rejected() {
        let config = EnergyConfig::default();
        let (next, _) = claim_daily_bonus(&state(0), &config, T0).unwrap();
        let err = claim_daily_bonus(&next, &config, T0 + DAY_MS - 60_000).unwrap_err();
        assert_eq!(err, ResourceError::BonusNotReady { seconds_remaining: 60 });
    }

    #[test]
    fn streak_continues_next_day_and_resets_after_gap() {
        let config = EnergyConfig::default();
        let (day1, _) = claim_daily_bonus(&state(0), &config, T0).unwrap();
        let (day2, claim) = claim_daily_bonus(&day1, &config, T0 + DAY_MS + 1).unwrap();
        assert_eq!(claim.streak, 2);
        let (_, late) = claim_daily_bonus(&day2, &config, T0 + 4 * DAY_MS).unwrap();
        assert_eq!(late.streak, 1);
    }
}
