use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EnergyConfig;
use crate::error::ResourceError;
use crate::regen::clock;

/// Persisted energy record. Only the methods here move it forward in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyState {
    pub current: u32,
    pub max: u32,
    /// Unix ms at the start of the running regeneration cycle.
    pub last_update: i64,
    #[serde(default)]
    pub last_daily_bonus_claim: Option<i64>,
    #[serde(default)]
    pub daily_streak: u32,
}

impl EnergyState {
    pub fn new(config: &EnergyConfig, now_ms: i64) -> Self {
        Self {
            current: config.max,
            max: config.max,
            last_update: now_ms,
            last_daily_bonus_claim: None,
            daily_streak: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Applies regeneration up to `now_ms`. Partial progress toward the next tick is kept
    /// by advancing `last_update` only by whole cycles.
    pub fn sync(&self, config: &EnergyConfig, now_ms: i64) -> Self {
        let mut next = self.clone();
        next.max = config.max;
        if next.current > next.max {
            warn!(current = next.current, max = next.max, "energy above max, clamping");
            next.current = next.max;
        }
        if next.last_update <= 0 {
            let gained = clock::offline_recovery(
                next.last_update,
                now_ms,
                next.current,
                next.max,
                config.regen_amount,
                config.regen_interval_secs,
                config.max_offline_hours,
            );
            warn!(
                last_update = next.last_update,
                gained,
                "energy record never updated, restarting clock"
            );
            next.current += gained;
            next.last_update = now_ms;
            return next;
        }
        if next.is_full() {
            next.last_update = next.last_update.max(now_ms);
            return next;
        }

        let gained = clock::offline_recovery(
            next.last_update,
            now_ms,
            next.current,
            next.max,
            config.regen_amount,
            config.regen_interval_secs,
            config.max_offline_hours,
        );
        if gained == 0 {
            return next;
        }
        next.current += gained;
        if next.is_full() {
            next.last_update = now_ms;
        } else {
            let interval_ms = config.regen_interval_secs * clock::MILLIS_PER_SEC;
            let cap_ms =
                config.max_offline_hours.max(0) * clock::SECS_PER_HOUR * clock::MILLIS_PER_SEC;
            let elapsed = now_ms - next.last_update;
            next.last_update = if elapsed > cap_ms {
                now_ms - cap_ms % interval_ms
            } else {
                now_ms - elapsed % interval_ms
            };
        }
        debug!(gained, current = next.current, "energy regenerated");
        next
    }

    /// Syncs, then spends `amount`. Dropping below max starts a fresh cycle.
    pub fn spend(
        &self,
        amount: u32,
        config: &EnergyConfig,
        now_ms: i64,
    ) -> Result<Self, ResourceError> {
        let mut next = self.sync(config, now_ms);
        if next.current < amount {
            return Err(ResourceError::InsufficientEnergy {
                needed: amount,
                have: next.current,
            });
        }
        if next.is_full() {
            next.last_update = now_ms;
        }
        next.current -= amount;
        Ok(next)
    }

    /// Adds energy without syncing, clamped to max.
    pub fn grant(&self, amount: u32) -> Self {
        let mut next = self.clone();
        next.current = next.current.saturating_add(amount).min(next.max);
        next
    }

    pub fn time_to_next_regen(&self, config: &EnergyConfig, now_ms: i64) -> i64 {
        clock::time_to_next_regen(
            self.last_update,
            now_ms,
            self.current,
            self.max,
            config.regen_interval_secs,
        )
    }

    pub fn time_to_full(&self, config: &EnergyConfig, now_ms: i64) -> i64 {
        clock::time_to_full(
            self.current,
            self.max,
            config.regen_amount,
            self.time_to_next_regen(config, now_ms),
            config.regen_interval_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;
    const CYCLE_MS: i64 = 300_000;

    fn drained(current: u32) -> EnergyState {
        EnergyState {
            current,
            max: 100,
            last_update: T0,
            last_daily_bonus_claim: None,
            daily_streak: 0,
        }
    }

    #[test]
    fn sync_keeps_partial_cycle_progress() {
        let config = EnergyConfig::default();
        let synced = drained(0).sync(&config, T0 + 2 * CYCLE_MS + 120_000);
        assert_eq!(synced.current, 20);
        assert_eq!(synced.last_update, T0 + 2 * CYCLE_MS);
        assert_eq!(synced.time_to_next_regen(&config, T0 + 2 * CYCLE_MS + 120_000), 180);
    }

    #[test]
    fn sync_is_idempotent() {
        let config = EnergyConfig::default();
        let now = T0 + 7 * CYCLE_MS + 1;
        let once = drained(10).sync(&config, now);
        assert_eq!(once.sync(&config, now), once);
    }

    #[test]
    fn spend_from_full_restarts_cycle() {
        let config = EnergyConfig::default();
        let full = EnergyState::new(&config, T0);
        let spent = full.spend(10, &config, T0 + 10 * CYCLE_MS).unwrap();
        assert_eq!(spent.current, 90);
        assert_eq!(spent.last_update, T0 + 10 * CYCLE_MS);
    }

    #[test]
    fn spend_rejects_when_short() {
        let config = EnergyConfig::default();
        let err = drained(5).spend(10, &config, T0).unwrap_err();
        assert_eq!(err, ResourceError::InsufficientEnergy { needed: 10, have: 5 });
    }

    #[test]
    fn never_updated_record_fills_then_restarts_the_clock() {
        let config = EnergyConfig::default();
        let record = EnergyState {
            last_update: 0,
            ..drained(0)
        };
        let synced = record.sync(&config, T0);
        assert_eq!(synced.current, 100);
        assert_eq!(synced.last_update, T0);
        assert_eq!(synced.sync(&config, T0), synced);
    }

    #[test]
    fn over_max_is_clamped() {
        let config = EnergyConfig::default();
        let synced = drained(250).sync(&config, T0);
        assert_eq!(synced.current, 100);
    }
}
