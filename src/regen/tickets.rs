use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TicketConfig;
use crate::error::ResourceError;
use crate::regen::clock;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Persisted battle-ticket record. Refills to `max` once per reset-aligned day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketState {
    pub count: u32,
    pub max: u32,
    /// `YYYY-MM-DD` of the last refill; empty when never refilled.
    #[serde(default)]
    pub last_reset_day: String,
}

impl TicketState {
    pub fn new(config: &TicketConfig, now_ms: i64) -> Self {
        Self {
            count: config.max,
            max: config.max,
            last_reset_day: current_day(config, now_ms),
        }
    }

    pub fn sync(&self, config: &TicketConfig, now_ms: i64) -> Self {
        let today = current_day(config, now_ms);
        let mut next = self.clone();
        next.max = config.max;
        if next.last_reset_day != today {
            debug!(previous = %next.last_reset_day, today = %today, "tickets refilled");
            next.count = next.max;
            next.last_reset_day = today;
        }
        next.count = next.count.min(next.max);
        next
    }

    pub fn use_ticket(&self, config: &TicketConfig, now_ms: i64) -> Result<Self, ResourceError> {
        let mut next = self.sync(config, now_ms);
        if next.count == 0 {
            return Err(ResourceError::NoTickets);
        }
        next.count -= 1;
        Ok(next)
    }

    pub fn time_to_reset(config: &TicketConfig, now_ms: i64) -> i64 {
        clock::time_to_reset(now_ms, config.reset_hour, config.utc_offset_minutes)
    }
}

fn current_day(config: &TicketConfig, now_ms: i64) -> String {
    clock::reset_day(now_ms, config.reset_hour, config.utc_offset_minutes)
        .format(DAY_FORMAT)
        .to_string()
}
