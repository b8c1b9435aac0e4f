//! Pure time arithmetic for energy regeneration, ticket resets and the daily bonus.
//!
//! Every function recomputes from stored timestamps and `now`, so repeated calls with the
//! same inputs agree. Timestamps are Unix milliseconds; durations returned are seconds.
//! A stored timestamp at or before the epoch is treated as "never updated", and one in the
//! future (clock skew) as zero elapsed time.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use tracing::warn;

pub const MILLIS_PER_SEC: i64 = 1_000;
pub const SECS_PER_HOUR: i64 = 3_600;
pub const SECS_PER_DAY: i64 = 86_400;

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}

/// Milliseconds between `last_update_ms` and `now_ms`, or `None` when the stored timestamp
/// is malformed. Future timestamps yield zero.
pub fn elapsed_ms(last_update_ms: i64, now_ms: i64) -> Option<i64> {
    if last_update_ms <= 0 {
        warn!(last_update_ms, "malformed timestamp, treating as never updated");
        return None;
    }
    if last_update_ms > now_ms {
        warn!(last_update_ms, now_ms, "timestamp in the future, treating as zero elapsed");
        return Some(0);
    }
    Some(now_ms - last_update_ms)
}

/// Seconds until the next regeneration tick: 0 when full, otherwise in `(0, interval]`.
pub fn time_to_next_regen(
    last_update_ms: i64,
    now_ms: i64,
    current: u32,
    max: u32,
    regen_interval_secs: i64,
) -> i64 {
    if current >= max || regen_interval_secs <= 0 {
        return 0;
    }
    let interval_ms = regen_interval_secs * MILLIS_PER_SEC;
    let elapsed = elapsed_ms(last_update_ms, now_ms).unwrap_or(0);
    let remaining_ms = interval_ms - elapsed.rem_euclid(interval_ms);
    ceil_div(remaining_ms, MILLIS_PER_SEC)
}

/// Whole regeneration cycles completed since `last_update_ms`, counting at most
/// `max_offline_hours` of elapsed time. A malformed timestamp counts as the full cap.
pub fn completed_cycles(
    last_update_ms: i64,
    now_ms: i64,
    regen_interval_secs: i64,
    max_offline_hours: i64,
) -> i64 {
    if regen_interval_secs <= 0 {
        return 0;
    }
    let cap_ms = max_offline_hours.max(0) * SECS_PER_HOUR * MILLIS_PER_SEC;
    let elapsed = elapsed_ms(last_update_ms, now_ms).unwrap_or(cap_ms);
    elapsed.min(cap_ms) / (regen_interval_secs * MILLIS_PER_SEC)
}

/// Energy regained while away, clamped so `current + gained <= max`.
pub fn offline_recovery(
    last_update_ms: i64,
    now_ms: i64,
    current: u32,
    max: u32,
    regen_amount: u32,
    regen_interval_secs: i64,
    max_offline_hours: i64,
) -> u32 {
    if current >= max {
        return 0;
    }
    let cycles = completed_cycles(last_update_ms, now_ms, regen_interval_secs, max_offline_hours);
    let gained = (cycles as u64).saturating_mul(u64::from(regen_amount));
    gained.min(u64::from(max - current)) as u32
}

/// Seconds until `current` reaches `max`, given the time left in the running cycle.
pub fn time_to_full(
    current: u32,
    max: u32,
    regen_amount: u32,
    next_regen_in_secs: i64,
    regen_interval_secs: i64,
) -> i64 {
    if current >= max || regen_amount == 0 {
        return 0;
    }
    let missing = i64::from(max - current);
    let cycles_needed = ceil_div(missing, i64::from(regen_amount));
    next_regen_in_secs.max(0) + (cycles_needed - 1) * regen_interval_secs.max(0)
}

fn offset(utc_offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
        warn!(utc_offset_minutes, "utc offset out of range, using UTC");
        Utc.fix()
    })
}

fn local_time(now_ms: i64, utc_offset_minutes: i32) -> NaiveDateTime {
    let utc = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_default();
    utc.with_timezone(&offset(utc_offset_minutes)).naive_local()
}

fn reset_at(date: NaiveDate, reset_hour: u32) -> NaiveDateTime {
    date.and_hms_opt(reset_hour.min(23), 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Seconds until the next local `reset_hour:00`, in `(0, 86400]`. Exactly at the boundary
/// the next reset is a full day away.
pub fn time_to_reset(now_ms: i64, reset_hour: u32, utc_offset_minutes: i32) -> i64 {
    let local = local_time(now_ms, utc_offset_minutes);
    let today = reset_at(local.date(), reset_hour);
    let next = if local < today {
        today
    } else {
        reset_at(local.date() + Days::new(1), reset_hour)
    };
    ceil_div((next - local).num_milliseconds(), MILLIS_PER_SEC)
}

/// The reset-aligned day `now_ms` falls in: local date, with times before `reset_hour`
/// belonging to the previous day.
pub fn reset_day(now_ms: i64, reset_hour: u32, utc_offset_minutes: i32) -> NaiveDate {
    let local = local_time(now_ms, utc_offset_minutes);
    let shifted = local - chrono::Duration::hours(i64::from(reset_hour.min(23)));
    shifted.date()
}

/// True when there is no prior claim or at least 24h have passed since it.
pub fn can_claim(last_claim_ms: Option<i64>, now_ms: i64) -> bool {
    match last_claim_ms {
        None => true,
        Some(last) => match elapsed_ms(last, now_ms) {
            None => true,
            Some(elapsed) => elapsed >= SECS_PER_DAY * MILLIS_PER_SEC,
        },
    }
}

/// Seconds until [can_claim] turns true; 0 when it already is.
pub fn time_to_claim(last_claim_ms: Option<i64>, now_ms: i64) -> i64 {
    let Some(last) = last_claim_ms else {
        return 0;
    };
    match elapsed_ms(last, now_ms) {
        None => 0,
        Some(elapsed) => ceil_div((SECS_PER_DAY * MILLIS_PER_SEC - elapsed).max(0), MILLIS_PER_SEC),
    }
}

/// Streak after a claim at `now_ms`: continues when the gap is in `[24h, 48h)`, else 1.
pub fn next_streak(last_claim_ms: Option<i64>, now_ms: i64, streak: u32) -> u32 {
    let Some(elapsed) = last_claim_ms.and_then(|last| elapsed_ms(last, now_ms)) else {
        return 1;
    };
    let day = SECS_PER_DAY * MILLIS_PER_SEC;
    if (day..2 * day).contains(&elapsed) {
        streak.saturating_add(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;
    const INTERVAL: i64 = 300;

    #[test]
    fn next_regen_is_zero_when_full() {
        assert_eq!(time_to_next_regen(T0, T0 + 10_000, 100, 100, INTERVAL), 0);
        assert_eq!(time_to_next_regen(T0, T0 + 10_000, 120, 100, INTERVAL), 0);
    }

    #[test]
    fn next_regen_counts_down_within_cycle() {
        assert_eq!(time_to_next_regen(T0, T0, 0, 100, INTERVAL), 300);
        assert_eq!(time_to_next_regen(T0, T0 + 1_000, 0, 100, INTERVAL), 299);
        assert_eq!(time_to_next_regen(T0, T0 + 299_500, 0, 100, INTERVAL), 1);
        assert_eq!(time_to_next_regen(T0, T0 + 300_000, 0, 100, INTERVAL), 300);
    }

    #[test]
    fn future_timestamp_counts_as_no_time_passed() {
        assert_eq!(time_to_next_regen(T0 + 60_000, T0, 0, 100, INTERVAL), 300);
        assert_eq!(offline_recovery(T0 + 60_000, T0, 0, 100, 10, INTERVAL, 24), 0);
    }

    #[test]
    fn malformed_timestamp_recovers_the_full_cap() {
        assert_eq!(offline_recovery(0, T0, 0, 100, 10, INTERVAL, 24), 100);
        assert_eq!(offline_recovery(-5, T0, 40, 100, 10, INTERVAL, 24), 60);
        // One hour of 5-minute cycles.
        assert_eq!(completed_cycles(0, T0, INTERVAL, 1), 12);
    }

    #[test]
    fn offline_recovery_caps_elapsed_hours() {
        let two_hours = 2 * SECS_PER_HOUR * MILLIS_PER_SEC;
        // 2h of 5-minute cycles is 24 cycles, capped to 1h = 12 cycles.
        assert_eq!(offline_recovery(T0, T0 + two_hours, 0, 1_000, 1, INTERVAL, 1), 12);
    }

    #[test]
    fn time_to_full_adds_remaining_cycles() {
        assert_eq!(time_to_full(100, 100, 10, 120, INTERVAL), 0);
        assert_eq!(time_to_full(95, 100, 10, 120, INTERVAL), 120);
        assert_eq!(time_to_full(70, 100, 10, 120, INTERVAL), 120 + 2 * 300);
        assert_eq!(time_to_full(71, 100, 10, 120, INTERVAL), 120 + 2 * 300);
    }

    #[test]
    fn reset_rolls_to_next_day_once_passed() {
        // 2023-11-14T22:13:20Z
        let before_midnight = T0;
        let until = time_to_reset(before_midnight, 5, 0);
        assert_eq!(until, (3_600 + 46 * 60 + 40) + 5 * 3_600);

        let at_reset = DateTime::<Utc>::from_timestamp_millis(T0)
            .unwrap()
            .date_naive()
            .and_hms_opt(5, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(time_to_reset(at_reset, 5, 0), SECS_PER_DAY);
        assert_eq!(time_to_reset(at_reset - 1_000, 5, 0), 1);
    }

    #[test]
    fn reset_respects_utc_offset() {
        // 22:13:20Z is 00:13:20 at UTC+2, so 05:00 local is 4h46m40s away.
        assert_eq!(time_to_reset(T0, 5, 120), 4 * 3_600 + 46 * 60 + 40);
    }

    #[test]
    fn reset_day_shifts_early_hours_back() {
        let day = reset_day(T0, 5, 0);
        assert_eq!(day.to_string(), "2023-11-14");
        // 00:13 local at UTC+2 is still the previous reset day.
        assert_eq!(reset_day(T0, 5, 120).to_string(), "2023-11-14");
        assert_eq!(reset_day(T0 + 7 * 3_600_000, 5, 0).to_string(), "2023-11-15");
    }

    #[test]
    fn claim_and_streak_windows() {
        let day = SECS_PER_DAY * MILLIS_PER_SEC;
        assert!(can_claim(None, T0));
        assert!(!can_claim(Some(T0), T0 + day - 1));
        assert!(can_claim(Some(T0), T0 + day));
        assert_eq!(time_to_claim(Some(T0), T0 + day - 1_000), 1);

        assert_eq!(next_streak(None, T0, 0), 1);
        assert_eq!(next_streak(Some(T0), T0 + day, 3), 4);
        assert_eq!(next_streak(Some(T0), T0 + 2 * day - 1, 3), 4);
        assert_eq!(next_streak(Some(T0), T0 + 2 * day, 3), 1);
    }
}
