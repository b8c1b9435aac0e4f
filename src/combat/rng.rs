//! Fast PRNG for battle resolution. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.
//!
//! All probability checks in the engine are expressed on a 0..100 percent scale:
//! [Rng::roll] yields a uniform value in `[0, 100)` and a check succeeds when the roll
//! falls below the configured chance.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

/// One row of a weighted lookup table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted<K> {
    pub key: K,
    pub weight: f64,
}

impl<K> Weighted<K> {
    pub fn new(key: K, weight: f64) -> Self {
        Self { key, weight }
    }
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeds from the operating system. Falls back to the wall clock if the OS source fails.
    pub fn from_entropy() -> Self {
        let mut buf = [0_u8; 8];
        if getrandom::getrandom(&mut buf).is_err() {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(SPLITMIX64_GOLDEN);
            return Self::new(nanos);
        }
        Self::new(u64::from_le_bytes(buf))
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` using the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform percent roll in `[0, 100)`.
    #[inline]
    pub fn roll(&mut self) -> f64 {
        self.next_f64() * 100.0
    }

    /// True with probability `percent / 100`. Chances at or below 0 never pass,
    /// chances at or above 100 always pass.
    #[inline]
    pub fn chance(&mut self, percent: f64) -> bool {
        self.roll() < percent
    }

    /// Uniform integer in the inclusive range `[min, max]`. Swapped bounds are tolerated.
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (hi - lo) as u64 + 1;
        lo + (self.next_u64() % span) as i64
    }

    /// Uniform float in `[min, max]`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    pub fn fill_bytes(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    /// Cumulative pick normalized over the table's total weight. Returns `None` for an
    /// empty table or one whose weights are all non-positive.
    pub fn weighted_pick<K: Copy>(&mut self, table: &[Weighted<K>]) -> Option<K> {
        let total: f64 = table.iter().map(|row| row.weight.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let target = self.next_f64() * total;
        pick_cumulative(table, target).or_else(|| last_positive(table))
    }

    /// Cumulative pick against a single percent roll without normalization: weights
    /// summing to less than 100 leave the remainder as "no pick".
    pub fn gated_pick<K: Copy>(&mut self, table: &[Weighted<K>]) -> Option<K> {
        let roll = self.roll();
        pick_cumulative(table, roll)
    }
}

fn pick_cumulative<K: Copy>(table: &[Weighted<K>], target: f64) -> Option<K> {
    let mut cumulative = 0.0;
    for row in table {
        cumulative += row.weight.max(0.0);
        if target < cumulative {
            return Some(row.key);
        }
    }
    None
}

// Floating point accumulation can leave `target` a hair above the final bound.
fn last_positive<K: Copy>(table: &[Weighted<K>]) -> Option<K> {
    table.iter().rev().find(|row| row.weight > 0.0).map(|row| row.key)
}
