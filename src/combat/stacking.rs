use std::collections::BTreeMap;

use crate::combat::stats::{CombatantStats, StatKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackCategory {
    /// Multiplicative modifier contribution, summed before applying (`m`)
    Modifier,
    /// Flat additive contribution (`f`)
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackContribution {
    pub key: StatKey,
    pub category: StackCategory,
    pub value: f64,
}

impl StackContribution {
    /// A `multiplier` of 1.3 contributes `+0.3`; 0.8 contributes `-0.2`.
    pub fn multiplier(key: StatKey, multiplier: f64) -> Self {
        Self {
            key,
            category: StackCategory::Modifier,
            value: multiplier - 1.0,
        }
    }

    pub fn flat(key: StatKey, value: f64) -> Self {
        Self {
            key,
            category: StackCategory::Flat,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    pub modifier: f64,
    pub flat: f64,
}

impl CategoryTotals {
    pub fn apply(&mut self, category: StackCategory, value: f64) {
        match category {
            StackCategory::Modifier => self.modifier += value,
            StackCategory::Flat => self.flat += value,
        }
    }

    /// `base * (1 + m) + f`, floored at zero.
    pub fn compose(self, base: f64) -> f64 {
        (base * (1.0 + self.modifier) + self.flat).max(0.0)
    }
}

/// Accumulates buff/debuff contributions per stat, then folds them over a base snapshot.
#[derive(Debug, Clone, Default)]
pub struct StatStacking {
    totals: BTreeMap<StatKey, CategoryTotals>,
}

impl StatStacking {
    pub fn new() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, contribution: StackContribution) {
        self.totals
            .entry(contribution.key)
            .or_default()
            .apply(contribution.category, contribution.value);
    }

    pub fn add_many<I>(&mut self, contributions: I)
    where
        I: IntoIterator<Item = StackContribution>,
    {
        for contribution in contributions {
            self.add(contribution);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Derives a new snapshot; `base` is left untouched. Current health is carried over and
    /// clamped to the derived maximum.
    pub fn apply_to(&self, base: &CombatantStats) -> CombatantStats {
        self.totals
            .iter()
            .fold(*base, |stats, (key, totals)| {
                stats.with(*key, totals.compose(base.get(*key)))
            })
            .clamped()
    }
}
