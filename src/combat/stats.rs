use serde::{Deserialize, Serialize};

/// Stat identifiers shared by combatant snapshots, status modifiers and item bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    MaxHealth,
    Attack,
    Defense,
    AttackSpeed,
    #[serde(alias = "critRate")]
    CriticalChance,
    #[serde(alias = "critDamage")]
    CriticalDamage,
    Evasion,
    Penetration,
    LifeSteal,
}

impl StatKey {
    pub const ALL: [StatKey; 9] = [
        StatKey::MaxHealth,
        StatKey::Attack,
        StatKey::Defense,
        StatKey::AttackSpeed,
        StatKey::CriticalChance,
        StatKey::CriticalDamage,
        StatKey::Evasion,
        StatKey::Penetration,
        StatKey::LifeSteal,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::MaxHealth => "max health",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::AttackSpeed => "attack speed",
            Self::CriticalChance => "crit rate",
            Self::CriticalDamage => "crit damage",
            Self::Evasion => "evasion",
            Self::Penetration => "penetration",
            Self::LifeSteal => "life steal",
        }
    }
}

/// Immutable stat snapshot of one combatant.
///
/// Percent-valued stats (`critical_chance`, `evasion`, `penetration`, `life_steal`) use the
/// 0..100 scale. `critical_damage` is a multiplier; values at or below 1.0 mean "use the
/// configured baseline".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantStats {
    pub max_health: i64,
    /// Omitted in monster tables; spawning fills it to max.
    #[serde(default)]
    pub current_health: i64,
    pub attack: f64,
    pub defense: f64,
    #[serde(default = "default_attack_speed")]
    pub attack_speed: f64,
    #[serde(default)]
    pub critical_chance: f64,
    #[serde(default)]
    pub critical_damage: f64,
    #[serde(default)]
    pub evasion: f64,
    #[serde(default)]
    pub penetration: f64,
    #[serde(default)]
    pub life_steal: f64,
}

fn default_attack_speed() -> f64 {
    1.0
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self {
            max_health: 100,
            current_health: 100,
            attack: 10.0,
            defense: 0.0,
            attack_speed: 1.0,
            critical_chance: 0.0,
            critical_damage: 0.0,
            evasion: 0.0,
            penetration: 0.0,
            life_steal: 0.0,
        }
    }
}

impl CombatantStats {
    /// Fresh snapshot at full health.
    pub fn new(max_health: i64, attack: f64, defense: f64) -> Self {
        let max_health = max_health.max(1);
        Self {
            max_health,
            current_health: max_health,
            attack,
            defense,
            ..Self::default()
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.current_health.clamp(0, self.max_health) as f64 / self.max_health as f64
    }

    /// Health clamped into `[0, max_health]`, negative stats floored at zero.
    pub fn clamped(self) -> Self {
        let max_health = self.max_health.max(1);
        Self {
            max_health,
            current_health: self.current_health.clamp(0, max_health),
            attack: self.attack.max(0.0),
            defense: self.defense.max(0.0),
            attack_speed: self.attack_speed.max(0.0),
            critical_chance: self.critical_chance.max(0.0),
            critical_damage: self.critical_damage.max(0.0),
            evasion: self.evasion.clamp(0.0, 100.0),
            penetration: self.penetration.clamp(0.0, 100.0),
            life_steal: self.life_steal.max(0.0),
        }
    }

    pub fn with_damage(self, amount: i64) -> Self {
        Self {
            current_health: (self.current_health - amount.max(0)).clamp(0, self.max_health),
            ..self
        }
    }

    pub fn with_heal(self, amount: i64) -> Self {
        if self.is_dead() {
            return self;
        }
        Self {
            current_health: (self.current_health + amount.max(0)).clamp(0, self.max_health),
            ..self
        }
    }

    pub fn with_full_health(self) -> Self {
        Self {
            current_health: self.max_health,
            ..self
        }
    }

    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::MaxHealth => self.max_health as f64,
            StatKey::Attack => self.attack,
            StatKey::Defense => self.defense,
            StatKey::AttackSpeed => self.attack_speed,
            StatKey::CriticalChance => self.critical_chance,
            StatKey::CriticalDamage => self.critical_damage,
            StatKey::Evasion => self.evasion,
            StatKey::Penetration => self.penetration,
            StatKey::LifeSteal => self.life_steal,
        }
    }

    /// Returns a copy with one stat replaced. Changing `max_health` clamps current health
    /// but never tops it up.
    pub fn with(self, key: StatKey, value: f64) -> Self {
        let mut next = self;
        match key {
            StatKey::MaxHealth => {
                next.max_health = value.round().max(1.0) as i64;
                next.current_health = next.current_health.min(next.max_health);
            }
            StatKey::Attack => next.attack = value,
            StatKey::Defense => next.defense = value,
            StatKey::AttackSpeed => next.attack_speed = value,
            StatKey::CriticalChance => next.critical_chance = value,
            StatKey::CriticalDamage => next.critical_damage = value,
            StatKey::Evasion => next.evasion = value,
            StatKey::Penetration => next.penetration = value,
            StatKey::LifeSteal => next.life_steal = value,
        }
        next
    }

    /// Scales the offensive and defensive core (health, attack, defense). Used for
    /// dungeon difficulty.
    pub fn scaled(self, health: f64, attack: f64, defense: f64) -> Self {
        let max_health = ((self.max_health as f64) * health).round().max(1.0) as i64;
        Self {
            max_health,
            current_health: max_health,
            attack: self.attack * attack,
            defense: self.defense * defense,
            ..self
        }
    }
}
