pub mod abilities;
pub mod combatant;
pub mod combo;
pub mod damage;
pub mod engine;
pub mod export_csv;
pub mod log;
pub mod rng;
pub mod stacking;
pub mod stats;
pub mod status;

pub use abilities::{
    apply_effect, tick_cooldowns, triggered_abilities, AbilityBook, AbilityEffect, AbilityState,
    AbilityTrigger, EffectOutcome, MonsterAbility, TriggeredAbility,
};
pub use combatant::{Combatant, Side};
pub use combo::{ComboBonus, ComboDetector, ComboMatch, SkillCast, SkillCombo};
pub use damage::{resolve_attack, AttackModifiers, AttackOutcome, MIN_DAMAGE};
pub use engine::{
    Battle, BattleContext, BattleReport, BattleRewards, BattleState, PlayerAction, RewardPlan,
    TickOutcome,
};
pub use export_csv::{battle_log_to_csv, parse_battle_csv, write_battle_csv};
pub use log::{BattleLog, BattleMessage, MessageType};
pub use rng::{Rng, Weighted};
pub use stacking::{CategoryTotals, StackCategory, StackContribution, StatStacking};
pub use stats::{CombatantStats, StatKey};
pub use status::{
    ApplyOutcome, EffectTarget, StackingRule, StackingRules, StatusEffect, StatusEffectSpec,
    StatusKind, StatusSet, TickReport,
};
