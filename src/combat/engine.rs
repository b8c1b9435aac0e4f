//! Turn orchestration for one battle.
//!
//! A [Battle] is advanced by the host, one half-turn per [Battle::tick]: the player acts,
//! then each living monster in order, then round-end processing (periodic damage, status
//! countdown, ability cooldowns) runs once before the next player turn. Stage clears pause
//! for `stage_delay_ms` on the host clock before the next stage spawns.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combat::abilities::{
    apply_effect, tick_cooldowns, triggered_abilities, AbilityBook, AbilityTrigger, EffectOutcome,
};
use crate::combat::combatant::Combatant;
use crate::combat::combo::{ComboBonus, ComboDetector, SkillCast, SkillCombo};
use crate::combat::damage::{resolve_attack, AttackModifiers, AttackOutcome};
use crate::combat::log::{BattleLog, BattleMessage, MessageType};
use crate::combat::rng::Rng;
use crate::combat::status::{
    ApplyOutcome, EffectTarget, StackingRules, StatusEffectSpec, StatusKind,
};
use crate::config::{BattleConstants, EngineConfig};
use crate::data::dungeon::{Difficulty, DungeonConfig};
use crate::data::skills::{SkillBook, SkillKind};
use crate::error::BattleError;
use crate::loot::item::{generate_random_item, Item, ItemType};
use crate::loot::rarity::RarityTable;
use crate::loot::rewards::{calculate_drops, DropEntry, RewardItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleState {
    NotStarted,
    InProgress,
    Victory,
    Defeat,
}

impl BattleState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerAction {
    Attack,
    Skill(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    PlayerActed,
    PlayerSkipped,
    MonsterActed(usize),
    MonsterSkipped(usize),
    StageCleared,
    Waiting { resume_at: i64 },
    StageAdvanced(usize),
    Finished(BattleState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Player,
    Monster(usize),
    StageCleared { resume_at: i64 },
}

/// Static tables a battle reads from. Each battle owns its own copy.
#[derive(Debug, Clone, Default)]
pub struct BattleContext {
    pub constants: BattleConstants,
    pub stacking: StackingRules,
    pub abilities: AbilityBook,
    pub skills: SkillBook,
    pub combos: Vec<SkillCombo>,
}

impl BattleContext {
    pub fn from_config(config: &EngineConfig, abilities: AbilityBook) -> Self {
        Self {
            constants: config.battle,
            stacking: config.stacking,
            abilities,
            skills: SkillBook::new(config.skills.iter().cloned()),
            combos: config.combos.clone(),
        }
    }
}

/// What a victory pays out beyond defeated-monster experience and gold.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardPlan {
    pub dungeon_id: String,
    pub drops: Vec<DropEntry>,
    pub equipment_drop_chance: f64,
    pub is_first_clear: bool,
    pub first_clear_bonus_gold: u64,
    pub difficulty: Difficulty,
    pub player_level: u32,
    pub rarities: RarityTable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRewards {
    pub experience: u64,
    pub gold: u64,
    pub items: Vec<RewardItem>,
    pub equipment: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    pub outcome: BattleState,
    pub turns: u32,
    pub stages_cleared: usize,
    pub surviving_health_ratio: f64,
    pub messages: Vec<BattleMessage>,
    pub rewards: Option<BattleRewards>,
}

#[derive(Debug, Clone)]
pub struct Battle {
    ctx: BattleContext,
    state: BattleState,
    phase: Phase,
    player: Combatant,
    monsters: Vec<Combatant>,
    defeated: Vec<bool>,
    pending_stages: VecDeque<Vec<Combatant>>,
    stage_index: usize,
    stages_cleared: usize,
    turn: u32,
    log: BattleLog,
    rng: Rng,
    combos: ComboDetector,
    queued: Option<PlayerAction>,
    substitution: Option<String>,
    earned_experience: u64,
    earned_gold: u64,
    reward_plan: Option<RewardPlan>,
    rewards: Option<BattleRewards>,
}

impl Battle {
    pub fn new(
        ctx: BattleContext,
        player: Combatant,
        stages: Vec<Vec<Combatant>>,
        seed: u64,
    ) -> Self {
        let combos = ComboDetector::new(ctx.combos.clone(), ctx.constants.combo_log_capacity);
        Self {
            ctx,
            state: BattleState::NotStarted,
            phase: Phase::Player,
            player,
            monsters: Vec::new(),
            defeated: Vec::new(),
            pending_stages: stages.into(),
            stage_index: 0,
            stages_cleared: 0,
            turn: 0,
            log: BattleLog::new(),
            rng: Rng::new(seed),
            combos,
            queued: None,
            substitution: None,
            earned_experience: 0,
            earned_gold: 0,
            reward_plan: None,
            rewards: None,
        }
    }

    /// Spawns every stage of `dungeon` at `difficulty` and attaches its reward plan.
    pub fn for_dungeon(
        ctx: BattleContext,
        player: Combatant,
        dungeon: &DungeonConfig,
        difficulty: Difficulty,
        is_first_clear: bool,
        player_level: u32,
        rarities: RarityTable,
        seed: u64,
    ) -> Self {
        let stages = dungeon
            .stages
            .iter()
            .map(|stage| {
                stage
                    .monsters
                    .iter()
                    .enumerate()
                    .map(|(i, monster)| monster.spawn(i, difficulty))
                    .collect()
            })
            .collect();
        let plan = RewardPlan {
            dungeon_id: dungeon.id.clone(),
            drops: dungeon.drops.clone(),
            equipment_drop_chance: dungeon.equipment_drop_chance,
            is_first_clear,
            first_clear_bonus_gold: dungeon.first_clear_bonus_gold,
            difficulty,
            player_level,
            rarities,
        };
        Self::new(ctx, player, stages, seed).with_reward_plan(plan)
    }

    pub fn with_reward_plan(mut self, plan: RewardPlan) -> Self {
        self.reward_plan = Some(plan);
        self
    }

    /// Seeds the combo detector with casts from earlier in the session.
    pub fn with_skill_history<I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = SkillCast>,
    {
        self.combos = self.combos.with_history(history);
        self
    }

    pub fn skill_history(&self) -> Vec<SkillCast> {
        self.combos.history().cloned().collect()
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Combatant {
        &mut self.player
    }

    pub fn monsters(&self) -> &[Combatant] {
        &self.monsters
    }

    pub fn monster_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        self.monsters.get_mut(index)
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn rewards(&self) -> Option<&BattleRewards> {
        self.rewards.as_ref()
    }

    pub fn is_player_turn(&self) -> bool {
        self.state == BattleState::InProgress && self.phase == Phase::Player
    }

    /// Sets the player's next action. Without one the player makes a basic attack.
    pub fn queue_action(&mut self, action: PlayerAction) {
        self.queued = Some(action);
    }

    pub fn start(&mut self, now: i64) -> Result<(), BattleError> {
        match self.state {
            BattleState::NotStarted => {}
            BattleState::InProgress => return Ok(()),
            BattleState::Victory | BattleState::Defeat => return Err(BattleError::Finished),
        }
        self.state = BattleState::InProgress;
        self.turn = 1;
        self.phase = Phase::Player;
        self.log.push(
            MessageType::Start,
            format!("{} enters the dungeon", self.player.name),
            now,
            self.turn,
        );
        info!(player = %self.player.name, stages = self.pending_stages.len(), "battle started");

        if self.player.is_dead() {
            self.finish(BattleState::Defeat, now);
            return Ok(());
        }
        if !self.spawn_next_stage(now) {
            self.finish(BattleState::Victory, now);
        }
        Ok(())
    }

    pub fn tick(&mut self, now: i64) -> Result<TickOutcome, BattleError> {
        match self.state {
            BattleState::NotStarted => return Err(BattleError::NotStarted),
            BattleState::Victory | BattleState::Defeat => return Err(BattleError::Finished),
            BattleState::InProgress => {}
        }

        if let Phase::StageCleared { resume_at } = self.phase {
            if now < resume_at {
                return Ok(TickOutcome::Waiting { resume_at });
            }
            self.spawn_next_stage(now);
            return Ok(TickOutcome::StageAdvanced(self.stage_index));
        }

        self.sweep_defeated(now);
        if self.all_monsters_dead() {
            return Ok(self.clear_stage(now));
        }

        let outcome = match self.phase {
            Phase::Player => {
                let outcome = self.player_turn(now);
                self.phase = self.next_monster_phase(0);
                outcome
            }
            Phase::Monster(index) => {
                let outcome = self.monster_turn(index, now);
                self.phase = self.next_monster_phase(index + 1);
                outcome
            }
            Phase::StageCleared { .. } => TickOutcome::StageCleared,
        };

        if self.player.is_dead() {
            self.finish(BattleState::Defeat, now);
            return Ok(TickOutcome::Finished(self.state));
        }

        if self.phase == Phase::Player && !self.all_monsters_dead() {
            self.end_round(now);
            if self.player.is_dead() {
                self.finish(BattleState::Defeat, now);
                return Ok(TickOutcome::Finished(self.state));
            }
            if self.turn > self.ctx.constants.max_rounds {
                self.log.push(
                    MessageType::End,
                    format!(
                        "{} is exhausted after {} rounds",
                        self.player.name, self.ctx.constants.max_rounds
                    ),
                    now,
                    self.turn,
                );
                self.finish(BattleState::Defeat, now);
                return Ok(TickOutcome::Finished(self.state));
            }
        }

        self.sweep_defeated(now);
        if self.all_monsters_dead() {
            return Ok(self.clear_stage(now));
        }
        Ok(outcome)
    }

    /// Drives the battle to a terminal state on a simulated clock. `choose` picks the
    /// player's action at the start of each player turn.
    pub fn run<F>(&mut self, start: i64, tick_ms: i64, mut choose: F) -> BattleReport
    where
        F: FnMut(&Battle) -> PlayerAction,
    {
        let mut now = start;
        if self.state == BattleState::NotStarted && self.start(now).is_err() {
            return self.report();
        }
        while !self.state.is_terminal() {
            if self.is_player_turn() && self.queued.is_none() {
                let action = choose(self);
                self.queue_action(action);
            }
            match self.tick(now) {
                Ok(TickOutcome::Waiting { resume_at }) => now = resume_at,
                Ok(_) => now += tick_ms.max(1),
                Err(_) => break,
            }
        }
        self.report()
    }

    pub fn report(&self) -> BattleReport {
        BattleReport {
            outcome: self.state,
            turns: self.turn,
            stages_cleared: self.stages_cleared,
            surviving_health_ratio: self.player.health_ratio(),
            messages: self.log.messages().to_vec(),
            rewards: self.rewards.clone(),
        }
    }

    fn all_monsters_dead(&self) -> bool {
        self.monsters.iter().all(Combatant::is_dead)
    }

    fn first_living_monster(&self) -> Option<usize> {
        self.monsters.iter().position(|m| !m.is_dead())
    }

    fn next_monster_phase(&self, from: usize) -> Phase {
        (from..self.monsters.len())
            .find(|&i| !self.monsters[i].is_dead())
            .map_or(Phase::Player, Phase::Monster)
    }

    fn spawn_next_stage(&mut self, now: i64) -> bool {
        let Some(stage) = self.pending_stages.pop_front() else {
            return false;
        };
        if self.stages_cleared > 0 {
            self.stage_index += 1;
        }
        self.monsters = stage
            .into_iter()
            .map(|mut m| {
                m.stats = m.stats.with_full_health();
                m
            })
            .collect();
        self.defeated = vec![false; self.monsters.len()];
        self.phase = Phase::Player;
        let names: Vec<&str> = self.monsters.iter().map(|m| m.name.as_str()).collect();
        self.log.push(
            MessageType::Normal,
            format!("Stage {}: {} appear", self.stage_index + 1, names.join(", ")),
            now,
            self.turn,
        );
        debug!(stage = self.stage_index, monsters = self.monsters.len(), "stage spawned");
        true
    }

    fn clear_stage(&mut self, now: i64) -> TickOutcome {
        self.stages_cleared += 1;
        if self.pending_stages.is_empty() {
            self.finish(BattleState::Victory, now);
            return TickOutcome::Finished(self.state);
        }
        let resume_at = now + self.ctx.constants.stage_delay_ms.max(0);
        self.log.push(
            MessageType::Normal,
            format!("Stage {} cleared", self.stage_index + 1),
            now,
            self.turn,
        );
        info!(stage = self.stage_index, resume_at, "stage cleared");
        self.phase = Phase::StageCleared { resume_at };
        TickOutcome::StageCleared
    }

    fn sweep_defeated(&mut self, now: i64) {
        for (index, monster) in self.monsters.iter().enumerate() {
            if monster.is_dead() && !self.defeated[index] {
                self.defeated[index] = true;
                self.earned_experience += monster.experience;
                self.earned_gold += monster.gold;
                self.log.push(
                    MessageType::Normal,
                    format!("{} is defeated", monster.name),
                    now,
                    self.turn,
                );
            }
        }
    }

    fn player_turn(&mut self, now: i64) -> TickOutcome {
        let turn = self.turn;
        let action = self.queued.take().unwrap_or(PlayerAction::Attack);

        if let Some(kind) = self.player.statuses.consume_incapacitation() {
            self.log.push(
                MessageType::Status,
                format!("{} is {} and skips the turn", self.player.name, incapacitated_label(kind)),
                now,
                turn,
            );
            return TickOutcome::PlayerSkipped;
        }

        let Some(target) = self.first_living_monster() else {
            return TickOutcome::PlayerActed;
        };

        match action {
            PlayerAction::Attack => {
                self.player_strike(target, AttackModifiers::default(), None, now);
            }
            PlayerAction::Skill(skill_id) => self.player_skill(&skill_id, target, now),
        }
        TickOutcome::PlayerActed
    }

    fn player_skill(&mut self, issued: &str, target: usize, now: i64) {
        let turn = self.turn;
        let executed = self.substitution.take().unwrap_or_else(|| issued.to_string());
        if executed != issued {
            self.log.push(
                MessageType::Normal,
                format!("Combo follow-up: {issued} becomes {executed}"),
                now,
                turn,
            );
        }

        let mut bonus = ComboBonus::default();
        if let Some(matched) = self.combos.record(issued, now) {
            self.log.push(MessageType::Normal, format!("Combo! {}", matched.name), now, turn);
            match matched.replace_with_skill {
                Some(replacement) => self.substitution = Some(replacement),
                None => bonus = matched.bonus,
            }
        }
        let multiplier = bonus.damage_multiplier.unwrap_or(1.0);

        let Some(skill) = self.ctx.skills.get(&executed).cloned() else {
            warn!(skill_id = %executed, "unknown skill, falling back to basic attack");
            let modifiers = AttackModifiers {
                damage_multiplier: multiplier,
            };
            self.player_strike(target, modifiers, None, now);
            self.apply_combo_extras(&bonus, target, now);
            return;
        };

        match &skill.kind {
            SkillKind::Strike { multiplier: base } => {
                self.player_strike(
                    target,
                    AttackModifiers { damage_multiplier: base * multiplier },
                    Some(&skill.name),
                    now,
                );
            }
            SkillKind::Heal { percent } => {
                let max_health = self.player.stats.max_health as f64;
                let amount = (max_health * percent / 100.0 * multiplier).round() as i64;
                let healed = self.player.heal(amount);
                self.log.push(
                    MessageType::Heal,
                    format!(
                        "{} casts {} and recovers {healed} health",
                        self.player.name, skill.name
                    ),
                    now,
                    turn,
                );
            }
            SkillKind::Buff { status } => {
                self.log.push(
                    MessageType::Status,
                    format!("{} casts {}", self.player.name, skill.name),
                    now,
                    turn,
                );
                self.player_status(status, &skill.name, target, now);
            }
            SkillKind::Afflict { multiplier: base, status } => {
                let outcome = self.player_strike(
                    target,
                    AttackModifiers { damage_multiplier: base * multiplier },
                    Some(&skill.name),
                    now,
                );
                if !outcome.is_miss && !self.monsters[target].is_dead() {
                    self.player_status(status, &skill.name, target, now);
                }
            }
        }
        self.apply_combo_extras(&bonus, target, now);
    }

    fn apply_combo_extras(&mut self, bonus: &ComboBonus, target: usize, now: i64) {
        if bonus.heal_percent > 0.0 {
            let max_health = self.player.stats.max_health as f64;
            let amount = (max_health * bonus.heal_percent / 100.0).round() as i64;
            let healed = self.player.heal(amount);
            self.log.push(
                MessageType::Heal,
                format!("{} recovers {healed} health", self.player.name),
                now,
                self.turn,
            );
        }
        if let Some(status) = &bonus.status {
            if !self.monsters[target].is_dead() || status.target == EffectTarget::Caster {
                self.player_status(status, "combo", target, now);
            }
        }
    }

    fn player_status(&mut self, spec: &StatusEffectSpec, source: &str, target: usize, now: i64) {
        let recipient = match spec.target {
            EffectTarget::Caster => &mut self.player,
            EffectTarget::Opponent => &mut self.monsters[target],
        };
        let outcome = recipient.statuses.apply(spec.instantiate(source), &self.ctx.stacking);
        log_status(&mut self.log, &recipient.name, spec.kind, outcome, now, self.turn);
    }

    fn player_strike(
        &mut self,
        target: usize,
        modifiers: AttackModifiers,
        skill: Option<&str>,
        now: i64,
    ) -> AttackOutcome {
        let turn = self.turn;
        let attacker = self.player.effective_stats();
        let defender = self.monsters[target].effective_stats();
        let outcome = resolve_attack(
            &attacker,
            &self.player.statuses,
            &defender,
            &self.ctx.constants,
            modifiers,
            &mut self.rng,
        );

        let monster = &mut self.monsters[target];
        let dealt = if outcome.is_miss { 0 } else { monster.take_damage(outcome.final_damage) };
        log_attack(
            &mut self.log,
            &self.player.name,
            &monster.name,
            skill,
            outcome,
            dealt,
            now,
            turn,
        );

        if outcome.life_steal_heal > 0 {
            let healed = self.player.heal(outcome.life_steal_heal);
            if healed > 0 {
                self.log.push(
                    MessageType::Heal,
                    format!("{} drains {healed} health", self.player.name),
                    now,
                    turn,
                );
            }
        }

        if !outcome.is_miss && !monster.is_dead() {
            fire_abilities(
                AbilityTrigger::OnHit,
                monster,
                &mut self.player,
                &self.ctx,
                &mut self.rng,
                &mut self.log,
                now,
                turn,
            );
            if !monster.is_dead() {
                fire_abilities(
                    AbilityTrigger::OnBelowHalfHp,
                    monster,
                    &mut self.player,
                    &self.ctx,
                    &mut self.rng,
                    &mut self.log,
                    now,
                    turn,
                );
            }
        }
        outcome
    }

    fn monster_turn(&mut self, index: usize, now: i64) -> TickOutcome {
        let turn = self.turn;
        let monster = &mut self.monsters[index];
        let player = &mut self.player;

        if monster.is_dead() {
            return TickOutcome::MonsterSkipped(index);
        }
        if let Some(kind) = monster.statuses.consume_incapacitation() {
            self.log.push(
                MessageType::Status,
                format!("{} is {} and skips the turn", monster.name, incapacitated_label(kind)),
                now,
                turn,
            );
            return TickOutcome::MonsterSkipped(index);
        }

        fire_abilities(
            AbilityTrigger::OnTurnStart,
            monster,
            player,
            &self.ctx,
            &mut self.rng,
            &mut self.log,
            now,
            turn,
        );
        if player.is_dead() || monster.is_dead() {
            return TickOutcome::MonsterActed(index);
        }

        fire_abilities(
            AbilityTrigger::OnAttack,
            monster,
            player,
            &self.ctx,
            &mut self.rng,
            &mut self.log,
            now,
            turn,
        );
        if player.is_dead() {
            return TickOutcome::MonsterActed(index);
        }

        let attacker = monster.effective_stats();
        let defender = player.effective_stats();
        let outcome = resolve_attack(
            &attacker,
            &monster.statuses,
            &defender,
            &self.ctx.constants,
            AttackModifiers::default(),
            &mut self.rng,
        );
        let dealt = if outcome.is_miss { 0 } else { player.take_damage(outcome.final_damage) };
        log_attack(&mut self.log, &monster.name, &player.name, None, outcome, dealt, now, turn);
        if outcome.life_steal_heal > 0 {
            let healed = monster.heal(outcome.life_steal_heal);
            if healed > 0 {
                self.log.push(
                    MessageType::Heal,
                    format!("{} drains {healed} health", monster.name),
                    now,
                    turn,
                );
            }
        }
        if player.is_dead() {
            return TickOutcome::MonsterActed(index);
        }

        fire_abilities(
            AbilityTrigger::OnTurnEnd,
            monster,
            player,
            &self.ctx,
            &mut self.rng,
            &mut self.log,
            now,
            turn,
        );
        TickOutcome::MonsterActed(index)
    }

    fn end_round(&mut self, now: i64) {
        let turn = self.turn;
        tick_statuses(&mut self.player, &mut self.log, now, turn);
        for monster in self.monsters.iter_mut().filter(|m| !m.is_dead()) {
            let took_damage = tick_statuses(monster, &mut self.log, now, turn);
            tick_cooldowns(&mut monster.abilities);
            if took_damage && !monster.is_dead() && !self.player.is_dead() {
                fire_abilities(
                    AbilityTrigger::OnBelowHalfHp,
                    monster,
                    &mut self.player,
                    &self.ctx,
                    &mut self.rng,
                    &mut self.log,
                    now,
                    turn,
                );
            }
        }
        self.turn += 1;
        debug!(turn = self.turn, player_health = self.player.stats.current_health, "round ended");
    }

    fn finish(&mut self, state: BattleState, now: i64) {
        self.state = state;
        match state {
            BattleState::Victory => {
                let rewards = self.compute_rewards();
                self.log.push(
                    MessageType::End,
                    format!(
                        "Victory! {} experience and {} gold earned",
                        rewards.experience, rewards.gold
                    ),
                    now,
                    self.turn,
                );
                info!(
                    turns = self.turn,
                    experience = rewards.experience,
                    gold = rewards.gold,
                    items = rewards.items.len(),
                    "battle won"
                );
                self.rewards = Some(rewards);
            }
            BattleState::Defeat => {
                self.log.push(
                    MessageType::End,
                    format!("{} has fallen", self.player.name),
                    now,
                    self.turn,
                );
                info!(turns = self.turn, stage = self.stage_index, "battle lost");
            }
            BattleState::NotStarted | BattleState::InProgress => {}
        }
    }

    fn compute_rewards(&mut self) -> BattleRewards {
        let Some(plan) = &self.reward_plan else {
            return BattleRewards {
                experience: self.earned_experience,
                gold: self.earned_gold,
                ..BattleRewards::default()
            };
        };
        let scale = plan.difficulty.reward_scale();
        let mut gold = (self.earned_gold as f64 * scale).round() as u64;
        if plan.is_first_clear {
            gold += plan.first_clear_bonus_gold;
        }
        let items = calculate_drops(
            &plan.drops,
            plan.is_first_clear,
            plan.difficulty.drop_rate_scale(),
            &mut self.rng,
        );
        let mut equipment = Vec::new();
        if self.rng.chance(plan.equipment_drop_chance) {
            let last = ItemType::ALL.len() as i64 - 1;
            let item_type = ItemType::ALL[self.rng.range_inclusive(0, last) as usize];
            equipment.push(generate_random_item(
                &plan.rarities,
                item_type,
                plan.player_level,
                &mut self.rng,
            ));
        }
        debug!(dungeon = %plan.dungeon_id, first_clear = plan.is_first_clear, "rewards computed");
        BattleRewards {
            experience: (self.earned_experience as f64 * scale).round() as u64,
            gold,
            items,
            equipment,
        }
    }
}

fn incapacitated_label(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Freeze => "frozen",
        _ => "stunned",
    }
}

/// Rolls `caster`'s abilities for `trigger` and resolves their effects against `opponent`.
#[allow(clippy::too_many_arguments)]
fn fire_abilities(
    trigger: AbilityTrigger,
    caster: &mut Combatant,
    opponent: &mut Combatant,
    ctx: &BattleContext,
    rng: &mut Rng,
    log: &mut BattleLog,
    now: i64,
    turn: u32,
) {
    if caster.abilities.is_empty() {
        return;
    }
    let ratio = caster.health_ratio();
    let fired = triggered_abilities(&mut caster.abilities, &ctx.abilities, trigger, ratio, rng);
    for ability in fired {
        log.push(
            MessageType::Status,
            format!("{} uses {}", caster.name, ability.name),
            now,
            turn,
        );
        for effect in &ability.effects {
            let caster_name = caster.name.clone();
            let opponent_name = opponent.name.clone();
            let outcome = apply_effect(effect, &ability.name, caster, opponent, &ctx.stacking);
            let name_of = |target: EffectTarget| match target {
                EffectTarget::Caster => caster_name.as_str(),
                EffectTarget::Opponent => opponent_name.as_str(),
            };
            match outcome {
                EffectOutcome::Damaged { target, amount } => log.push(
                    MessageType::Damage,
                    format!("{} takes {amount} damage from {}", name_of(target), ability.name),
                    now,
                    turn,
                ),
                EffectOutcome::Healed { target, amount } => log.push(
                    MessageType::Heal,
                    format!("{} recovers {amount} health", name_of(target)),
                    now,
                    turn,
                ),
                EffectOutcome::StatusApplied { target, kind, outcome } => {
                    log_status(log, name_of(target), kind, outcome, now, turn)
                }
            }
            if caster.is_dead() || opponent.is_dead() {
                return;
            }
        }
    }
}

fn log_status(
    log: &mut BattleLog,
    name: &str,
    kind: StatusKind,
    outcome: ApplyOutcome,
    now: i64,
    turn: u32,
) {
    let text = match outcome {
        ApplyOutcome::Added => format!("{name} is afflicted with {}", kind.label()),
        ApplyOutcome::Refreshed => format!("{} on {name} is refreshed", kind.label()),
        ApplyOutcome::Ignored => return,
    };
    log.push(MessageType::Status, text, now, turn);
}

#[allow(clippy::too_many_arguments)]
fn log_attack(
    log: &mut BattleLog,
    attacker: &str,
    defender: &str,
    skill: Option<&str>,
    outcome: AttackOutcome,
    dealt: i64,
    now: i64,
    turn: u32,
) {
    let using = skill.map(|s| format!(" with {s}")).unwrap_or_default();
    if outcome.is_miss {
        log.push(
            MessageType::Miss,
            format!("{defender} evades {attacker}'s attack{using}"),
            now,
            turn,
        );
        return;
    }
    let strong = if outcome.is_strong { "Strong attack! " } else { "" };
    let (message_type, prefix) = if outcome.is_critical {
        (MessageType::Critical, "Critical! ")
    } else {
        (MessageType::Damage, "")
    };
    log.push(
        message_type,
        format!("{prefix}{strong}{attacker} hits {defender}{using} for {dealt} damage"),
        now,
        turn,
    );
}

/// Round-end tick for one combatant. Returns whether periodic damage landed.
fn tick_statuses(combatant: &mut Combatant, log: &mut BattleLog, now: i64, turn: u32) -> bool {
    let report = combatant.statuses.end_of_round();
    let mut took_damage = false;
    for (kind, amount) in &report.damage_sources {
        let dealt = combatant.take_damage(*amount);
        if dealt > 0 {
            took_damage = true;
            log.push(
                MessageType::Damage,
                format!("{} takes {dealt} {} damage", combatant.name, kind.label()),
                now,
                turn,
            );
        }
    }
    for kind in &report.expired {
        log.push(
            MessageType::Status,
            format!("{} on {} wears off", kind.label(), combatant.name),
            now,
            turn,
        );
    }
    took_damage
}
