pub mod dungeon;
pub mod loader;
pub mod skills;

pub use dungeon::{Difficulty, DungeonConfig, DungeonProgress, Milestone, MonsterDefinition, Stage};
pub use loader::{DungeonFile, DungeonRegistry};
pub use skills::{default_combos, default_skills, SkillBook, SkillDefinition, SkillKind};
