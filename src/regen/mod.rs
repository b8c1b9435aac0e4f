pub mod clock;
pub mod daily;
pub mod energy;
pub mod service;
pub mod tickets;

pub use clock::{
    can_claim, next_streak, offline_recovery, reset_day, time_to_full, time_to_next_regen,
    time_to_reset,
};
pub use daily::{claim_daily_bonus, DailyClaim};
pub use energy::EnergyState;
pub use service::{InMemoryStore, RecordStore, ResourceService};
pub use tickets::TicketState;
