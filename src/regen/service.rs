//! Host-owned resource service: loads records from a [RecordStore], moves them forward in
//! time, and writes them back.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::config::{EnergyConfig, TicketConfig};
use crate::error::ResourceError;
use crate::regen::daily::{claim_daily_bonus, DailyClaim};
use crate::regen::energy::EnergyState;
use crate::regen::tickets::TicketState;

pub const ENERGY_KEY: &str = "energy";
pub const TICKETS_KEY: &str = "tickets";

/// String key-value persistence supplied by the host.
pub trait RecordStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) {
        self.records.insert(key.to_string(), value);
    }
}

#[derive(Debug)]
pub struct ResourceService<S: RecordStore> {
    store: S,
    energy: EnergyConfig,
    tickets: TicketConfig,
}

impl<S: RecordStore> ResourceService<S> {
    pub fn new(store: S, energy: EnergyConfig, tickets: TicketConfig) -> Self {
        Self {
            store,
            energy,
            tickets,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads a record. Missing or corrupt records come back as `None`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                let err = ResourceError::CorruptRecord {
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "starting a fresh record");
                None
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, record: &T) {
        match serde_json::to_string(record) {
            Ok(raw) => self.store.put(key, raw),
            Err(e) => warn!(key, error = %e, "failed to serialize record"),
        }
    }

    fn synced_energy(&self, now_ms: i64) -> EnergyState {
        match self.load::<EnergyState>(ENERGY_KEY) {
            Some(state) => state.sync(&self.energy, now_ms),
            None => EnergyState::new(&self.energy, now_ms),
        }
    }

    fn synced_tickets(&self, now_ms: i64) -> TicketState {
        match self.load::<TicketState>(TICKETS_KEY) {
            Some(state) => state.sync(&self.tickets, now_ms),
            None => TicketState::new(&self.tickets, now_ms),
        }
    }

    pub fn energy(&mut self, now_ms: i64) -> EnergyState {
        let state = self.synced_energy(now_ms);
        self.save(ENERGY_KEY, &state);
        state
    }

    pub fn spend_energy(&mut self, amount: u32, now_ms: i64) -> Result<EnergyState, ResourceError> {
        let state = self.synced_energy(now_ms).spend(amount, &self.energy, now_ms)?;
        self.save(ENERGY_KEY, &state);
        Ok(state)
    }

    /// Spends the configured per-battle energy cost.
    pub fn spend_battle_energy(&mut self, now_ms: i64) -> Result<EnergyState, ResourceError> {
        self.spend_energy(self.energy.battle_cost, now_ms)
    }

    pub fn tickets(&mut self, now_ms: i64) -> TicketState {
        let state = self.synced_tickets(now_ms);
        self.save(TICKETS_KEY, &state);
        state
    }

    pub fn use_ticket(&mut self, now_ms: i64) -> Result<TicketState, ResourceError> {
        let state = self.synced_tickets(now_ms).use_ticket(&self.tickets, now_ms)?;
        self.save(TICKETS_KEY, &state);
        Ok(state)
    }

    pub fn claim_daily_bonus(&mut self, now_ms: i64) -> Result<DailyClaim, ResourceError> {
        let current = self.synced_energy(now_ms);
        let (state, claim) = claim_daily_bonus(&current, &self.energy, now_ms)?;
        self.save(ENERGY_KEY, &state);
        Ok(claim)
    }

    pub fn time_to_next_regen(&mut self, now_ms: i64) -> i64 {
        self.energy(now_ms).time_to_next_regen(&self.energy, now_ms)
    }

    pub fn time_to_full(&mut self, now_ms: i64) -> i64 {
        self.energy(now_ms).time_to_full(&self.energy, now_ms)
    }

    pub fn time_to_ticket_reset(&self, now_ms: i64) -> i64 {
        TicketState::time_to_reset(&self.tickets, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn service() -> ResourceService<InMemoryStore> {
        ResourceService::new(InMemoryStore::new(), EnergyConfig::default(), TicketConfig::default())
    }

    #[test]
    fn fresh_store_starts_full_and_persists_spend() {
        let mut svc = service();
        assert_eq!(svc.energy(T0).current, 100);
        svc.spend_battle_energy(T0).unwrap();
        assert_eq!(svc.energy(T0 + 1).current, 90);
        assert_eq!(svc.energy(T0 + 300_000).current, 100);
    }

    #[test]
    fn corrupt_record_is_replaced() {
        let mut store = InMemoryStore::new();
        store.put(ENERGY_KEY, "{not json".to_string());
        let mut svc = ResourceService::new(store, EnergyConfig::default(), TicketConfig::default());
        assert_eq!(svc.energy(T0).current, 100);
        assert!(svc.store().get(ENERGY_KEY).unwrap().contains("\"current\":100"));
    }

    #[test]
    fn tickets_run_out() {
        let mut svc = service();
        for _ in 0..5 {
            svc.use_ticket(T0).unwrap();
        }
        assert_eq!(svc.use_ticket(T0).unwrap_err(), ResourceError::NoTickets);
        assert_eq!(svc.tickets(T0).count, 0);
    }
}
