// 8.0 engine/core.rs: the vault. holds clock, ledger, fees, collaborators and the event log.

use super::config::EngineConfig;
use super::results::{rejected, VaultError};
use crate::auth::{authorize, Role, RoleResolver};
use crate::clock::{EpochClock, Phase};
use crate::config::VaultConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::fees::FeeEngine;
use crate::ledger::LiquidityLedger;
use crate::safe::Safe;
use crate::types::{Address, Amount, PositionId, Ratio, Timestamp};

/** 8.1: one vault instance. all state lives here, nothing is global */
#[derive(Debug)]
pub struct Vault<R, S> {
    pub(super) config: EngineConfig,
    pub(super) underlying: String,
    pub(super) clock: EpochClock,
    pub(super) ledger: LiquidityLedger,
    pub(super) fees: FeeEngine,
    pub(super) registry: R,
    pub(super) safe: S,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl<R: RoleResolver, S: Safe> Vault<R, S> {
    pub fn new(
        config: EngineConfig,
        vault_config: &VaultConfig,
        epoch_start: Timestamp,
        registry: R,
        safe: S,
    ) -> Result<Self, VaultError> {
        vault_config.validate()?;
        let clock = EpochClock::new(epoch_start, vault_config.epoch_lengths()?)?;
        let fees = FeeEngine::new(vault_config.fee_schedule()?);

        tracing::info!(
            underlying = %vault_config.underlying,
            epoch_start = %epoch_start,
            epoch_end = %clock.epoch_end(),
            "vault initialized"
        );

        Ok(Self {
            config,
            underlying: vault_config.underlying.clone(),
            clock,
            ledger: LiquidityLedger::new(),
            fees,
            registry,
            safe,
            events: Vec::new(),
            next_event_id: 1,
            current_time: epoch_start,
        })
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.current_time = self.current_time.plus(secs);
    }

    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn safe(&self) -> &S {
        &self.safe
    }

    // the safe is an external collaborator: funds move through it directly
    pub fn safe_mut(&mut self) -> &mut S {
        &mut self.safe
    }

    // 8.2: query surface. side-effect free, callable in any phase.

    pub fn total_liquidity(&self) -> Amount {
        self.ledger.total()
    }

    pub fn utilized_liquidity(&self) -> Amount {
        self.ledger.utilized()
    }

    pub fn available_liquidity(&self) -> Amount {
        self.ledger.available()
    }

    pub fn liquidity_utilization_ratio(&self) -> Ratio {
        self.ledger.utilization_ratio()
    }

    pub fn has_position(&self, position: PositionId) -> bool {
        self.ledger.has_position(position)
    }

    pub fn open_position_count(&self) -> usize {
        self.ledger.open_position_count()
    }

    pub fn accumulated_fees(&self) -> Amount {
        self.fees.accumulated()
    }

    pub fn immediate_profit_fee(&self) -> Ratio {
        self.fees.immediate_profit_fee()
    }

    pub fn annual_maintenance_fee(&self) -> Ratio {
        self.fees.annual_maintenance_fee()
    }

    pub fn benchmark_profit(&self) -> Ratio {
        self.fees.benchmark_profit()
    }

    // None until the owner assigns one
    pub fn fee_collector(&self) -> Option<Address> {
        self.fees.collector()
    }

    pub fn current_epoch_start(&self) -> Timestamp {
        self.clock.epoch_start()
    }

    pub fn current_epoch_end(&self) -> Timestamp {
        self.clock.epoch_end()
    }

    pub fn current_phase(&self) -> Phase {
        self.clock.current_phase(self.current_time)
    }

    pub fn current_epoch_index(&self) -> u64 {
        self.clock.current_epoch_index(self.current_time)
    }

    pub fn calculate_rage_quit_fee(&self, principal: Amount) -> Result<Amount, VaultError> {
        Ok(self.fees.rage_quit_fee(principal, self.clock.lengths().epoch)?)
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // fee collector lives on the vault, every other role in the registry
    pub(super) fn resolve(&self, role: Role) -> Option<Address> {
        match role {
            Role::FeeCollector => self.fees.collector(),
            _ => self.registry.resolve(role),
        }
    }

    pub(super) fn require(&self, operation: &'static str, role: Role, caller: Address) -> Result<(), VaultError> {
        authorize(self.resolve(role), role, caller).map_err(|e| rejected(operation, e))
    }

    // what the safe holds for depositors: its balance minus uncollected fees
    pub(super) fn held_liquidity(&self) -> Amount {
        self.safe.balance().saturating_sub(self.fees.accumulated())
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        tracing::debug!(event_id = event.id.0, payload = ?event.payload, "event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
