//! Fee collection and owner-only fee parameters.

use super::core::Vault;
use super::results::{rejected, FeeCollection, VaultError};
use crate::auth::{Role, RoleResolver};
use crate::events::{
    EventPayload, FeeCollectorChangedEvent, FeeParameter, FeeParameterChangedEvent, FeesCollectedEvent,
};
use crate::safe::Safe;
use crate::types::{Address, Amount, Ratio};

impl<R: RoleResolver, S: Safe> Vault<R, S> {
    /// Pay every uncollected fee to the fee collector. Collecting nothing is
    /// a successful no-op. The safe transfer runs before the pot is cleared,
    /// so a failed transfer changes nothing.
    pub fn collect_fees(&mut self, caller: Address) -> Result<FeeCollection, VaultError> {
        const OP: &str = "collect_fees";
        self.require(OP, Role::FeeCollector, caller)?;

        let amount = self.fees.accumulated();
        if amount.is_zero() {
            tracing::debug!(collector = %caller, "no fees to collect");
            return Ok(FeeCollection {
                collector: caller,
                amount: Amount::ZERO,
            });
        }

        self.safe.transfer(caller, amount).map_err(|e| rejected(OP, e))?;
        let amount = self.fees.take_accumulated();

        tracing::info!(collector = %caller, %amount, "fees collected");
        self.emit_event(EventPayload::FeesCollected(FeesCollectedEvent {
            collector: caller,
            amount,
        }));

        Ok(FeeCollection {
            collector: caller,
            amount,
        })
    }

    /// Like [`Vault::collect_fees`] but an empty pot is an error.
    pub fn collect_fees_strict(&mut self, caller: Address) -> Result<FeeCollection, VaultError> {
        const OP: &str = "collect_fees_strict";
        self.require(OP, Role::FeeCollector, caller)?;
        if self.fees.accumulated().is_zero() {
            return Err(rejected(OP, VaultError::NothingToCollect));
        }
        self.collect_fees(caller)
    }

    pub fn set_immediate_profit_fee(&mut self, caller: Address, rate: Ratio) -> Result<(), VaultError> {
        self.require("set_immediate_profit_fee", Role::Owner, caller)?;
        let old_value = self.fees.set_immediate_profit_fee(rate);
        self.record_parameter_change(FeeParameter::ImmediateProfitFee, old_value, rate);
        Ok(())
    }

    pub fn set_annual_maintenance_fee(&mut self, caller: Address, rate: Ratio) -> Result<(), VaultError> {
        self.require("set_annual_maintenance_fee", Role::Owner, caller)?;
        let old_value = self.fees.set_annual_maintenance_fee(rate);
        self.record_parameter_change(FeeParameter::AnnualMaintenanceFee, old_value, rate);
        Ok(())
    }

    pub fn set_benchmark_profit(&mut self, caller: Address, rate: Ratio) -> Result<(), VaultError> {
        self.require("set_benchmark_profit", Role::Owner, caller)?;
        let old_value = self.fees.set_benchmark_profit(rate);
        self.record_parameter_change(FeeParameter::BenchmarkProfit, old_value, rate);
        Ok(())
    }

    pub fn set_fee_collector(&mut self, caller: Address, collector: Address) -> Result<(), VaultError> {
        self.require("set_fee_collector", Role::Owner, caller)?;
        let old_collector = self.fees.set_collector(collector);

        tracing::info!(collector = %collector, "fee collector set");
        self.emit_event(EventPayload::FeeCollectorChanged(FeeCollectorChangedEvent {
            old_collector,
            new_collector: collector,
        }));
        Ok(())
    }

    fn record_parameter_change(&mut self, parameter: FeeParameter, old_value: Ratio, new_value: Ratio) {
        tracing::info!(?parameter, %old_value, %new_value, "fee parameter changed");
        self.emit_event(EventPayload::FeeParameterChanged(FeeParameterChangedEvent {
            parameter,
            old_value,
            new_value,
            changed_by: Role::Owner,
        }));
    }
}
