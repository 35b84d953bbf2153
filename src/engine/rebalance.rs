//! Epoch close: the only place where liquidity, fees and the epoch move together.

use super::core::Vault;
use super::results::{rejected, RebalanceResult, VaultError};
use crate::auth::{Role, RoleResolver};
use crate::events::{EventPayload, RebalancedEvent};
use crate::safe::Safe;
use crate::types::{Address, SignedAmount};

impl<R: RoleResolver, S: Safe> Vault<R, S> {
    /// Close the current epoch.
    ///
    /// Requires the strategy as caller, an ended epoch and no open positions.
    /// The net result is the safe's held balance against the total before,
    /// observed here rather than reported by the caller. Maintenance is charged
    /// for every whole epoch being closed, so a late rebalance pays for the
    /// epochs it skipped. Everything is computed before anything is written.
    pub fn rebalance(&mut self, caller: Address) -> Result<RebalanceResult, VaultError> {
        const OP: &str = "rebalance";
        self.require(OP, Role::Strategy, caller)?;

        let now = self.current_time;
        if !self.clock.is_epoch_ended(now) {
            return Err(rejected(
                OP,
                VaultError::InvalidPhase {
                    operation: OP,
                    phase: self.clock.current_phase(now),
                    epoch_end: self.clock.epoch_end(),
                },
            ));
        }

        let open = self.ledger.open_position_count();
        if open > 0 {
            return Err(rejected(OP, VaultError::PositionsStillOpen { count: open }));
        }

        let total_before = self.ledger.total();
        let held = self.held_liquidity();
        let net_change = SignedAmount::diff(held, total_before)
            .ok_or_else(|| rejected(OP, VaultError::ArithmeticOverflow("net asset change")))?;

        let elapsed = self
            .clock
            .next_epoch_start(now)
            .seconds_since(self.clock.epoch_start());

        let fees = self
            .fees
            .compute_rebalance_fees(total_before, net_change, elapsed)
            .map_err(|e| rejected(OP, e))?
            .capped_at(held);
        let charged = fees
            .total()
            .ok_or_else(|| rejected(OP, VaultError::ArithmeticOverflow("rebalance fees")))?;
        let new_total = held
            .checked_sub(charged)
            .ok_or_else(|| rejected(OP, VaultError::ArithmeticOverflow("new total liquidity")))?;

        // commit. accrue is the only fallible step so it goes first.
        self.fees.accrue(charged).map_err(|e| rejected(OP, e))?;
        self.ledger.settle(new_total);
        let epochs_closed = self.clock.advance(now);

        let result = RebalanceResult {
            epoch_index: self.clock.completed_epochs(),
            epochs_closed,
            total_before,
            net_change,
            profit_fee: fees.profit_fee,
            maintenance_fee: fees.maintenance_fee,
            new_total,
            next_epoch_end: self.clock.epoch_end(),
        };

        tracing::info!(
            epoch = result.epoch_index,
            epochs_closed,
            total_before = %total_before,
            net_change = %net_change,
            profit_fee = %fees.profit_fee,
            maintenance_fee = %fees.maintenance_fee,
            new_total = %new_total,
            "epoch rebalanced"
        );

        self.emit_event(EventPayload::Rebalanced(RebalancedEvent {
            epoch_index: result.epoch_index,
            epochs_closed,
            total_before,
            net_change,
            profit_fee: fees.profit_fee,
            maintenance_fee: fees.maintenance_fee,
            new_total,
            next_epoch_end: result.next_epoch_end,
        }));

        Ok(result)
    }
}
