//! Deposits and withdrawals reported by the staking collaborator.

use super::core::Vault;
use super::results::{rejected, VaultError};
use crate::auth::{Role, RoleResolver};
use crate::events::{EventPayload, LiquidityChangedEvent};
use crate::safe::Safe;
use crate::types::{Address, Amount};

impl<R: RoleResolver, S: Safe> Vault<R, S> {
    /// Record liquidity entering or leaving the vault. The staking
    /// collaborator moves the funds; the vault only keeps the counters.
    pub fn change_total_liquidity(
        &mut self,
        caller: Address,
        amount: Amount,
        is_increase: bool,
    ) -> Result<(), VaultError> {
        const OP: &str = "change_total_liquidity";
        self.require(OP, Role::Staking, caller)?;

        self.ledger
            .change_total(amount, is_increase)
            .map_err(|e| rejected(OP, e))?;

        let new_total = self.ledger.total();
        tracing::debug!(%amount, is_increase, %new_total, "total liquidity changed");

        self.emit_event(EventPayload::LiquidityChanged(LiquidityChangedEvent {
            amount,
            is_increase,
            new_total,
        }));

        Ok(())
    }
}
