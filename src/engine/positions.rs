//! Strategy positions. The ledger tracks presence only; what the position
//! did to the vault shows up in the safe's balance.

use super::core::Vault;
use super::results::{rejected, VaultError};
use crate::auth::{Role, RoleResolver};
use crate::clock::Phase;
use crate::events::{EventPayload, PositionEvent};
use crate::safe::Safe;
use crate::types::{Address, PositionId};

impl<R: RoleResolver, S: Safe> Vault<R, S> {
    /// Open or close a strategy position and re-snapshot utilization from the
    /// safe. Opening is refused once the epoch reached settlement since the
    /// position could not be unwound before rebalance; closing always works.
    pub fn change_holding_position(
        &mut self,
        caller: Address,
        position: PositionId,
        is_opening: bool,
    ) -> Result<(), VaultError> {
        const OP: &str = "change_holding_position";
        self.require(OP, Role::Strategy, caller)?;

        let held = self.held_liquidity();

        if is_opening {
            let phase = self.clock.current_phase(self.current_time);
            if phase == Phase::Settlement {
                return Err(rejected(
                    OP,
                    VaultError::InvalidPhase {
                        operation: OP,
                        phase,
                        epoch_end: self.clock.epoch_end(),
                    },
                ));
            }
            self.ledger
                .open_position(position, held)
                .map_err(|e| rejected(OP, e))?;
        } else {
            self.ledger
                .close_position(position, held)
                .map_err(|e| rejected(OP, e))?;
        }

        let event = PositionEvent {
            position,
            utilized: self.ledger.utilized(),
            available: self.ledger.available(),
        };
        tracing::debug!(
            %position,
            is_opening,
            utilized = %event.utilized,
            available = %event.available,
            "holding position changed"
        );

        if is_opening {
            self.emit_event(EventPayload::PositionOpened(event));
        } else {
            self.emit_event(EventPayload::PositionClosed(event));
        }

        Ok(())
    }
}
