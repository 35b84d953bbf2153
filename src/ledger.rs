// 3.0: liquidity ledger. total / utilized / available counters and the open position set.
// the ledger never reads balances itself: the vault hands it the held amount it observed.

use crate::types::{Amount, PositionId, Ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Position {0} is already open")]
    DuplicatePosition(PositionId),

    #[error("Position {0} is not open")]
    UnknownPosition(PositionId),

    #[error("Liquidity underflow: requested {requested}, available {available}")]
    Underflow { requested: Amount, available: Amount },

    #[error("Liquidity overflow")]
    Overflow,
}

/// Liquidity counters for one vault.
///
/// `available` is the snapshot of funds the safe holds net of uncollected
/// fees. Utilized liquidity is derived as `total - available`, saturating at
/// zero, so it can never exceed `total`. When premiums come back faster than
/// liquidity went out, `available` runs ahead of `total` until the next
/// settle realizes the surplus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLedger {
    total: Amount,
    available: Amount,
    positions: BTreeSet<PositionId>,
}

impl LiquidityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn available(&self) -> Amount {
        self.available
    }

    pub fn utilized(&self) -> Amount {
        self.total.saturating_sub(self.available)
    }

    // utilized / total, zero on an empty vault
    pub fn utilization_ratio(&self) -> Ratio {
        Ratio::of(self.utilized(), self.total).unwrap_or(Ratio::ONE)
    }

    pub fn has_position(&self, id: PositionId) -> bool {
        self.positions.contains(&id)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &PositionId> {
        self.positions.iter()
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    // 3.1: deposits and withdrawals. funds move together with the counter.
    pub fn change_total(&mut self, amount: Amount, is_increase: bool) -> Result<(), LedgerError> {
        if is_increase {
            let total = self.total.checked_add(amount).ok_or(LedgerError::Overflow)?;
            let available = self.available.checked_add(amount).ok_or(LedgerError::Overflow)?;
            self.total = total;
            self.available = available;
            return Ok(());
        }

        // liquidity out on loan cannot be withdrawn
        let withdrawable = self.total.min(self.available);
        if amount > withdrawable {
            return Err(LedgerError::Underflow {
                requested: amount,
                available: withdrawable,
            });
        }
        self.total = self.total.saturating_sub(amount);
        self.available = self.available.saturating_sub(amount);
        Ok(())
    }

    // 3.2: position bookkeeping. `held` is what the safe holds right now, net of fees.
    pub fn open_position(&mut self, id: PositionId, held: Amount) -> Result<(), LedgerError> {
        if !self.positions.insert(id) {
            return Err(LedgerError::DuplicatePosition(id));
        }
        self.available = held;
        Ok(())
    }

    pub fn close_position(&mut self, id: PositionId, held: Amount) -> Result<(), LedgerError> {
        if !self.positions.remove(&id) {
            return Err(LedgerError::UnknownPosition(id));
        }
        self.available = held;
        Ok(())
    }

    // 3.3: epoch close. everything held is idle again and becomes the new total.
    pub fn settle(&mut self, new_total: Amount) {
        self.total = new_total;
        self.available = new_total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn units(n: u64) -> Amount {
        Amount::from_units(n)
    }

    #[test]
    fn empty_ledger() {
        let ledger = LiquidityLedger::new();
        assert_eq!(ledger.total(), Amount::ZERO);
        assert_eq!(ledger.utilized(), Amount::ZERO);
        assert_eq!(ledger.available(), Amount::ZERO);
        assert_eq!(ledger.utilization_ratio(), Ratio::ZERO);
        assert!(!ledger.has_position(PositionId(1)));
    }

    #[test]
    fn deposit_then_withdraw() {
        let mut ledger = LiquidityLedger::new();
        ledger.change_total(units(200), true).unwrap();
        ledger.change_total(units(100), false).unwrap();

        assert_eq!(ledger.total(), units(100));
        assert_eq!(ledger.available(), units(100));
        assert_eq!(ledger.utilized(), Amount::ZERO);
    }

    #[test]
    fn withdraw_more_than_total_underflows() {
        let mut ledger = LiquidityLedger::new();
        ledger.change_total(units(50), true).unwrap();

        let err = ledger.change_total(units(51), false).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Underflow {
                requested: units(51),
                available: units(50)
            }
        );
        assert_eq!(ledger.total(), units(50));
    }

    #[test]
    fn withdraw_of_lent_liquidity_underflows() {
        let mut ledger = LiquidityLedger::new();
        ledger.change_total(units(100), true).unwrap();
        ledger.open_position(PositionId(7), units(80)).unwrap();

        let result = ledger.change_total(units(90), false);
        assert!(matches!(result, Err(LedgerError::Underflow { .. })));

        ledger.change_total(units(80), false).unwrap();
        assert_eq!(ledger.total(), units(20));
        assert_eq!(ledger.utilized(), units(20));
        assert_eq!(ledger.available(), Amount::ZERO);
    }

    #[test]
    fn open_position_snapshots_held_liquidity() {
        let mut ledger = LiquidityLedger::new();
        ledger.change_total(units(100), true).unwrap();

        // 20 went to the strategy, 10 came back as premium
        ledger.open_position(PositionId(1), units(90)).unwrap();
        assert!(ledger.has_position(PositionId(1)));
        assert_eq!(ledger.utilized(), units(10));
        assert_eq!(ledger.available(), units(90));
        assert_eq!(ledger.utilization_ratio().to_decimal().unwrap(), dec!(0.1));

        // the remaining 20 returns
        ledger.close_position(PositionId(1), units(110)).unwrap();
        assert!(!ledger.has_position(PositionId(1)));
        assert_eq!(ledger.utilized(), Amount::ZERO);
        assert_eq!(ledger.available(), units(110));
        assert_eq!(ledger.total(), units(100));
    }

    #[test]
    fn duplicate_and_unknown_positions() {
        let mut ledger = LiquidityLedger::new();
        ledger.open_position(PositionId(1), Amount::ZERO).unwrap();

        assert_eq!(
            ledger.open_position(PositionId(1), Amount::ZERO),
            Err(LedgerError::DuplicatePosition(PositionId(1)))
        );
        assert_eq!(
            ledger.close_position(PositionId(2), Amount::ZERO),
            Err(LedgerError::UnknownPosition(PositionId(2)))
        );
        assert_eq!(ledger.open_position_count(), 1);
    }

    #[test]
    fn settle_realizes_surplus() {
        let mut ledger = LiquidityLedger::new();
        ledger.change_total(units(100), true).unwrap();
        ledger.open_position(PositionId(1), units(90)).unwrap();
        ledger.close_position(PositionId(1), units(110)).unwrap();

        ledger.settle(units(108));
        assert_eq!(ledger.total(), units(108));
        assert_eq!(ledger.available(), units(108));
        assert_eq!(ledger.utilized(), Amount::ZERO);
    }
}
