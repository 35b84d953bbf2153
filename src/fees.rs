// 4.0: fee engine. profit fee and time-prorated maintenance fee at rebalance,
// the rage-quit quote for early exits, and the pot of uncollected fees.
// every formula truncates toward zero once, on the exact product. never rounds up.

use crate::types::{mul_div_floor, Address, Amount, Ratio, SignedAmount, SECONDS_PER_YEAR, WAD};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("Fee arithmetic overflow")]
    Overflow,
}

/// Fee rates. No upper bound is enforced; callers clamp if they need a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// share of a positive epoch result taken at rebalance
    pub immediate_profit_fee: Ratio,
    /// charged on principal, prorated by elapsed time over a 360-day year
    pub annual_maintenance_fee: Ratio,
    /// expected epoch profit, only used to quote the rage-quit fee
    pub benchmark_profit: Ratio,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            immediate_profit_fee: Ratio::from_raw(WAD / 10), // 10%
            annual_maintenance_fee: Ratio::from_raw(WAD / 50), // 2%
            benchmark_profit: Ratio::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceFees {
    pub profit_fee: Amount,
    pub maintenance_fee: Amount,
}

impl RebalanceFees {
    pub fn total(&self) -> Option<Amount> {
        self.profit_fee.checked_add(self.maintenance_fee)
    }

    /// Never charge more than `limit`. Maintenance gives way first since the
    /// profit fee is bounded by the gain, which is itself part of `limit`.
    pub fn capped_at(self, limit: Amount) -> Self {
        let profit_fee = self.profit_fee.min(limit);
        let maintenance_fee = self.maintenance_fee.min(limit.saturating_sub(profit_fee));
        Self {
            profit_fee,
            maintenance_fee,
        }
    }
}

// 4.1: max(net, 0) * rate
pub fn calculate_profit_fee(net_change: SignedAmount, rate: Ratio) -> Result<Amount, FeeError> {
    net_change.gain().mul_ratio(rate).ok_or(FeeError::Overflow)
}

// 4.2: principal * annual_rate * elapsed / year. accrues on flat and losing epochs too.
pub fn calculate_maintenance_fee(
    principal: Amount,
    annual_rate: Ratio,
    elapsed_secs: u64,
) -> Result<Amount, FeeError> {
    mul_div_floor(
        &[principal.raw(), annual_rate.raw(), elapsed_secs as u128],
        SECONDS_PER_YEAR as u128 * WAD,
    )
    .map(Amount::from_raw)
    .ok_or(FeeError::Overflow)
}

// annual rate scaled down to one epoch
pub fn maintenance_rate_per_epoch(annual_rate: Ratio, epoch_length_secs: u64) -> Result<Ratio, FeeError> {
    mul_div_floor(&[annual_rate.raw(), epoch_length_secs as u128], SECONDS_PER_YEAR as u128)
        .map(Ratio::from_raw)
        .ok_or(FeeError::Overflow)
}

// 4.3: rates plus the uncollected pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEngine {
    schedule: FeeSchedule,
    accumulated: Amount,
    collector: Option<Address>,
}

impl FeeEngine {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self {
            schedule,
            accumulated: Amount::ZERO,
            collector: None,
        }
    }

    pub fn schedule(&self) -> FeeSchedule {
        self.schedule
    }

    pub fn immediate_profit_fee(&self) -> Ratio {
        self.schedule.immediate_profit_fee
    }

    pub fn annual_maintenance_fee(&self) -> Ratio {
        self.schedule.annual_maintenance_fee
    }

    pub fn benchmark_profit(&self) -> Ratio {
        self.schedule.benchmark_profit
    }

    pub fn accumulated(&self) -> Amount {
        self.accumulated
    }

    pub fn collector(&self) -> Option<Address> {
        self.collector
    }

    pub fn compute_rebalance_fees(
        &self,
        total_before: Amount,
        net_change: SignedAmount,
        elapsed_secs: u64,
    ) -> Result<RebalanceFees, FeeError> {
        Ok(RebalanceFees {
            profit_fee: calculate_profit_fee(net_change, self.schedule.immediate_profit_fee)?,
            maintenance_fee: calculate_maintenance_fee(
                total_before,
                self.schedule.annual_maintenance_fee,
                elapsed_secs,
            )?,
        })
    }

    /// Penalty quoted for leaving before settlement:
    /// `principal * (maintenance_per_epoch + benchmark_profit * profit_fee)`.
    pub fn rage_quit_fee(&self, principal: Amount, epoch_length_secs: u64) -> Result<Amount, FeeError> {
        let maintenance = maintenance_rate_per_epoch(self.schedule.annual_maintenance_fee, epoch_length_secs)?;
        let forgone_profit = mul_div_floor(
            &[self.schedule.benchmark_profit.raw(), self.schedule.immediate_profit_fee.raw()],
            WAD,
        )
        .ok_or(FeeError::Overflow)?;
        let rate = maintenance
            .raw()
            .checked_add(forgone_profit)
            .ok_or(FeeError::Overflow)?;
        principal.mul_ratio(Ratio::from_raw(rate)).ok_or(FeeError::Overflow)
    }

    pub fn accrue(&mut self, amount: Amount) -> Result<(), FeeError> {
        self.accumulated = self.accumulated.checked_add(amount).ok_or(FeeError::Overflow)?;
        Ok(())
    }

    // zero the pot and hand back what it held
    pub fn take_accumulated(&mut self) -> Amount {
        std::mem::take(&mut self.accumulated)
    }

    // setters return the previous value for the audit log
    pub fn set_immediate_profit_fee(&mut self, rate: Ratio) -> Ratio {
        std::mem::replace(&mut self.schedule.immediate_profit_fee, rate)
    }

    pub fn set_annual_maintenance_fee(&mut self, rate: Ratio) -> Ratio {
        std::mem::replace(&mut self.schedule.annual_maintenance_fee, rate)
    }

    pub fn set_benchmark_profit(&mut self, rate: Ratio) -> Ratio {
        std::mem::replace(&mut self.schedule.benchmark_profit, rate)
    }

    pub fn set_collector(&mut self, collector: Address) -> Option<Address> {
        self.collector.replace(collector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WEEK: u64 = 7 * 24 * 3600;

    fn ratio(d: rust_decimal::Decimal) -> Ratio {
        Ratio::from_decimal(d).unwrap()
    }

    #[test]
    fn profitable_week() {
        let engine = FeeEngine::new(FeeSchedule::default());
        let net = SignedAmount::diff(Amount::from_units(110), Amount::from_units(100)).unwrap();

        let fees = engine.compute_rebalance_fees(Amount::from_units(100), net, WEEK).unwrap();
        assert_eq!(fees.profit_fee, Amount::from_units(1));
        assert_eq!(fees.maintenance_fee, Amount::from_raw(38_888_888_888_888_888));
        assert_eq!(fees.total().unwrap().to_decimal().unwrap(), dec!(1.038888888888888888));
    }

    #[test]
    fn losing_epoch_still_pays_maintenance() {
        let engine = FeeEngine::new(FeeSchedule::default());
        let net = SignedAmount::diff(Amount::from_units(90), Amount::from_units(100)).unwrap();

        let fees = engine.compute_rebalance_fees(Amount::from_units(100), net, WEEK).unwrap();
        assert_eq!(fees.profit_fee, Amount::ZERO);
        assert!(fees.maintenance_fee > Amount::ZERO);
    }

    #[test]
    fn maintenance_scales_with_elapsed_time() {
        let one = calculate_maintenance_fee(Amount::from_units(360), ratio(dec!(0.1)), 24 * 3600).unwrap();
        // 360 * 10% / 360 days = 0.1 per day
        assert_eq!(one.to_decimal().unwrap(), dec!(0.1));

        let zero = calculate_maintenance_fee(Amount::from_units(360), ratio(dec!(0.1)), 0).unwrap();
        assert_eq!(zero, Amount::ZERO);
    }

    #[test]
    fn rounding_truncates() {
        // 1 raw unit * 10% truncates to nothing
        let fee = calculate_profit_fee(SignedAmount::diff(Amount::from_raw(1), Amount::ZERO).unwrap(), ratio(dec!(0.1)))
            .unwrap();
        assert_eq!(fee, Amount::ZERO);
    }

    #[test]
    fn rage_quit_quote() {
        let mut engine = FeeEngine::new(FeeSchedule::default());
        assert_eq!(
            engine.rage_quit_fee(Amount::from_units(1000), WEEK).unwrap(),
            Amount::from_raw(388_888_888_888_888_000)
        );

        engine.set_benchmark_profit(ratio(dec!(0.05)));
        let quote = engine.rage_quit_fee(Amount::from_units(1000), WEEK).unwrap();
        assert_eq!(quote.to_decimal().unwrap(), dec!(5.388888888888888));
    }

    #[test]
    fn cap_prefers_profit_fee() {
        let fees = RebalanceFees {
            profit_fee: Amount::from_units(1),
            maintenance_fee: Amount::from_units(5),
        };
        let capped = fees.capped_at(Amount::from_units(3));
        assert_eq!(capped.profit_fee, Amount::from_units(1));
        assert_eq!(capped.maintenance_fee, Amount::from_units(2));

        let untouched = fees.capped_at(Amount::from_units(100));
        assert_eq!(untouched, fees);
    }

    #[test]
    fn accrue_and_take() {
        let mut engine = FeeEngine::new(FeeSchedule::default());
        engine.accrue(Amount::from_units(2)).unwrap();
        engine.accrue(Amount::from_units(3)).unwrap();
        assert_eq!(engine.accumulated(), Amount::from_units(5));

        assert_eq!(engine.take_accumulated(), Amount::from_units(5));
        assert_eq!(engine.accumulated(), Amount::ZERO);
        assert_eq!(engine.take_accumulated(), Amount::ZERO);

        engine.accrue(Amount::from_raw(u128::MAX)).unwrap();
        assert_eq!(engine.accrue(Amount::from_raw(1)), Err(FeeError::Overflow));
    }

    #[test]
    fn setters_return_previous_values() {
        let mut engine = FeeEngine::new(FeeSchedule::default());
        let old = engine.set_immediate_profit_fee(Ratio::ONE);
        assert_eq!(old, ratio(dec!(0.1)));
        assert_eq!(engine.immediate_profit_fee(), Ratio::ONE);

        // rates above 100% are accepted as given
        engine.set_annual_maintenance_fee(ratio(dec!(2)));
        assert_eq!(engine.annual_maintenance_fee(), ratio(dec!(2)));

        assert_eq!(engine.set_collector(Address(9)), None);
        assert_eq!(engine.set_collector(Address(10)), Some(Address(9)));
        assert_eq!(engine.collector(), Some(Address(10)));
    }
}
