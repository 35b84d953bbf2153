// 9.0 safe.rs: custodian of the underlying asset. the engine only reads its balance
// and asks it to pay out collected fees. InMemorySafe is MOCKED: no real token transfers.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SafeError {
    #[error("Safe balance too low: requested {requested}, balance {balance}")]
    InsufficientBalance { requested: Amount, balance: Amount },

    #[error("Safe balance overflow")]
    Overflow,
}

/// Holder of the underlying asset.
pub trait Safe {
    fn address(&self) -> Address;

    // current balance of the underlying held by the safe
    fn balance(&self) -> Amount;

    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), SafeError>;
}

// A completed movement of funds, kept for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeTransfer {
    Inflow { amount: Amount },
    Outflow { to: Address, amount: Amount },
}

// Balance-only safe. Strategy, staking and fee flows move through here in tests
// and in the simulation.
#[derive(Debug, Clone)]
pub struct InMemorySafe {
    address: Address,
    balance: Amount,
    history: Vec<SafeTransfer>,
}

impl InMemorySafe {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: Amount::ZERO,
            history: Vec::new(),
        }
    }

    // funds arriving: deposits, premiums, returned liquidity
    pub fn receive(&mut self, amount: Amount) -> Result<(), SafeError> {
        self.balance = self.balance.checked_add(amount).ok_or(SafeError::Overflow)?;
        self.history.push(SafeTransfer::Inflow { amount });
        Ok(())
    }

    pub fn history(&self) -> &[SafeTransfer] {
        &self.history
    }

    // total paid out to one address
    pub fn paid_to(&self, to: Address) -> Amount {
        self.history
            .iter()
            .filter_map(|t| match t {
                SafeTransfer::Outflow { to: dest, amount } if *dest == to => Some(*amount),
                _ => None,
            })
            .fold(Amount::ZERO, |acc, a| acc.checked_add(a).unwrap_or(acc))
    }
}

impl Safe for InMemorySafe {
    fn address(&self) -> Address {
        self.address
    }

    fn balance(&self) -> Amount {
        self.balance
    }

    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), SafeError> {
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(SafeError::InsufficientBalance {
                requested: amount,
                balance: self.balance,
            })?;
        self.balance = remaining;
        self.history.push(SafeTransfer::Outflow { to, amount });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_and_transfer() {
        let mut safe = InMemorySafe::new(Address(1));
        safe.receive(Amount::from_units(200)).unwrap();
        safe.transfer(Address(5), Amount::from_units(20)).unwrap();

        assert_eq!(safe.balance(), Amount::from_units(180));
        assert_eq!(safe.paid_to(Address(5)), Amount::from_units(20));
        assert_eq!(safe.history().len(), 2);
    }

    #[test]
    fn test_overdraw_rejected() {
        let mut safe = InMemorySafe::new(Address(1));
        safe.receive(Amount::from_units(10)).unwrap();

        let result = safe.transfer(Address(5), Amount::from_units(11));
        assert!(matches!(result, Err(SafeError::InsufficientBalance { .. })));
        assert_eq!(safe.balance(), Amount::from_units(10));
        assert_eq!(safe.history().len(), 1);
    }
}
