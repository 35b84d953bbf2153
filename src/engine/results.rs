// 8.0.2: result types and errors for vault operations.

use crate::auth::{Role, Unauthorized};
use crate::clock::Phase;
use crate::config::ConfigError;
use crate::fees::FeeError;
use crate::ledger::LedgerError;
use crate::safe::SafeError;
use crate::types::{Address, Amount, SignedAmount, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceResult {
    pub epoch_index: u64,
    pub epochs_closed: u64,
    pub total_before: Amount,
    pub net_change: SignedAmount,
    pub profit_fee: Amount,
    pub maintenance_fee: Amount,
    pub new_total: Amount,
    pub next_epoch_end: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCollection {
    pub collector: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("Unauthorized: {caller} is not the {role}")]
    Unauthorized { role: Role, caller: Address },

    #[error("{operation} not allowed during {phase} phase (epoch ends {epoch_end})")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
        epoch_end: Timestamp,
    },

    #[error("{count} position(s) still open")]
    PositionsStillOpen { count: usize },

    #[error("No fees to collect")]
    NothingToCollect,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Fee error: {0}")]
    Fee(#[from] FeeError),

    #[error("Safe error: {0}")]
    Safe(#[from] SafeError),

    #[error("Arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),
}

impl From<Unauthorized> for VaultError {
    fn from(err: Unauthorized) -> Self {
        VaultError::Unauthorized {
            role: err.role,
            caller: err.caller,
        }
    }
}

// log and pass through. every rejected call goes through here.
pub(super) fn rejected(operation: &'static str, err: impl Into<VaultError>) -> VaultError {
    let err = err.into();
    tracing::warn!(operation, error = %err, "call rejected");
    err
}
