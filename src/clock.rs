// 2.0: epoch clock. pure time-to-phase math plus a counter of completed epochs.
// staking window -> trading window -> settlement. only rebalance moves it forward.

use crate::config::ConfigError;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Epoch durations in seconds. `staking + trading` must fit inside `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochLengths {
    pub epoch: u64,
    pub staking: u64,
    pub trading: u64,
}

impl EpochLengths {
    pub fn new(epoch: u64, staking: u64, trading: u64) -> Result<Self, ConfigError> {
        let lengths = Self {
            epoch,
            staking,
            trading,
        };
        lengths.validate()?;
        Ok(lengths)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epoch == 0 {
            return Err(ConfigError::InvalidEpochLengths {
                reason: "epoch length must be positive".to_string(),
            });
        }
        match self.staking.checked_add(self.trading) {
            Some(windows) if windows <= self.epoch => Ok(()),
            _ => Err(ConfigError::InvalidEpochLengths {
                reason: format!(
                    "staking ({}s) + trading ({}s) exceeds epoch length ({}s)",
                    self.staking, self.trading, self.epoch
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// deposits and withdrawals
    Staking,
    /// strategy holds positions
    Trading,
    /// waiting for the epoch end, then rebalance
    Settlement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Staking => "staking",
            Phase::Trading => "trading",
            Phase::Settlement => "settlement",
        };
        write!(f, "{}", name)
    }
}

// 2.1: the clock itself. epoch_start is always <= the time of the last advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    epoch_start: Timestamp,
    lengths: EpochLengths,
    completed_epochs: u64,
}

impl EpochClock {
    pub fn new(epoch_start: Timestamp, lengths: EpochLengths) -> Result<Self, ConfigError> {
        lengths.validate()?;
        Ok(Self {
            epoch_start,
            lengths,
            completed_epochs: 0,
        })
    }

    pub fn epoch_start(&self) -> Timestamp {
        self.epoch_start
    }

    pub fn lengths(&self) -> EpochLengths {
        self.lengths
    }

    pub fn completed_epochs(&self) -> u64 {
        self.completed_epochs
    }

    pub fn staking_phase_end(&self) -> Timestamp {
        self.epoch_start.plus(self.lengths.staking)
    }

    pub fn trading_phase_end(&self) -> Timestamp {
        self.staking_phase_end().plus(self.lengths.trading)
    }

    pub fn epoch_end(&self) -> Timestamp {
        self.epoch_start.plus(self.lengths.epoch)
    }

    pub fn current_phase(&self, now: Timestamp) -> Phase {
        if now < self.staking_phase_end() {
            Phase::Staking
        } else if now < self.trading_phase_end() {
            Phase::Trading
        } else {
            Phase::Settlement
        }
    }

    pub fn is_staking_phase(&self, now: Timestamp) -> bool {
        self.current_phase(now) == Phase::Staking
    }

    pub fn is_trading_phase(&self, now: Timestamp) -> bool {
        self.current_phase(now) == Phase::Trading
    }

    pub fn is_epoch_ended(&self, now: Timestamp) -> bool {
        now >= self.epoch_end()
    }

    // whole epochs between epoch_start and now. zero before the start.
    fn elapsed_epochs(&self, now: Timestamp) -> u64 {
        now.seconds_since(self.epoch_start) / self.lengths.epoch
    }

    /// Completed epochs since genesis: the stored counter plus whole epochs
    /// that have elapsed since the current start. Never decreases.
    pub fn current_epoch_index(&self, now: Timestamp) -> u64 {
        self.completed_epochs.saturating_add(self.elapsed_epochs(now))
    }

    /// Largest `epoch_start + k * epoch` that is `<= now`.
    pub fn next_epoch_start(&self, now: Timestamp) -> Timestamp {
        let offset = self.elapsed_epochs(now).saturating_mul(self.lengths.epoch);
        self.epoch_start.plus(offset)
    }

    /// Roll the start forward by whole epochs so phase boundaries never drift
    /// on a late rebalance. Returns how many epochs were closed.
    pub fn advance(&mut self, now: Timestamp) -> u64 {
        let closed = self.elapsed_epochs(now);
        self.epoch_start = self.next_epoch_start(now);
        self.completed_epochs = self.completed_epochs.saturating_add(closed);
        closed
    }
}
