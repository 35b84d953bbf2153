// 8.0: vault engine. owns the clock, ledger, fee engine and the injected collaborators.
// every entry point is gated, validates first and commits last. no external I/O.

mod config;
mod core;
mod fees;
mod liquidity;
mod positions;
mod rebalance;
mod results;

pub use config::EngineConfig;
pub use self::core::Vault;
pub use results::{FeeCollection, RebalanceResult, VaultError};
