// vault-core: accounting-and-epoch engine for a multi-module liquidity vault.
// exact fixed-point arithmetic, truncation toward zero, no floats.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Address, PositionId, Timestamp, Amount, Ratio
//   2.x  clock.rs: epoch clock: staking -> trading -> settlement
//   3.x  ledger.rs: total / utilized / available liquidity, open positions
//   4.x  fees.rs: profit fee, maintenance fee, rage-quit quote
//   5.x  auth.rs: role resolver and the authorization gate
//   7.x  config.rs: epoch windows, fee rates, presets
//   8.x  engine/: the vault: entry points, rebalance, query surface
//   9.x  safe.rs: custodian interface (mocked in-memory safe)
//   11.x events.rs: committed state changes for audit

// accounting core
pub mod clock;
pub mod engine;
pub mod fees;
pub mod ledger;
pub mod types;

// collaborators and ambient
pub mod auth;
pub mod config;
pub mod events;
pub mod safe;

// re exports for convenience
pub use auth::*;
pub use clock::*;
pub use engine::*;
pub use events::*;
pub use fees::*;
pub use ledger::*;
pub use types::*;
pub use config::{ConfigError, EpochConfig, Environment, FeeConfig, VaultConfig};
pub use safe::{InMemorySafe, Safe, SafeError, SafeTransfer};
