//! Authorization gate.
//!
//! The vault never decides who a collaborator is. It asks a [`RoleResolver`]
//! injected at construction and compares the answer with the caller.

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Owning authority, sets fee parameters.
    Owner,
    /// Custodian of the underlying asset.
    Safe,
    /// Deposit/withdraw bookkeeping, sole caller of liquidity changes.
    Staking,
    /// Trades with vault liquidity, opens/closes positions and rebalances.
    Strategy,
    /// Receives collected fees. Set on the vault, not in the registry.
    FeeCollector,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::Safe => "safe",
            Role::Staking => "staking",
            Role::Strategy => "strategy",
            Role::FeeCollector => "fee collector",
        };
        write!(f, "{}", name)
    }
}

/// Resolves a role to the identity currently holding it.
pub trait RoleResolver {
    fn resolve(&self, role: Role) -> Option<Address>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{caller} is not the {role}")]
pub struct Unauthorized {
    pub role: Role,
    pub caller: Address,
}

/// Fails unless `caller` is exactly the identity `expected` for `role`.
/// An unassigned role admits nobody.
pub fn authorize(expected: Option<Address>, role: Role, caller: Address) -> Result<(), Unauthorized> {
    match expected {
        Some(holder) if holder == caller => Ok(()),
        _ => Err(Unauthorized { role, caller }),
    }
}

/// In-memory registry. Stands in for the on-chain registry in the
/// simulation binary and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    roles: HashMap<Role, Address>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: Role, holder: Address) -> Self {
        self.roles.insert(role, holder);
        self
    }

    pub fn set_role(&mut self, role: Role, holder: Address) -> Option<Address> {
        self.roles.insert(role, holder)
    }

    pub fn revoke(&mut self, role: Role) -> Option<Address> {
        self.roles.remove(&role)
    }
}

impl RoleResolver for StaticRegistry {
    fn resolve(&self, role: Role) -> Option<Address> {
        self.roles.get(&role).copied()
    }
}
