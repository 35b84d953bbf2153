//! Vault accounting simulation.
//!
//! Runs full epochs against an in-memory safe and registry: deposits, a
//! strategy position that earns a premium, rebalance with fees, fee
//! collection, a late rebalance and a losing epoch.
//!
//! Usage: `vault-sim [config.json]`. Logs follow `RUST_LOG` (default `info`).

use std::error::Error;

use tracing_subscriber::EnvFilter;
use vault_core::*;

const SAFE: Address = Address(1);
const STAKING: Address = Address(2);
const STRATEGY: Address = Address(3);
const COLLECTOR: Address = Address(4);
const DEPOSITOR: Address = Address(5);

type SimVault = Vault<StaticRegistry, InMemorySafe>;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => VaultConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => VaultConfig::default(),
    };

    println!("Liquidity Vault Accounting Simulation");
    println!(
        "Underlying {}, epoch {}s (staking {}s, trading {}s)\n",
        config.underlying,
        config.epoch.epoch_length_secs,
        config.epoch.staking_length_secs,
        config.epoch.trading_length_secs
    );

    scenario_1_epoch_lifecycle(&config)?;
    scenario_2_late_rebalance(&config)?;
    scenario_3_losing_epoch(&config)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn build_vault(config: &VaultConfig) -> Result<SimVault, VaultError> {
    let registry = StaticRegistry::new()
        .with_role(Role::Owner, SAFE)
        .with_role(Role::Safe, SAFE)
        .with_role(Role::Staking, STAKING)
        .with_role(Role::Strategy, STRATEGY);

    Vault::new(
        EngineConfig::default(),
        config,
        Timestamp::now(),
        registry,
        InMemorySafe::new(SAFE),
    )
}

// funds and counters move together, as the staking module does it
fn deposit(vault: &mut SimVault, amount: Amount) -> Result<(), Box<dyn Error>> {
    vault.safe_mut().receive(amount)?;
    vault.change_total_liquidity(STAKING, amount, true)?;
    Ok(())
}

fn withdraw(vault: &mut SimVault, amount: Amount) -> Result<(), Box<dyn Error>> {
    vault.change_total_liquidity(STAKING, amount, false)?;
    vault.safe_mut().transfer(DEPOSITOR, amount)?;
    Ok(())
}

fn print_liquidity(vault: &SimVault) {
    println!(
        "  total {}, utilized {}, available {}, utilization {}",
        vault.total_liquidity(),
        vault.utilized_liquidity(),
        vault.available_liquidity(),
        vault.liquidity_utilization_ratio()
    );
}

fn skip_to_epoch_end(vault: &mut SimVault) {
    let end = vault.current_epoch_end();
    vault.set_time(end);
}

/// Deposit, trade, rebalance, collect.
fn scenario_1_epoch_lifecycle(config: &VaultConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 1: Epoch Lifecycle\n");

    let mut vault = build_vault(config)?;
    println!("  Phase {}, epoch ends {}", vault.current_phase(), vault.current_epoch_end());

    deposit(&mut vault, Amount::from_units(200))?;
    withdraw(&mut vault, Amount::from_units(100))?;
    println!("  Deposited 200, withdrew 100");
    print_liquidity(&vault);

    // strategy takes 20 out and a 10 premium arrives
    vault.safe_mut().transfer(STRATEGY, Amount::from_units(20))?;
    vault.safe_mut().receive(Amount::from_units(10))?;
    vault.change_holding_position(STRATEGY, PositionId(1), true)?;
    println!("\n  Strategy opened {} with 20 out, 10 premium in", PositionId(1));
    print_liquidity(&vault);

    vault.safe_mut().receive(Amount::from_units(20))?;
    vault.change_holding_position(STRATEGY, PositionId(1), false)?;
    println!("\n  Strategy returned 20 and closed the position");
    print_liquidity(&vault);

    skip_to_epoch_end(&mut vault);
    let result = vault.rebalance(STRATEGY)?;
    println!("\n  Rebalanced epoch {}", result.epoch_index);
    println!("  Net change {}", result.net_change);
    println!("  Profit fee {}, maintenance fee {}", result.profit_fee, result.maintenance_fee);
    print_liquidity(&vault);
    println!("  Accumulated fees {}", vault.accumulated_fees());

    vault.set_fee_collector(SAFE, COLLECTOR)?;
    let collected = vault.collect_fees(COLLECTOR)?;
    println!("\n  Collector received {}", collected.amount);
    println!("  Safe balance {}, accumulated fees {}", vault.safe().balance(), vault.accumulated_fees());

    let principal = Amount::from_units(1000);
    println!(
        "  Rage-quit quote on {}: {}\n",
        principal,
        vault.calculate_rage_quit_fee(principal)?
    );
    Ok(())
}

/// Rebalance three and a half epochs late: no phase drift, every skipped epoch pays maintenance.
fn scenario_2_late_rebalance(config: &VaultConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 2: Late Rebalance\n");

    let mut vault = build_vault(config)?;
    deposit(&mut vault, Amount::from_units(1000))?;

    let start = vault.current_epoch_start();
    let epoch = vault.clock().lengths().epoch;
    vault.set_time(start.plus(3 * epoch + epoch / 2));

    let result = vault.rebalance(STRATEGY)?;
    println!("  Closed {} epochs at once", result.epochs_closed);
    println!("  Maintenance fee {}", result.maintenance_fee);
    println!(
        "  New epoch start {} (offset {}s from genesis)",
        vault.current_epoch_start(),
        vault.current_epoch_start().seconds_since(start)
    );

    match vault.rebalance(STRATEGY) {
        Err(e) => println!("  Second rebalance refused: {}\n", e),
        Ok(_) => println!("  Second rebalance unexpectedly succeeded\n"),
    }
    Ok(())
}

/// Strategy loses part of the liquidity. No profit fee, maintenance still accrues.
fn scenario_3_losing_epoch(config: &VaultConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 3: Losing Epoch\n");

    let mut vault = build_vault(config)?;
    deposit(&mut vault, Amount::from_units(500))?;

    vault.safe_mut().transfer(STRATEGY, Amount::from_units(100))?;
    vault.change_holding_position(STRATEGY, PositionId(7), true)?;
    print_liquidity(&vault);

    // only 60 of the 100 comes back
    vault.safe_mut().receive(Amount::from_units(60))?;

    skip_to_epoch_end(&mut vault);
    if let Err(e) = vault.rebalance(STRATEGY) {
        println!("  Rebalance with open position refused: {}", e);
    }

    vault.change_holding_position(STRATEGY, PositionId(7), false)?;
    let result = vault.rebalance(STRATEGY)?;
    println!("  Net change {}", result.net_change);
    println!("  Profit fee {}, maintenance fee {}", result.profit_fee, result.maintenance_fee);
    print_liquidity(&vault);
    Ok(())
}
