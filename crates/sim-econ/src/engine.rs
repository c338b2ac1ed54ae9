//! One simulation tick.
//!
//! Stages run in a fixed order on a copy of the input state:
//! 1. Aggregate facilities and apply throttling
//! 2. Age and settle active contracts
//! 3. Expire and mint offers
//! 4. Book the ledger, value the company, move the share price
//! 5. Apply the net result to cash
//!
//! The input is never modified, so a failed tick leaves nothing half-done.

use crate::facility::{aggregate, FacilityStats};
use crate::ledger::{book, Ledger};
use crate::lifecycle::{advance_active, refresh_offers, OfferChanges};
use crate::market::next_share_price;
use crate::throttle::PowerBalance;
use crate::valuation::valuation;
use crate::EconError;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Catalog, GameState, Settlement, SimConfig};
use tracing::debug;

/// Everything observable about a tick, for display and tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Tick number after applying this tick.
    pub tick: u64,
    pub stats: FacilityStats,
    pub balance: PowerBalance,
    pub efficiency: f64,
    pub effective_compute: f64,
    pub ledger: Ledger,
    pub settlements: Vec<Settlement>,
    pub offers: OfferChanges,
    pub valuation: Decimal,
    pub share_price: Decimal,
    /// Cash after the net result was booked.
    pub cash: Decimal,
}

/// Next state and what produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub state: GameState,
    pub summary: TickSummary,
}

/// Advance `state` by one tick.
///
/// `cfg` is expected to have passed `sim_core::validate_config`. Contract
/// chances or ranges it would reject surface as [`EconError::InvalidConfig`]
/// and `state` is left as it was.
pub fn apply_tick<R: Rng + ?Sized>(
    state: &GameState,
    catalog: &Catalog,
    cfg: &SimConfig,
    rng: &mut R,
) -> Result<TickReport, EconError> {
    let algo = catalog
        .algorithm(&state.active_algorithm)
        .ok_or_else(|| EconError::UnknownAlgorithm(state.active_algorithm.0.clone()))?;
    let mut next = state.clone();

    let stats = aggregate(&next.facilities, catalog, cfg.economy.depreciation_factor);
    let balance = PowerBalance::new(&stats, algo, &cfg.economy);
    let efficiency = balance.efficiency();
    let effective_compute = stats.compute * efficiency;
    debug!(raw = stats.compute, effective = effective_compute, efficiency, power_limited = balance.power_limited(), thermal_limited = balance.thermal_limited(), "throttle");

    let company = &mut next.company;
    let settlements = advance_active(
        &mut company.active_contracts,
        effective_compute,
        &mut company.reputation,
        &cfg.contracts,
    )?;

    let offers = refresh_offers(rng, &mut next, stats.compute, catalog, &cfg.contracts)?;

    let ledger = book(
        effective_compute,
        algo,
        &balance,
        stats.maintenance,
        next.company.employees,
        &settlements,
        &cfg.economy,
    )?;
    let net = ledger.net();

    // valued on the opening balance; this tick's net is reflected via earnings
    let valuation = valuation(state.cash, stats.asset_value, net, &cfg.market);
    let share_price = next_share_price(&next.company, valuation, &cfg.market);
    next.company.valuation = valuation;
    next.company.share_price = share_price;
    next.cash += net;
    next.tick += 1;
    debug!(tick = next.tick, revenue = %ledger.revenue(), expenses = %ledger.expenses(), net = %net, cash = %next.cash, %valuation, %share_price, "tick booked");

    let summary = TickSummary {
        tick: next.tick,
        stats,
        balance,
        efficiency,
        effective_compute,
        ledger,
        settlements,
        offers,
        valuation,
        share_price,
        cash: next.cash,
    };
    Ok(TickReport {
        state: next,
        summary,
    })
}
