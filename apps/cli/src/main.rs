#![deny(warnings)]

//! Headless CLI that runs a company on autopilot and prints its KPIs.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sim_core::*;
use sim_econ::{Action, TickSummary};
use sim_runtime::{Simulation, SimulationClock};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    ticks: u64,
    seed: Option<u64>,
    config: Option<PathBuf>,
    realtime: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        ticks: 600,
        seed: None,
        config: None,
        realtime: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--ticks" => {
                if let Some(n) = it.next().and_then(|s| s.parse().ok()) {
                    args.ticks = n;
                }
            }
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--realtime" => args.realtime = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SimConfig::from_yaml_str(&text)?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    Ok(cfg)
}

/// First free slot of the viewed facility, scanning row by row.
fn free_slot(facility: &Facility) -> Option<(f64, f64)> {
    let half = f64::from(facility.grid_size) / 2.0;
    (0..facility.grid_size)
        .flat_map(|row| (0..facility.grid_size).map(move |col| (row, col)))
        .map(|(row, col)| (f64::from(col) - half + 0.5, f64::from(row) - half + 0.5))
        .find(|&(x, y)| !facility.is_occupied(x, y))
}

/// A simple operator: sign what it can staff, hire for what it can't, and
/// buy whichever hardware relieves the current bottleneck.
fn autopilot(state: &GameState, catalog: &Catalog, last: Option<&TickSummary>) -> Vec<Action> {
    let mut actions = Vec::new();
    let company = &state.company;

    let mut free_capacity = company
        .management_capacity()
        .saturating_sub(company.active_contracts.len());
    for offer in &company.available_contracts {
        if free_capacity > 0 && company.employees >= offer.terms.required_employees {
            actions.push(Action::SignContract(offer.id));
            free_capacity -= 1;
        }
    }
    let understaffed = company
        .available_contracts
        .iter()
        .any(|c| c.terms.required_employees > company.employees);
    if understaffed && state.cash > Decimal::new(20_000, 0) {
        actions.push(Action::HireEmployee);
    }

    let kind = match last {
        Some(s) if s.balance.thermal_limited() => ids::COOLING_CRAC_STD,
        Some(s) if s.balance.power_limited() => ids::POWER_DIESEL_GEN,
        _ => ids::GPU_A100,
    };
    let asset_type = AssetTypeId::new(kind);
    if let (Some(def), Some(facility)) = (catalog.asset(&asset_type), state.viewed_facility()) {
        if state.cash >= def.cost * Decimal::TWO {
            if let Some((x, y)) = free_slot(facility) {
                actions.push(Action::PlaceAsset {
                    facility: facility.id.clone(),
                    asset_type,
                    x,
                    y,
                    orientation: Orientation::ALL[(state.next_asset_id % 4) as usize],
                });
            }
        }
    }
    actions
}

fn print_kpis(state: &GameState, last: Option<&TickSummary>) {
    let (compute, efficiency, net) = last
        .map(|s| (s.effective_compute, s.efficiency, s.ledger.net()))
        .unwrap_or((0.0, 1.0, Decimal::ZERO));
    let company = &state.company;
    println!(
        "KPI | ticks: {} | cash: ${} | net/tick: ${} | valuation: ${} | share: ${} | compute: {:.1} TFLOPS | efficiency: {:.0}% | contracts: {} active / {} offered | staff: {} | reputation: {} | public: {}",
        state.tick,
        state.cash.round_dp(2),
        net.round_dp(2),
        company.valuation.round_dp(0),
        company.share_price.round_dp(4),
        compute,
        efficiency * 100.0,
        company.active_contracts.len(),
        company.available_contracts.len(),
        company.employees,
        company.reputation.value(),
        company.is_public()
    );
}

fn run_batch(mut sim: Simulation, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        for action in autopilot(sim.state(), sim.catalog(), sim.last_summary()) {
            let _ = sim.apply(action);
        }
        sim.step()?;
    }
    print_kpis(sim.state(), sim.last_summary());
    Ok(())
}

async fn run_realtime(sim: Simulation, ticks: u64) -> Result<()> {
    let catalog = sim.catalog().clone();
    let (handle, task) = SimulationClock::new(sim).spawn();
    let mut updates = handle.subscribe();
    loop {
        let snap = handle.latest();
        if snap.state.tick >= ticks {
            break;
        }
        for action in autopilot(&snap.state, &catalog, snap.last.as_ref()) {
            let _ = handle.act(action).await?;
        }
        print_kpis(&snap.state, snap.last.as_ref());
        updates.changed().await?;
    }
    handle.shutdown().await?;
    let sim = task.await?;
    print_kpis(sim.state(), sim.last_summary());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    let cfg = load_config(&args)?;
    info!(ticks = args.ticks, seed = cfg.rng_seed, realtime = args.realtime, "starting CLI");

    let catalog = Catalog::standard();
    validate_catalog(&catalog)?;
    let sim = Simulation::new(catalog, cfg)?;

    if args.realtime {
        run_realtime(sim, args.ticks).await
    } else {
        run_batch(sim, args.ticks)
    }
}
