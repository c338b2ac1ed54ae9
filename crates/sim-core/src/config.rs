//! Simulation configuration.
//!
//! Every economic constant the engine uses lives here with its default, so a
//! scenario can be tuned from YAML without touching code. Missing sections or
//! fields fall back to the defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration and catalog files.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// A field holds a value the engine cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Wall-clock interval between ticks in milliseconds (default: 1000).
    pub tick_interval_ms: u64,
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    pub economy: EconomyConfig,
    pub contracts: ContractConfig,
    pub market: MarketConfig,
    pub start: StartConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            rng_seed: 42,
            economy: EconomyConfig::default(),
            contracts: ContractConfig::default(),
            market: MarketConfig::default(),
            start: StartConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse from YAML. The result is not validated.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Operating costs and physical floors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Cost per unit of energy drawn per tick.
    pub energy_unit_cost: Decimal,
    /// Cost per thermal unit generated per tick.
    pub thermal_unit_cost: Decimal,
    /// Wage per employee per tick.
    pub salary_per_employee: Decimal,
    /// Grid energy capacity available with no power hardware.
    pub ambient_energy_capacity: f64,
    /// Passive cooling available with no cooling hardware.
    pub ambient_cooling_capacity: f64,
    /// Book value of a placed asset as a fraction of its cost.
    pub depreciation_factor: Decimal,
    /// Fraction of cost refunded when an asset is sold.
    pub sell_refund_factor: Decimal,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            energy_unit_cost: Decimal::new(200, 2),
            thermal_unit_cost: Decimal::new(3, 2),
            salary_per_employee: Decimal::new(150, 0),
            ambient_energy_capacity: 50.0,
            ambient_cooling_capacity: 10.0,
            depreciation_factor: Decimal::new(8, 1),
            sell_refund_factor: Decimal::new(5, 1),
        }
    }
}

/// Offer generation and contract resolution parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Per-tick probability of a new offer.
    pub generation_chance: f64,
    /// Per-tick probability that the oldest offer expires.
    pub expiry_chance: f64,
    /// Cap on the offer pool.
    pub max_offers: usize,
    /// Lower bound of an offer's compute requirement.
    pub min_required_compute: f64,
    /// Requirement as a multiple of current compute at zero difficulty.
    pub base_compute_factor: f64,
    /// Additional multiple of current compute at full difficulty.
    pub difficulty_compute_factor: f64,
    /// Shortest contract duration.
    pub base_duration_ticks: u32,
    /// Durations are drawn from `base..base + spread`.
    pub duration_spread_ticks: u32,
    /// Payout per compute-tick is drawn from `[min, max)`.
    pub value_per_unit_min: f64,
    pub value_per_unit_max: f64,
    /// Penalty as a fraction of the payout.
    pub penalty_fraction: Decimal,
    /// Compute one employee can manage.
    pub compute_per_employee: f64,
    /// Reputation gained on a fulfilled contract.
    pub success_reputation: u8,
    /// Reputation lost on a breached contract.
    pub failure_reputation: u8,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            generation_chance: 0.1,
            expiry_chance: 0.005,
            max_offers: 5,
            min_required_compute: 300.0,
            base_compute_factor: 1.5,
            difficulty_compute_factor: 2.0,
            base_duration_ticks: 60,
            duration_spread_ticks: 240,
            value_per_unit_min: 0.40,
            value_per_unit_max: 0.80,
            penalty_fraction: Decimal::new(15, 2),
            compute_per_employee: 250.0,
            success_reputation: 1,
            failure_reputation: 2,
        }
    }
}

/// Valuation and share price parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Ticks per run-rate period (per-second profit to per-minute).
    pub run_rate_factor: Decimal,
    /// Earnings multiple applied to the run rate.
    pub earnings_multiple: Decimal,
    /// Valuation required to go public.
    pub ipo_threshold: Decimal,
    /// Fraction of valuation raised as cash at the IPO.
    pub ipo_capital_fraction: Decimal,
    /// How far below the IPO price the target may fall.
    pub band_below_ipo: Decimal,
    /// How far above the IPO price the target may rise.
    pub band_above_ipo: Decimal,
    /// Fraction of the gap to target closed each tick, in `(0, 1]`.
    pub price_smoothing: Decimal,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            run_rate_factor: Decimal::new(60, 0),
            earnings_multiple: Decimal::new(20, 0),
            ipo_threshold: Decimal::new(10_000_000, 0),
            ipo_capital_fraction: Decimal::new(2, 1),
            band_below_ipo: Decimal::new(5, 0),
            band_above_ipo: Decimal::new(100, 0),
            price_smoothing: Decimal::new(5, 2),
        }
    }
}

/// Initial company setup for a new game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    pub company_name: String,
    pub cash: Decimal,
    pub share_price: Decimal,
    pub shares_outstanding: u64,
    pub reputation: u8,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            company_name: "Unnamed Compute Co.".to_string(),
            cash: Decimal::new(5000, 0),
            share_price: Decimal::new(10, 0),
            shares_outstanding: 1_000_000,
            reputation: 10,
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn probability(p: f64, what: &str) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(format!("{what} must be within [0,1], got {p}")));
    }
    Ok(())
}

fn non_negative(d: Decimal, what: &str) -> Result<(), ConfigError> {
    if d < Decimal::ZERO {
        return Err(invalid(format!("{what} must be >= 0, got {d}")));
    }
    Ok(())
}

fn fraction(d: Decimal, what: &str) -> Result<(), ConfigError> {
    if d < Decimal::ZERO || d > Decimal::ONE {
        return Err(invalid(format!("{what} must be within [0,1], got {d}")));
    }
    Ok(())
}

/// Validate a configuration before handing it to the engine.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ConfigError> {
    if cfg.tick_interval_ms == 0 {
        return Err(invalid("tick_interval_ms must be > 0"));
    }

    let e = &cfg.economy;
    non_negative(e.energy_unit_cost, "economy.energy_unit_cost")?;
    non_negative(e.thermal_unit_cost, "economy.thermal_unit_cost")?;
    non_negative(e.salary_per_employee, "economy.salary_per_employee")?;
    fraction(e.depreciation_factor, "economy.depreciation_factor")?;
    fraction(e.sell_refund_factor, "economy.sell_refund_factor")?;
    for (v, what) in [
        (e.ambient_energy_capacity, "economy.ambient_energy_capacity"),
        (e.ambient_cooling_capacity, "economy.ambient_cooling_capacity"),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid(format!("{what} must be finite and >= 0")));
        }
    }

    let c = &cfg.contracts;
    probability(c.generation_chance, "contracts.generation_chance")?;
    probability(c.expiry_chance, "contracts.expiry_chance")?;
    for (v, what) in [
        (c.min_required_compute, "contracts.min_required_compute"),
        (c.base_compute_factor, "contracts.base_compute_factor"),
        (c.difficulty_compute_factor, "contracts.difficulty_compute_factor"),
        (c.value_per_unit_min, "contracts.value_per_unit_min"),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid(format!("{what} must be finite and >= 0")));
        }
    }
    if !(c.value_per_unit_max.is_finite() && c.value_per_unit_max > c.value_per_unit_min) {
        return Err(invalid(
            "contracts.value_per_unit_max must be finite and > value_per_unit_min",
        ));
    }
    if c.duration_spread_ticks == 0 {
        return Err(invalid("contracts.duration_spread_ticks must be > 0"));
    }
    if !(c.compute_per_employee.is_finite() && c.compute_per_employee > 0.0) {
        return Err(invalid("contracts.compute_per_employee must be > 0"));
    }
    non_negative(c.penalty_fraction, "contracts.penalty_fraction")?;

    let m = &cfg.market;
    non_negative(m.run_rate_factor, "market.run_rate_factor")?;
    non_negative(m.earnings_multiple, "market.earnings_multiple")?;
    non_negative(m.ipo_threshold, "market.ipo_threshold")?;
    fraction(m.ipo_capital_fraction, "market.ipo_capital_fraction")?;
    non_negative(m.band_below_ipo, "market.band_below_ipo")?;
    non_negative(m.band_above_ipo, "market.band_above_ipo")?;
    if m.price_smoothing <= Decimal::ZERO || m.price_smoothing > Decimal::ONE {
        return Err(invalid("market.price_smoothing must be within (0,1]"));
    }

    let s = &cfg.start;
    if s.company_name.trim().is_empty() {
        return Err(invalid("start.company_name must not be blank"));
    }
    if s.shares_outstanding == 0 {
        return Err(invalid("start.shares_outstanding must be > 0"));
    }
    non_negative(s.share_price, "start.share_price")?;
    Ok(())
}
