//! Power and thermal throttling.
//!
//! Overloads reduce output proportionally rather than switching hardware
//! off, and an overload on both sides compounds:
//!
//! efficiency = min(1, capacity / draw) × min(1, cooling / heat)
//!
//! with `max(x, 1)` guarding both denominators.

use crate::facility::FacilityStats;
use serde::{Deserialize, Serialize};
use sim_core::{AlgorithmProfile, EconomyConfig};

/// Actual supply and demand for one tick, after ambient floors and the
/// active algorithm's multipliers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerBalance {
    pub energy_capacity: f64,
    pub energy_draw: f64,
    pub cooling_capacity: f64,
    pub heat_output: f64,
}

impl PowerBalance {
    pub fn new(stats: &FacilityStats, algo: &AlgorithmProfile, economy: &EconomyConfig) -> Self {
        Self {
            energy_capacity: stats.energy_capacity + economy.ambient_energy_capacity,
            energy_draw: stats.energy_draw * algo.energy_multiplier,
            cooling_capacity: stats.cooling_capacity + economy.ambient_cooling_capacity,
            heat_output: stats.heat_output * algo.heat_multiplier,
        }
    }

    pub fn power_limited(&self) -> bool {
        self.energy_draw > self.energy_capacity
    }

    pub fn thermal_limited(&self) -> bool {
        self.heat_output > self.cooling_capacity
    }

    /// Fraction of raw compute that survives throttling, never above 1.
    pub fn efficiency(&self) -> f64 {
        let mut efficiency = 1.0;
        if self.power_limited() {
            efficiency *= self.energy_capacity / self.energy_draw.max(1.0);
        }
        if self.thermal_limited() {
            efficiency *= self.cooling_capacity / self.heat_output.max(1.0);
        }
        efficiency
    }

    pub fn effective_compute(&self, raw_compute: f64) -> f64 {
        raw_compute * self.efficiency()
    }
}
