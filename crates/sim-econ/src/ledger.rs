//! Per-tick income statement.

use crate::throttle::PowerBalance;
use crate::{to_decimal, EconError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{AlgorithmProfile, EconomyConfig, Settlement};

/// Revenue and expense lines booked for one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Effective compute sold at the active algorithm's rate.
    pub compute_revenue: Decimal,
    /// Payouts minus penalties of contracts resolved this tick.
    pub contract_revenue: Decimal,
    pub energy_cost: Decimal,
    pub thermal_cost: Decimal,
    pub maintenance: Decimal,
    pub wages: Decimal,
}

impl Ledger {
    pub fn revenue(&self) -> Decimal {
        self.compute_revenue + self.contract_revenue
    }

    pub fn expenses(&self) -> Decimal {
        self.energy_cost + self.thermal_cost + self.maintenance + self.wages
    }

    pub fn net(&self) -> Decimal {
        self.revenue() - self.expenses()
    }
}

/// Book a tick. Energy and thermal costs are charged on the actual draw and
/// heat, after algorithm multipliers.
pub fn book(
    effective_compute: f64,
    algo: &AlgorithmProfile,
    balance: &PowerBalance,
    maintenance: Decimal,
    employees: u32,
    settlements: &[Settlement],
    economy: &EconomyConfig,
) -> Result<Ledger, EconError> {
    Ok(Ledger {
        compute_revenue: to_decimal(effective_compute)? * algo.revenue_per_unit,
        contract_revenue: settlements.iter().map(|s| s.amount).sum(),
        energy_cost: to_decimal(balance.energy_draw)? * economy.energy_unit_cost,
        thermal_cost: to_decimal(balance.heat_output)? * economy.thermal_unit_cost,
        maintenance,
        wages: Decimal::from(employees) * economy.salary_per_employee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{ids, AlgorithmId, Catalog, ContractId, Outcome};

    #[test]
    fn one_a100_on_basic_inference() {
        let catalog = Catalog::standard();
        let algo = catalog
            .algorithm(&AlgorithmId::new(ids::BASIC_INFERENCE))
            .unwrap();
        let balance = PowerBalance {
            energy_capacity: 50.0,
            energy_draw: 0.5,
            cooling_capacity: 10.0,
            heat_output: 10.0,
        };
        let ledger = book(
            22.0,
            algo,
            &balance,
            Decimal::ZERO,
            0,
            &[],
            &EconomyConfig::default(),
        )
        .unwrap();
        // 22 * 0.80
        assert_eq!(ledger.compute_revenue, Decimal::new(1760, 2));
        assert_eq!(ledger.energy_cost, Decimal::ONE);
        assert_eq!(ledger.thermal_cost, Decimal::new(30, 2));
        assert_eq!(ledger.expenses(), Decimal::new(130, 2));
        assert_eq!(ledger.net(), Decimal::new(1630, 2));
    }

    #[test]
    fn settlements_and_wages_are_booked() {
        let catalog = Catalog::standard();
        let algo = catalog
            .algorithm(&AlgorithmId::new(ids::BASIC_INFERENCE))
            .unwrap();
        let settlements = [
            Settlement {
                contract: ContractId(1),
                client: "xAI".into(),
                outcome: Outcome::Fulfilled,
                amount: Decimal::new(4_000, 0),
            },
            Settlement {
                contract: ContractId(2),
                client: "Cohere".into(),
                outcome: Outcome::Breached,
                amount: Decimal::new(-600, 0),
            },
        ];
        let ledger = book(
            0.0,
            algo,
            &PowerBalance::default(),
            Decimal::ZERO,
            3,
            &settlements,
            &EconomyConfig::default(),
        )
        .unwrap();
        assert_eq!(ledger.contract_revenue, Decimal::new(3_400, 0));
        assert_eq!(ledger.wages, Decimal::new(450, 0));
        assert_eq!(ledger.net(), Decimal::new(2_950, 0));
    }
}
