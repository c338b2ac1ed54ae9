//! Procedural contract offers.
//!
//! Offers scale with the company's current raw compute so there is always
//! something slightly out of reach, and reputation raises what clients pay.

use crate::{round_whole, to_decimal, EconError};
use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::{
    Catalog, Contract, ContractConfig, ContractId, ContractKind, ContractTerms, Reputation,
};
use tracing::debug;

/// Draw a new offer.
///
/// Draw order is fixed (difficulty, client, task, duration, value per unit)
/// so a seeded generator always yields the same offer. An empty duration
/// spread or value range is refused with [`EconError::InvalidConfig`].
pub fn generate_offer<R: Rng + ?Sized>(
    rng: &mut R,
    id: ContractId,
    raw_compute: f64,
    reputation: Reputation,
    catalog: &Catalog,
    cfg: &ContractConfig,
) -> Result<Contract, EconError> {
    if cfg.duration_spread_ticks == 0 {
        return Err(EconError::InvalidConfig("contracts.duration_spread_ticks"));
    }
    let (vpu_min, vpu_max) = (cfg.value_per_unit_min, cfg.value_per_unit_max);
    if !(vpu_min.is_finite() && vpu_max.is_finite() && vpu_min < vpu_max) {
        return Err(EconError::InvalidConfig("contracts.value_per_unit_max"));
    }

    let difficulty: f64 = rng.gen();
    let client = catalog.clients.choose(rng).ok_or(EconError::NoContractLabels)?;
    let task = catalog.tasks.choose(rng).ok_or(EconError::NoContractLabels)?;

    let scale = cfg.base_compute_factor + difficulty * cfg.difficulty_compute_factor;
    let required = (raw_compute * scale).max(cfg.min_required_compute).round();
    if !required.is_finite() {
        return Err(EconError::NonFinite);
    }
    let required_compute = required as u64;

    let duration_ticks = cfg
        .base_duration_ticks
        .saturating_add(rng.gen_range(0..cfg.duration_spread_ticks));
    let value_per_unit = rng.gen_range(vpu_min..vpu_max);

    let premium = 1.0 + f64::from(reputation.value()) / 100.0;
    let total_value = round_whole(to_decimal(
        required * f64::from(duration_ticks) * value_per_unit * premium,
    )?);
    let penalty = round_whole(total_value * cfg.penalty_fraction);

    let staff = (required / cfg.compute_per_employee).floor() + (difficulty * 2.0).floor();
    let required_employees = (staff as u32).max(1);

    let terms = ContractTerms {
        client: client.clone(),
        task: task.clone(),
        required_compute,
        required_employees,
        duration_ticks,
        total_value,
        penalty,
        kind: ContractKind::TrainingRun,
    };
    debug!(contract = %id, client = %terms.client, required_compute, duration_ticks, value = %terms.total_value, "offer generated");
    Ok(Contract::offer(id, terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;

    fn draw(seed: u64, compute: f64, reputation: u8) -> Contract {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_offer(
            &mut rng,
            ContractId(1),
            compute,
            Reputation::new(reputation),
            &Catalog::standard(),
            &ContractConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn small_companies_see_the_floor_requirement() {
        let c = draw(7, 22.0, 10);
        assert_eq!(c.terms.required_compute, 300);
        assert_eq!(c.terms.kind, ContractKind::TrainingRun);
        assert!(c.is_offered());
        assert!(c.terms.required_employees >= 1);
    }

    #[test]
    fn same_seed_same_offer() {
        assert_eq!(draw(99, 1234.0, 40), draw(99, 1234.0, 40));
    }

    #[test]
    fn missing_labels_are_an_error() {
        let mut catalog = Catalog::standard();
        catalog.tasks.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = generate_offer(
            &mut rng,
            ContractId(1),
            100.0,
            Reputation::default(),
            &catalog,
            &ContractConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, EconError::NoContractLabels);
    }

    #[test]
    fn empty_ranges_are_refused() {
        let catalog = Catalog::standard();
        let offer_for = |cfg: &ContractConfig| {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            generate_offer(&mut rng, ContractId(2), 0.0, Reputation::new(0), &catalog, cfg)
        };
        let no_spread = ContractConfig {
            duration_spread_ticks: 0,
            ..ContractConfig::default()
        };
        assert_eq!(
            offer_for(&no_spread),
            Err(EconError::InvalidConfig("contracts.duration_spread_ticks"))
        );
        let flat_value = ContractConfig {
            value_per_unit_min: 0.5,
            value_per_unit_max: 0.5,
            ..ContractConfig::default()
        };
        assert_eq!(
            offer_for(&flat_value),
            Err(EconError::InvalidConfig("contracts.value_per_unit_max"))
        );
    }

    #[test]
    fn narrowest_valid_ranges_pin_the_terms() {
        let cfg = ContractConfig {
            duration_spread_ticks: 1,
            value_per_unit_min: 0.5,
            value_per_unit_max: 0.5 + 1e-12,
            ..ContractConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = generate_offer(
            &mut rng,
            ContractId(2),
            0.0,
            Reputation::new(0),
            &Catalog::standard(),
            &cfg,
        )
        .unwrap();
        assert_eq!(c.terms.duration_ticks, 60);
        // 300 * 60 * 0.5
        assert_eq!(c.terms.total_value, Decimal::new(9000, 0));
        assert_eq!(c.terms.penalty, Decimal::new(1350, 0));
    }

    proptest! {
        #[test]
        fn offers_respect_their_bounds(seed in any::<u64>(), compute in 0.0f64..50_000.0, rep in 0u8..=100) {
            let c = draw(seed, compute, rep);
            let t = &c.terms;
            prop_assert!(t.required_compute >= 300);
            prop_assert!(t.required_compute as f64 >= (compute * 1.5).round() - 1.0);
            prop_assert!(t.required_compute as f64 <= (compute * 3.5).max(300.0).round() + 1.0);
            prop_assert!((60..300).contains(&t.duration_ticks));
            prop_assert!(t.required_employees >= 1);
            prop_assert!(t.total_value > Decimal::ZERO);
            prop_assert!(t.penalty <= t.total_value);
            prop_assert_eq!(t.penalty, round_whole(t.total_value * Decimal::new(15, 2)));
        }
    }
}
