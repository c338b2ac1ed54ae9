//! Sums the physical and book figures of every placed asset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Catalog, Facility};
use tracing::warn;

/// Raw totals over all unlocked facilities, before ambient floors or
/// algorithm multipliers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityStats {
    pub compute: f64,
    pub energy_capacity: f64,
    pub cooling_capacity: f64,
    /// Baseline energy draw.
    pub energy_draw: f64,
    /// Baseline heat output.
    pub heat_output: f64,
    /// Upkeep per tick.
    pub maintenance: Decimal,
    /// Depreciated book value of the hardware.
    pub asset_value: Decimal,
    pub asset_count: usize,
}

/// Aggregate every asset in the unlocked facilities; locked ones are skipped.
///
/// Assets whose type is not in the catalog contribute nothing.
pub fn aggregate<'a>(
    facilities: impl IntoIterator<Item = &'a Facility>,
    catalog: &Catalog,
    depreciation_factor: Decimal,
) -> FacilityStats {
    let mut stats = FacilityStats::default();
    for facility in facilities.into_iter().filter(|f| f.unlocked) {
        for placed in &facility.assets {
            let Some(def) = catalog.asset(&placed.asset_type) else {
                warn!(facility = %facility.id, asset = %placed.id, kind = %placed.asset_type, "asset type not in catalog; skipped");
                continue;
            };
            stats.compute += def.compute;
            stats.energy_capacity += def.energy_provided;
            stats.cooling_capacity += def.cooling_provided;
            stats.energy_draw += def.energy_consumed;
            stats.heat_output += def.heat_generated;
            stats.maintenance += def.maintenance;
            stats.asset_value += def.cost * depreciation_factor;
            stats.asset_count += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{ids, AssetId, AssetTypeId, FacilityId, Orientation, PlacedAsset};

    fn placed(id: u64, kind: &str) -> PlacedAsset {
        PlacedAsset {
            id: AssetId(id),
            asset_type: AssetTypeId::new(kind),
            x: id as f64,
            y: 0.5,
            orientation: Orientation::North,
        }
    }

    fn facility(id: &str, unlocked: bool, assets: Vec<PlacedAsset>) -> Facility {
        Facility {
            id: FacilityId::new(id),
            name: id.to_string(),
            grid_size: 10,
            assets,
            unlocked,
            cost: Decimal::ZERO,
        }
    }

    #[test]
    fn empty_set_is_all_zero() {
        let stats = aggregate(&Vec::<Facility>::new(), &Catalog::standard(), Decimal::new(8, 1));
        assert_eq!(stats, FacilityStats::default());
    }

    #[test]
    fn sums_mixed_hardware() {
        let catalog = Catalog::standard();
        let f = facility(
            "a",
            true,
            vec![
                placed(1, ids::GPU_A100),
                placed(2, ids::GPU_A100),
                placed(3, ids::COOLING_CRAC_STD),
                placed(4, ids::POWER_DIESEL_GEN),
            ],
        );
        let stats = aggregate([&f], &catalog, Decimal::new(8, 1));
        assert_eq!(stats.compute, 44.0);
        assert_eq!(stats.energy_capacity, 150.0);
        assert_eq!(stats.cooling_capacity, 120.0);
        assert_eq!(stats.energy_draw, 4.0);
        assert_eq!(stats.heat_output, 35.0);
        assert_eq!(stats.maintenance, Decimal::new(17, 0));
        // (1500 * 2 + 2000 + 1500) * 0.8
        assert_eq!(stats.asset_value, Decimal::new(5200, 0));
        assert_eq!(stats.asset_count, 4);
    }

    #[test]
    fn locked_facilities_are_invisible() {
        let catalog = Catalog::standard();
        let open = facility("open", true, vec![placed(1, ids::GPU_H100)]);
        let locked = facility("locked", false, vec![placed(2, ids::RACK_GB200_NVL72)]);
        let stats = aggregate([&open, &locked], &catalog, Decimal::new(8, 1));
        assert_eq!(stats.compute, 90.0);
        assert_eq!(stats.asset_count, 1);
    }

    #[test]
    fn unknown_asset_types_contribute_nothing() {
        let catalog = Catalog::standard();
        let f = facility("a", true, vec![placed(1, "QUANTUM_PROTOTYPE")]);
        let stats = aggregate([&f], &catalog, Decimal::new(8, 1));
        assert_eq!(stats, FacilityStats::default());
    }
}
