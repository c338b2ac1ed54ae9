//! Player actions applied between ticks.
//!
//! Each action checks every precondition before it touches the state, so an
//! `Err` always means the state is exactly as it was.

use crate::market::{go_public, ipo_terms, IpoProceeds};
use rust_decimal::Decimal;
use sim_core::{
    AlgorithmId, AssetId, AssetTypeId, Catalog, ContractError, ContractId, EconomyConfig,
    FacilityId, GameState, MarketConfig, Orientation, PlacedAsset, SimConfig,
};
use thiserror::Error;
use tracing::{debug, info};

/// Why an action was refused.
#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("unknown facility: {0}")]
    UnknownFacility(FacilityId),
    #[error("facility {0} is locked")]
    FacilityLocked(FacilityId),
    #[error("facility {0} is already unlocked")]
    FacilityAlreadyUnlocked(FacilityId),
    #[error("unknown asset type: {0}")]
    UnknownAssetType(AssetTypeId),
    #[error("no asset {0} in this facility")]
    UnknownAsset(AssetId),
    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds { x: f64, y: f64 },
    #[error("slot ({x}, {y}) is occupied")]
    SlotOccupied { x: f64, y: f64 },
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("no open offer {0}")]
    UnknownContract(ContractId),
    #[error("management capacity reached ({active}/{capacity})")]
    ManagementCapacity { active: usize, capacity: usize },
    #[error("contract needs {required} employees, company has {employed}")]
    Understaffed { required: u32, employed: u32 },
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(AlgorithmId),
    #[error("algorithm {0} is locked")]
    AlgorithmLocked(AlgorithmId),
    #[error("algorithm {0} is already unlocked")]
    AlgorithmAlreadyUnlocked(AlgorithmId),
    #[error("company name must not be blank")]
    BlankName,
    #[error("company is already public")]
    AlreadyPublic,
    #[error("valuation {valuation} is below the IPO threshold {threshold}")]
    BelowIpoThreshold { valuation: Decimal, threshold: Decimal },
    /// A carried asset could not be put down; the token is handed back.
    #[error("carried asset rejected: {reason}")]
    CarriedRejected {
        reason: Box<ActionError>,
        carried: CarriedAsset,
    },
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Whether a removed asset is sold or picked up to be placed elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalMode {
    Sell,
    Move,
}

/// An asset picked up by a move. It can be placed once, at no cost.
#[derive(Debug, PartialEq)]
pub struct CarriedAsset {
    asset_type: AssetTypeId,
    orientation: Orientation,
}

impl CarriedAsset {
    pub fn asset_type(&self) -> &AssetTypeId {
        &self.asset_type
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// Result of [`remove_asset`].
#[derive(Debug, PartialEq)]
pub enum Removal {
    Sold { refund: Decimal },
    Carried(CarriedAsset),
}

fn ensure_funds(state: &GameState, needed: Decimal) -> Result<(), ActionError> {
    if state.cash < needed {
        return Err(ActionError::InsufficientFunds {
            needed,
            available: state.cash,
        });
    }
    Ok(())
}

fn facility_index(state: &GameState, id: &FacilityId) -> Result<usize, ActionError> {
    state
        .facilities
        .iter()
        .position(|f| &f.id == id)
        .ok_or_else(|| ActionError::UnknownFacility(id.clone()))
}

/// Index of an unlocked facility with a free, in-bounds slot at `(x, y)`.
fn open_slot(state: &GameState, id: &FacilityId, x: f64, y: f64) -> Result<usize, ActionError> {
    let idx = facility_index(state, id)?;
    let facility = &state.facilities[idx];
    if !facility.unlocked {
        return Err(ActionError::FacilityLocked(id.clone()));
    }
    if !facility.contains(x, y) {
        return Err(ActionError::OutOfBounds { x, y });
    }
    if facility.is_occupied(x, y) {
        return Err(ActionError::SlotOccupied { x, y });
    }
    Ok(idx)
}

fn put(
    state: &mut GameState,
    idx: usize,
    asset_type: AssetTypeId,
    orientation: Orientation,
    x: f64,
    y: f64,
) -> AssetId {
    let id = state.allocate_asset_id();
    state.facilities[idx].assets.push(PlacedAsset {
        id,
        asset_type,
        x,
        y,
        orientation,
    });
    id
}

/// Buy an asset and place it at `(x, y)` facing `orientation`.
pub fn place_asset(
    state: &mut GameState,
    catalog: &Catalog,
    facility: &FacilityId,
    asset_type: &AssetTypeId,
    x: f64,
    y: f64,
    orientation: Orientation,
) -> Result<AssetId, ActionError> {
    let def = catalog
        .asset(asset_type)
        .ok_or_else(|| ActionError::UnknownAssetType(asset_type.clone()))?;
    let idx = open_slot(state, facility, x, y)?;
    ensure_funds(state, def.cost)?;

    let id = put(state, idx, asset_type.clone(), orientation, x, y);
    state.cash -= def.cost;
    debug!(asset = %id, kind = %asset_type, %facility, x, y, ?orientation, cost = %def.cost, "asset placed");
    Ok(id)
}

/// Take an asset off the grid, either selling it back or carrying it.
pub fn remove_asset(
    state: &mut GameState,
    catalog: &Catalog,
    facility: &FacilityId,
    asset: AssetId,
    mode: RemovalMode,
    economy: &EconomyConfig,
) -> Result<Removal, ActionError> {
    let idx = facility_index(state, facility)?;
    let placed = state.facilities[idx]
        .asset(asset)
        .cloned()
        .ok_or(ActionError::UnknownAsset(asset))?;
    let refund = match mode {
        RemovalMode::Sell => {
            let def = catalog
                .asset(&placed.asset_type)
                .ok_or_else(|| ActionError::UnknownAssetType(placed.asset_type.clone()))?;
            def.cost * economy.sell_refund_factor
        }
        RemovalMode::Move => Decimal::ZERO,
    };

    state.facilities[idx].assets.retain(|a| a.id != asset);
    debug!(asset = %placed.id, kind = %placed.asset_type, ?mode, %refund, "asset removed");
    Ok(match mode {
        RemovalMode::Sell => {
            state.cash += refund;
            Removal::Sold { refund }
        }
        RemovalMode::Move => Removal::Carried(CarriedAsset {
            asset_type: placed.asset_type,
            orientation: placed.orientation,
        }),
    })
}

/// Put a carried asset down for free. On failure the token comes back
/// inside [`ActionError::CarriedRejected`].
pub fn place_carried(
    state: &mut GameState,
    facility: &FacilityId,
    carried: CarriedAsset,
    x: f64,
    y: f64,
) -> Result<AssetId, ActionError> {
    let idx = match open_slot(state, facility, x, y) {
        Ok(idx) => idx,
        Err(reason) => {
            return Err(ActionError::CarriedRejected {
                reason: Box::new(reason),
                carried,
            })
        }
    };
    let id = put(state, idx, carried.asset_type, carried.orientation, x, y);
    debug!(asset = %id, %facility, x, y, "carried asset placed");
    Ok(id)
}

/// Move an offer into the active pool.
pub fn sign_contract(state: &mut GameState, id: ContractId) -> Result<(), ActionError> {
    let company = &mut state.company;
    let pos = company
        .available_contracts
        .iter()
        .position(|c| c.id == id)
        .ok_or(ActionError::UnknownContract(id))?;
    let capacity = company.management_capacity();
    if company.active_contracts.len() >= capacity {
        return Err(ActionError::ManagementCapacity {
            active: company.active_contracts.len(),
            capacity,
        });
    }
    let required = company.available_contracts[pos].terms.required_employees;
    if company.employees < required {
        return Err(ActionError::Understaffed {
            required,
            employed: company.employees,
        });
    }
    let mut contract = company.available_contracts[pos].clone();
    contract.sign()?;

    company.available_contracts.remove(pos);
    debug!(contract = %id, client = %contract.terms.client, "contract signed");
    company.active_contracts.push(contract);
    Ok(())
}

pub fn set_active_algorithm(
    state: &mut GameState,
    catalog: &Catalog,
    id: &AlgorithmId,
) -> Result<(), ActionError> {
    if catalog.algorithm(id).is_none() {
        return Err(ActionError::UnknownAlgorithm(id.clone()));
    }
    if !state.unlocked_algorithms.contains(id) {
        return Err(ActionError::AlgorithmLocked(id.clone()));
    }
    state.active_algorithm = id.clone();
    Ok(())
}

pub fn unlock_algorithm(
    state: &mut GameState,
    catalog: &Catalog,
    id: &AlgorithmId,
) -> Result<(), ActionError> {
    let algo = catalog
        .algorithm(id)
        .ok_or_else(|| ActionError::UnknownAlgorithm(id.clone()))?;
    if state.unlocked_algorithms.contains(id) {
        return Err(ActionError::AlgorithmAlreadyUnlocked(id.clone()));
    }
    ensure_funds(state, algo.unlock_cost)?;

    state.cash -= algo.unlock_cost;
    state.unlocked_algorithms.insert(id.clone());
    info!(algorithm = %id, cost = %algo.unlock_cost, "algorithm unlocked");
    Ok(())
}

/// Hire one employee. Returns the new headcount.
pub fn hire_employee(state: &mut GameState) -> Result<u32, ActionError> {
    let company = &mut state.company;
    company.employees = company.employees.saturating_add(1);
    Ok(company.employees)
}

pub fn rename_company(state: &mut GameState, name: &str) -> Result<(), ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::BlankName);
    }
    state.company.name = name.to_string();
    Ok(())
}

/// List the company at its last valuation and raise capital.
pub fn request_ipo(state: &mut GameState, cfg: &MarketConfig) -> Result<IpoProceeds, ActionError> {
    let proceeds = ipo_terms(&state.company, cfg)?;
    go_public(&mut state.company, &proceeds);
    state.cash += proceeds.capital_raised;
    Ok(proceeds)
}

/// Buy a facility and switch the view to it.
pub fn unlock_facility(state: &mut GameState, id: &FacilityId) -> Result<(), ActionError> {
    let idx = facility_index(state, id)?;
    let facility = &state.facilities[idx];
    if facility.unlocked {
        return Err(ActionError::FacilityAlreadyUnlocked(id.clone()));
    }
    let cost = facility.cost;
    ensure_funds(state, cost)?;

    state.cash -= cost;
    state.facilities[idx].unlocked = true;
    state.current_facility = id.clone();
    info!(facility = %id, %cost, "facility unlocked");
    Ok(())
}

pub fn switch_facility(state: &mut GameState, id: &FacilityId) -> Result<(), ActionError> {
    let idx = facility_index(state, id)?;
    if !state.facilities[idx].unlocked {
        return Err(ActionError::FacilityLocked(id.clone()));
    }
    state.current_facility = id.clone();
    Ok(())
}

/// A player command, as queued by the runtime.
#[derive(Debug)]
pub enum Action {
    PlaceAsset {
        facility: FacilityId,
        asset_type: AssetTypeId,
        x: f64,
        y: f64,
        orientation: Orientation,
    },
    RemoveAsset {
        facility: FacilityId,
        asset: AssetId,
        mode: RemovalMode,
    },
    PlaceCarried {
        facility: FacilityId,
        carried: CarriedAsset,
        x: f64,
        y: f64,
    },
    SignContract(ContractId),
    SetActiveAlgorithm(AlgorithmId),
    UnlockAlgorithm(AlgorithmId),
    HireEmployee,
    RenameCompany(String),
    RequestIpo,
    UnlockFacility(FacilityId),
    SwitchFacility(FacilityId),
}

/// What a successful [`Action`] produced.
#[derive(Debug, PartialEq)]
pub enum ActionOutcome {
    Placed(AssetId),
    Sold { refund: Decimal },
    Carried(CarriedAsset),
    Hired { employees: u32 },
    WentPublic(IpoProceeds),
    Applied,
}

pub fn apply_action(
    state: &mut GameState,
    catalog: &Catalog,
    cfg: &SimConfig,
    action: Action,
) -> Result<ActionOutcome, ActionError> {
    use ActionOutcome::*;
    match action {
        Action::PlaceAsset {
            facility,
            asset_type,
            x,
            y,
            orientation,
        } => place_asset(state, catalog, &facility, &asset_type, x, y, orientation).map(Placed),
        Action::RemoveAsset {
            facility,
            asset,
            mode,
        } => match remove_asset(state, catalog, &facility, asset, mode, &cfg.economy)? {
            Removal::Sold { refund } => Ok(Sold { refund }),
            Removal::Carried(carried) => Ok(Carried(carried)),
        },
        Action::PlaceCarried {
            facility,
            carried,
            x,
            y,
        } => place_carried(state, &facility, carried, x, y).map(Placed),
        Action::SignContract(id) => sign_contract(state, id).map(|_| Applied),
        Action::SetActiveAlgorithm(id) => set_active_algorithm(state, catalog, &id).map(|_| Applied),
        Action::UnlockAlgorithm(id) => unlock_algorithm(state, catalog, &id).map(|_| Applied),
        Action::HireEmployee => hire_employee(state).map(|employees| Hired { employees }),
        Action::RenameCompany(name) => rename_company(state, &name).map(|_| Applied),
        Action::RequestIpo => request_ipo(state, &cfg.market).map(WentPublic),
        Action::UnlockFacility(id) => unlock_facility(state, &id).map(|_| Applied),
        Action::SwitchFacility(id) => switch_facility(state, &id).map(|_| Applied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{ids, Contract, ContractKind, ContractTerms, StartConfig};

    fn fresh() -> (Catalog, GameState) {
        let catalog = Catalog::standard();
        let state = GameState::new_game(&catalog, &StartConfig::default());
        (catalog, state)
    }

    fn garage() -> FacilityId {
        FacilityId::new(ids::LOC_GARAGE)
    }

    fn a100() -> AssetTypeId {
        AssetTypeId::new(ids::GPU_A100)
    }

    fn offer(state: &mut GameState, required_employees: u32) -> ContractId {
        let id = state.allocate_contract_id();
        state.company.available_contracts.push(Contract::offer(
            id,
            ContractTerms {
                client: "DeepMind".into(),
                task: "Genomic Data Analysis".into(),
                required_compute: 300,
                required_employees,
                duration_ticks: 90,
                total_value: Decimal::new(12_000, 0),
                penalty: Decimal::new(1_800, 0),
                kind: ContractKind::TrainingRun,
            },
        ));
        id
    }

    #[test]
    fn place_deducts_cost() {
        let (catalog, mut state) = fresh();
        let id = place_asset(&mut state, &catalog, &garage(), &a100(), 0.5, 0.5, Orientation::North).unwrap();
        assert_eq!(state.cash, Decimal::new(3500, 0));
        assert_eq!(state.viewed_facility().unwrap().assets[0].id, id);
    }

    #[test]
    fn rejected_placements_leave_state_untouched() {
        let (catalog, mut state) = fresh();
        place_asset(&mut state, &catalog, &garage(), &a100(), 0.5, 0.5, Orientation::North).unwrap();
        let before = state.clone();

        let occupied = place_asset(&mut state, &catalog, &garage(), &a100(), 0.55, 0.45, Orientation::North);
        assert_eq!(occupied, Err(ActionError::SlotOccupied { x: 0.55, y: 0.45 }));
        let outside = place_asset(&mut state, &catalog, &garage(), &a100(), 5.0, 0.0, Orientation::North);
        assert_eq!(outside, Err(ActionError::OutOfBounds { x: 5.0, y: 0.0 }));
        let locked = FacilityId::new(ids::LOC_WAREHOUSE);
        let locked_err = place_asset(&mut state, &catalog, &locked, &a100(), 0.5, 0.5, Orientation::North);
        assert_eq!(locked_err, Err(ActionError::FacilityLocked(locked)));
        let poor = place_asset(
            &mut state,
            &catalog,
            &garage(),
            &AssetTypeId::new(ids::GPU_H100),
            1.5,
            0.5,
            Orientation::North,
        );
        assert!(matches!(poor, Err(ActionError::InsufficientFunds { .. })));
        let unknown = place_asset(
            &mut state,
            &catalog,
            &garage(),
            &AssetTypeId::new("ABACUS"),
            1.5,
            0.5,
            Orientation::North,
        );
        assert!(matches!(unknown, Err(ActionError::UnknownAssetType(_))));

        assert_eq!(state, before);
    }

    #[test]
    fn selling_refunds_half() {
        let (catalog, mut state) = fresh();
        let id = place_asset(&mut state, &catalog, &garage(), &a100(), 0.5, 0.5, Orientation::North).unwrap();
        let removal = remove_asset(
            &mut state,
            &catalog,
            &garage(),
            id,
            RemovalMode::Sell,
            &EconomyConfig::default(),
        )
        .unwrap();
        assert_eq!(
            removal,
            Removal::Sold {
                refund: Decimal::new(750, 0)
            }
        );
        assert_eq!(state.cash, Decimal::new(4250, 0));
        assert!(state.viewed_facility().unwrap().assets.is_empty());
    }

    #[test]
    fn moving_is_free_and_keeps_type_and_facing() {
        let (catalog, mut state) = fresh();
        let id = place_asset(&mut state, &catalog, &garage(), &a100(), 0.5, 0.5, Orientation::South).unwrap();
        let Removal::Carried(carried) = remove_asset(
            &mut state,
            &catalog,
            &garage(),
            id,
            RemovalMode::Move,
            &EconomyConfig::default(),
        )
        .unwrap() else {
            panic!("expected a carried asset");
        };
        assert_eq!(carried.asset_type(), &a100());
        assert_eq!(carried.orientation(), Orientation::South);
        assert_eq!(state.cash, Decimal::new(3500, 0));

        let moved = place_carried(&mut state, &garage(), carried, -2.5, 3.5).unwrap();
        assert_ne!(moved, id);
        assert_eq!(state.cash, Decimal::new(3500, 0));
        let placed = state.viewed_facility().unwrap().asset(moved).unwrap();
        assert_eq!((placed.x, placed.y), (-2.5, 3.5));
        assert_eq!(placed.orientation, Orientation::South);
    }

    #[test]
    fn rejected_carry_returns_the_token() {
        let (catalog, mut state) = fresh();
        let id = place_asset(&mut state, &catalog, &garage(), &a100(), 0.5, 0.5, Orientation::North).unwrap();
        let Removal::Carried(carried) = remove_asset(
            &mut state,
            &catalog,
            &garage(),
            id,
            RemovalMode::Move,
            &EconomyConfig::default(),
        )
        .unwrap() else {
            panic!("expected a carried asset");
        };
        let err = place_carried(&mut state, &garage(), carried, 9.0, 0.0).unwrap_err();
        let ActionError::CarriedRejected { reason, carried } = err else {
            panic!("expected CarriedRejected");
        };
        assert_eq!(*reason, ActionError::OutOfBounds { x: 9.0, y: 0.0 });
        place_carried(&mut state, &garage(), carried, 0.5, 0.5).unwrap();
    }

    #[test]
    fn understaffed_signing_leaves_pools_unchanged() {
        let (_, mut state) = fresh();
        let id = offer(&mut state, 2);
        hire_employee(&mut state).unwrap();
        let before = state.clone();
        assert_eq!(
            sign_contract(&mut state, id),
            Err(ActionError::Understaffed {
                required: 2,
                employed: 1
            })
        );
        assert_eq!(state, before);
        hire_employee(&mut state).unwrap();
        sign_contract(&mut state, id).unwrap();
        assert!(state.company.available_contracts.is_empty());
        assert_eq!(state.company.active_contracts[0].remaining_ticks(), Some(90));
    }

    #[test]
    fn management_capacity_limits_signing() {
        let (_, mut state) = fresh();
        let first = offer(&mut state, 0);
        let second = offer(&mut state, 0);
        sign_contract(&mut state, first).unwrap();
        assert_eq!(
            sign_contract(&mut state, second),
            Err(ActionError::ManagementCapacity {
                active: 1,
                capacity: 1
            })
        );
        assert_eq!(
            sign_contract(&mut state, ContractId(99)),
            Err(ActionError::UnknownContract(ContractId(99)))
        );
    }

    #[test]
    fn algorithms_unlock_then_activate() {
        let (catalog, mut state) = fresh();
        let mining = AlgorithmId::new(ids::CRYPTO_MINING);
        assert_eq!(
            set_active_algorithm(&mut state, &catalog, &mining),
            Err(ActionError::AlgorithmLocked(mining.clone()))
        );
        assert!(matches!(
            unlock_algorithm(&mut state, &catalog, &mining),
            Err(ActionError::InsufficientFunds { .. })
        ));
        state.cash = Decimal::new(10_000, 0);
        unlock_algorithm(&mut state, &catalog, &mining).unwrap();
        assert_eq!(state.cash, Decimal::new(2_000, 0));
        assert_eq!(
            unlock_algorithm(&mut state, &catalog, &mining),
            Err(ActionError::AlgorithmAlreadyUnlocked(mining.clone()))
        );
        set_active_algorithm(&mut state, &catalog, &mining).unwrap();
        assert_eq!(state.active_algorithm, mining);
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let (_, mut state) = fresh();
        assert_eq!(rename_company(&mut state, "   "), Err(ActionError::BlankName));
        rename_company(&mut state, "  Tensor Forge ").unwrap();
        assert_eq!(state.company.name, "Tensor Forge");
    }

    #[test]
    fn ipo_raises_capital_once() {
        let (_, mut state) = fresh();
        let cfg = MarketConfig::default();
        state.company.valuation = Decimal::new(12_000_000, 0);
        let proceeds = request_ipo(&mut state, &cfg).unwrap();
        assert_eq!(proceeds.capital_raised, Decimal::new(2_400_000, 0));
        assert_eq!(state.cash, Decimal::new(2_405_000, 0));
        assert_eq!(state.company.share_price, Decimal::new(12, 0));
        let before = state.clone();
        assert_eq!(request_ipo(&mut state, &cfg), Err(ActionError::AlreadyPublic));
        assert_eq!(state, before);
    }

    #[test]
    fn unlocking_a_facility_switches_to_it() {
        let (_, mut state) = fresh();
        let warehouse = FacilityId::new(ids::LOC_WAREHOUSE);
        assert_eq!(
            switch_facility(&mut state, &warehouse),
            Err(ActionError::FacilityLocked(warehouse.clone()))
        );
        assert!(matches!(
            unlock_facility(&mut state, &warehouse),
            Err(ActionError::InsufficientFunds { .. })
        ));
        state.cash = Decimal::new(200_000, 0);
        unlock_facility(&mut state, &warehouse).unwrap();
        assert_eq!(state.cash, Decimal::new(50_000, 0));
        assert_eq!(state.current_facility, warehouse);
        assert_eq!(
            unlock_facility(&mut state, &warehouse),
            Err(ActionError::FacilityAlreadyUnlocked(warehouse))
        );
        switch_facility(&mut state, &garage()).unwrap();
        assert_eq!(state.current_facility, garage());
    }

    #[test]
    fn dispatch_maps_outcomes() {
        let (catalog, mut state) = fresh();
        let cfg = SimConfig::default();
        let placed = apply_action(
            &mut state,
            &catalog,
            &cfg,
            Action::PlaceAsset {
                facility: garage(),
                asset_type: a100(),
                x: 0.5,
                y: 0.5,
                orientation: Orientation::West,
            },
        )
        .unwrap();
        let ActionOutcome::Placed(id) = placed else {
            panic!("expected Placed");
        };
        let facility = state.viewed_facility().unwrap();
        assert_eq!(facility.asset(id).map(|a| a.orientation), Some(Orientation::West));
        assert_eq!(
            apply_action(&mut state, &catalog, &cfg, Action::HireEmployee),
            Ok(ActionOutcome::Hired { employees: 1 })
        );
        assert_eq!(
            apply_action(
                &mut state,
                &catalog,
                &cfg,
                Action::RemoveAsset {
                    facility: garage(),
                    asset: id,
                    mode: RemovalMode::Sell
                }
            ),
            Ok(ActionOutcome::Sold {
                refund: Decimal::new(750, 0)
            })
        );
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        let kinds = prop::sample::select(vec![
            ids::GPU_A100,
            ids::GPU_H100,
            ids::COOLING_CRAC_STD,
            ids::POWER_DIESEL_GEN,
            "NOPE",
        ]);
        let facilities = prop::sample::select(vec![ids::LOC_GARAGE, ids::LOC_WAREHOUSE, "loc_moon"]);
        let algos = prop::sample::select(vec![ids::BASIC_INFERENCE, ids::CRYPTO_MINING, "NOPE"]);
        prop_oneof![
            (kinds, -6i32..6, -6i32..6, prop::sample::select(Orientation::ALL.to_vec())).prop_map(
                |(k, x, y, orientation)| Action::PlaceAsset {
                    facility: FacilityId::new(ids::LOC_GARAGE),
                    asset_type: AssetTypeId::new(k),
                    x: f64::from(x) + 0.5,
                    y: f64::from(y) + 0.5,
                    orientation,
                }
            ),
            (1u64..6, any::<bool>()).prop_map(|(n, sell)| Action::RemoveAsset {
                facility: FacilityId::new(ids::LOC_GARAGE),
                asset: AssetId(n),
                mode: if sell { RemovalMode::Sell } else { RemovalMode::Move },
            }),
            (1u64..4).prop_map(|n| Action::SignContract(ContractId(n))),
            algos.clone().prop_map(|a| Action::SetActiveAlgorithm(AlgorithmId::new(a))),
            algos.prop_map(|a| Action::UnlockAlgorithm(AlgorithmId::new(a))),
            Just(()).prop_map(|_| Action::HireEmployee),
            prop::sample::select(vec!["", " ", "Fab Nine"])
                .prop_map(|n| Action::RenameCompany(n.to_string())),
            Just(()).prop_map(|_| Action::RequestIpo),
            facilities.clone().prop_map(|f| Action::UnlockFacility(FacilityId::new(f))),
            facilities.prop_map(|f| Action::SwitchFacility(FacilityId::new(f))),
        ]
    }

    proptest! {
        #[test]
        fn failed_actions_never_mutate(actions in prop::collection::vec(arb_action(), 1..40)) {
            let (catalog, mut state) = fresh();
            let cfg = SimConfig::default();
            offer(&mut state, 0);
            offer(&mut state, 1);
            offer(&mut state, 3);
            for action in actions {
                let before = state.clone();
                match apply_action(&mut state, &catalog, &cfg, action) {
                    Ok(_) => {}
                    Err(ActionError::CarriedRejected { .. }) => unreachable!(),
                    Err(_) => prop_assert_eq!(&state, &before),
                }
                prop_assert!(state.company.active_contracts.len() <= state.company.management_capacity());
                prop_assert!(state.unlocked_algorithms.contains(&state.active_algorithm));
            }
        }
    }
}
