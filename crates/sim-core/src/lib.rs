#![deny(warnings)]

//! Core domain models and invariants for Compute Tycoon.
//!
//! This crate defines the serializable state advanced by the simulation
//! (facilities, placed hardware, algorithms, contracts and the company) with
//! validation helpers that guarantee the invariants the engine relies on.

pub mod catalog;
pub mod config;
pub mod contract;

pub use catalog::*;
pub use config::*;
pub use contract::*;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Distance under which two placements are considered the same grid slot.
pub const SLOT_TOLERANCE: f64 = 0.1;

/// Unique identifier for an asset type in the catalog, e.g. "GPU_H100".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetTypeId(pub String);

/// Unique identifier for a workload algorithm, e.g. "TRAINING_LLM".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlgorithmId(pub String);

/// Unique identifier for a facility, e.g. "loc_garage".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub String);

/// Identifier of a single placed asset, allocated by [`GameState::allocate_asset_id`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u64);

macro_rules! string_id {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

string_id!(AssetTypeId, AlgorithmId, FacilityId);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset-{}", self.0)
    }
}

/// Broad role of a piece of hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Produces compute; draws power and generates heat.
    Compute,
    /// Removes heat.
    Cooling,
    /// Provides energy capacity.
    Power,
}

/// Catalog entry describing what one placed unit contributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    /// Asset type identifier.
    pub id: AssetTypeId,
    /// Display name.
    pub name: String,
    /// Category of the asset.
    pub category: AssetCategory,
    /// Purchase price.
    pub cost: Decimal,
    /// Compute throughput (TFLOPS).
    #[serde(default)]
    pub compute: f64,
    /// Thermal units generated per tick.
    #[serde(default)]
    pub heat_generated: f64,
    /// Energy consumed per tick (kW).
    #[serde(default)]
    pub energy_consumed: f64,
    /// Thermal units removed per tick.
    #[serde(default)]
    pub cooling_provided: f64,
    /// Energy capacity provided (kW).
    #[serde(default)]
    pub energy_provided: f64,
    /// Upkeep charged every tick.
    #[serde(default)]
    pub maintenance: Decimal,
}

/// Facing of a placed asset on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Clockwise from North.
    pub const ALL: [Orientation; 4] = [Self::North, Self::East, Self::South, Self::West];
}

/// One unit of hardware placed inside a facility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedAsset {
    pub id: AssetId,
    pub asset_type: AssetTypeId,
    pub x: f64,
    pub y: f64,
    pub orientation: Orientation,
}

/// A site with a square placement grid centered on the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Facility identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Side length of the grid in slots.
    pub grid_size: u32,
    /// Hardware placed here; order carries no meaning.
    pub assets: Vec<PlacedAsset>,
    /// Locked facilities are invisible to the simulation.
    pub unlocked: bool,
    /// Acquisition cost.
    pub cost: Decimal,
}

impl Facility {
    /// Whether `(x, y)` lies strictly inside the grid.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let half = f64::from(self.grid_size) / 2.0;
        x.is_finite() && y.is_finite() && x > -half && x < half && y > -half && y < half
    }

    /// Whether an asset already sits within [`SLOT_TOLERANCE`] of `(x, y)`.
    pub fn is_occupied(&self, x: f64, y: f64) -> bool {
        self.assets
            .iter()
            .any(|a| (a.x - x).abs() < SLOT_TOLERANCE && (a.y - y).abs() < SLOT_TOLERANCE)
    }

    /// Placed asset with the given id.
    pub fn asset(&self, id: AssetId) -> Option<&PlacedAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Total number of slots on the grid.
    pub fn slot_count(&self) -> u32 {
        self.grid_size.saturating_mul(self.grid_size)
    }
}

/// Workload profile trading revenue against power and heat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmProfile {
    pub id: AlgorithmId,
    pub name: String,
    /// Revenue per unit of effective compute per tick.
    pub revenue_per_unit: Decimal,
    /// Multiplier on baseline energy draw (> 0).
    pub energy_multiplier: f64,
    /// Multiplier on baseline heat output (> 0).
    pub heat_multiplier: f64,
    /// Price to unlock.
    pub unlock_cost: Decimal,
}

/// Company reputation, always within `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Reputation(u8);

impl Reputation {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn raise(&mut self, by: u8) {
        self.0 = self.0.saturating_add(by).min(Self::MAX);
    }

    pub fn lower(&mut self, by: u8) {
        self.0 = self.0.saturating_sub(by);
    }
}

impl From<u8> for Reputation {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Reputation> for u8 {
    fn from(r: Reputation) -> Self {
        r.0
    }
}

/// Whether the company trades publicly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Listing {
    #[default]
    Private,
    /// Listed; `ipo_price` is fixed at the IPO and anchors the price band.
    Public { ipo_price: Decimal },
}

/// The player's company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Brand name.
    pub name: String,
    /// Private or public (with IPO reference price).
    pub listing: Listing,
    /// Current share price.
    pub share_price: Decimal,
    /// Shares outstanding; constant for the lifetime of a run.
    pub shares_outstanding: u64,
    /// Valuation computed on the last tick.
    pub valuation: Decimal,
    /// Staff count.
    pub employees: u32,
    /// Reputation score.
    pub reputation: Reputation,
    /// Signed contracts counting down.
    pub active_contracts: Vec<Contract>,
    /// Unsigned offers.
    pub available_contracts: Vec<Contract>,
}

impl Company {
    /// Maximum number of simultaneously active contracts.
    pub fn management_capacity(&self) -> usize {
        1 + self.employees as usize
    }

    pub fn is_public(&self) -> bool {
        matches!(self.listing, Listing::Public { .. })
    }

    pub fn ipo_price(&self) -> Option<Decimal> {
        match self.listing {
            Listing::Public { ipo_price } => Some(ipo_price),
            Listing::Private => None,
        }
    }
}

/// Root of all mutable simulation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Cash balance; may go negative.
    pub cash: Decimal,
    /// All facilities, locked or not.
    pub facilities: Vec<Facility>,
    /// Facility currently shown to the player.
    pub current_facility: FacilityId,
    /// Algorithms available for activation; only grows.
    pub unlocked_algorithms: BTreeSet<AlgorithmId>,
    /// The single active algorithm.
    pub active_algorithm: AlgorithmId,
    /// Company state.
    pub company: Company,
    /// Number of ticks applied so far.
    pub tick: u64,
    /// Wall-clock time the last tick was published, if any.
    pub last_tick_at: Option<DateTime<Utc>>,
    /// Next value handed out by [`GameState::allocate_asset_id`].
    pub next_asset_id: u64,
    /// Next value handed out by [`GameState::allocate_contract_id`].
    pub next_contract_id: u64,
}

impl GameState {
    /// Fresh game with the catalog's sites and starter algorithm.
    pub fn new_game(catalog: &Catalog, start: &StartConfig) -> Self {
        let facilities: Vec<Facility> = catalog
            .sites
            .iter()
            .map(|s| Facility {
                id: s.id.clone(),
                name: s.name.clone(),
                grid_size: s.grid_size,
                assets: Vec::new(),
                unlocked: s.unlocked,
                cost: s.cost,
            })
            .collect();
        let current_facility = facilities
            .iter()
            .find(|f| f.unlocked)
            .map(|f| f.id.clone())
            .unwrap_or_else(|| FacilityId::new(""));
        let mut unlocked_algorithms = BTreeSet::new();
        unlocked_algorithms.insert(catalog.starter_algorithm.clone());
        Self {
            cash: start.cash,
            facilities,
            current_facility,
            unlocked_algorithms,
            active_algorithm: catalog.starter_algorithm.clone(),
            company: Company {
                name: start.company_name.clone(),
                listing: Listing::Private,
                share_price: start.share_price,
                shares_outstanding: start.shares_outstanding,
                valuation: start.cash,
                employees: 0,
                reputation: Reputation::new(start.reputation),
                active_contracts: Vec::new(),
                available_contracts: Vec::new(),
            },
            tick: 0,
            last_tick_at: None,
            next_asset_id: 1,
            next_contract_id: 1,
        }
    }

    pub fn facility(&self, id: &FacilityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| &f.id == id)
    }

    /// Facilities that take part in the simulation.
    pub fn unlocked_facilities(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter().filter(|f| f.unlocked)
    }

    /// The facility the player is looking at.
    pub fn viewed_facility(&self) -> Option<&Facility> {
        self.facility(&self.current_facility)
    }

    pub fn allocate_asset_id(&mut self) -> AssetId {
        let id = AssetId(self.next_asset_id);
        self.next_asset_id += 1;
        id
    }

    pub fn allocate_contract_id(&mut self) -> ContractId {
        let id = ContractId(self.next_contract_id);
        self.next_contract_id += 1;
        id
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price or cost must be non-negative.
    #[error("negative monetary value in {0}")]
    NegativeMoney(String),
    /// Physical stats must be finite and non-negative.
    #[error("invalid physical stat in {0}")]
    InvalidStat(String),
    /// Algorithm multipliers must be strictly positive.
    #[error("multipliers of algorithm {0} must be finite and > 0")]
    NonPositiveMultiplier(String),
    /// Referenced asset type not present in the catalog.
    #[error("unknown asset type: {0}")]
    UnknownAssetType(String),
    /// Referenced algorithm not present in the catalog.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Referenced facility does not exist.
    #[error("unknown facility: {0}")]
    UnknownFacility(String),
    /// The same identifier appears twice.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// A reference list needed for random draws is empty.
    #[error("{0} list is empty")]
    EmptyList(&'static str),
    /// No facility is unlocked at game start.
    #[error("catalog has no initially unlocked facility")]
    NoStartingFacility,
    /// Offer pool above its cap.
    #[error("offer pool holds {len} entries, limit is {max}")]
    OfferPoolOverflow { len: usize, max: usize },
    /// Active contracts above management capacity.
    #[error("{active} active contracts exceed management capacity {capacity}")]
    ManagementOverflow { active: usize, capacity: usize },
    /// Contract sits in the pool that does not match its phase.
    #[error("contract {0} is in the wrong pool for its phase")]
    MisplacedContract(ContractId),
    /// Active algorithm has not been unlocked.
    #[error("active algorithm {0} is not unlocked")]
    AlgorithmLocked(String),
    /// The viewed facility is locked.
    #[error("current facility {0} is locked")]
    FacilityLocked(String),
    /// Shares outstanding must be positive.
    #[error("shares outstanding must be > 0")]
    NoShares,
    /// Two placed assets share an id.
    #[error("asset id {0} is used twice")]
    DuplicateAssetId(AssetId),
    /// Two contracts share an id, in the same pool or across pools.
    #[error("contract id {0} is used twice")]
    DuplicateContractId(ContractId),
    /// The asset id counter would hand out an id already in use.
    #[error("next asset id {next} is not above existing id {max}")]
    StaleAssetCounter { next: u64, max: u64 },
    /// The contract id counter would hand out an id already in use.
    #[error("next contract id {next} is not above existing id {max}")]
    StaleContractCounter { next: u64, max: u64 },
}

fn check_money(value: Decimal, what: &str) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(what.to_string()));
    }
    Ok(())
}

fn check_stat(value: f64, what: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidStat(what.to_string()));
    }
    Ok(())
}

/// Validate an asset definition.
pub fn validate_asset(def: &AssetDefinition) -> Result<(), ValidationError> {
    check_money(def.cost, def.id.as_str())?;
    check_money(def.maintenance, def.id.as_str())?;
    for stat in [
        def.compute,
        def.heat_generated,
        def.energy_consumed,
        def.cooling_provided,
        def.energy_provided,
    ] {
        check_stat(stat, def.id.as_str())?;
    }
    Ok(())
}

/// Validate an algorithm profile.
pub fn validate_algorithm(algo: &AlgorithmProfile) -> Result<(), ValidationError> {
    check_money(algo.revenue_per_unit, algo.id.as_str())?;
    check_money(algo.unlock_cost, algo.id.as_str())?;
    let positive = |m: f64| m.is_finite() && m > 0.0;
    if !positive(algo.energy_multiplier) || !positive(algo.heat_multiplier) {
        return Err(ValidationError::NonPositiveMultiplier(algo.id.0.clone()));
    }
    Ok(())
}

/// Validate the catalog, including cross-references like the starter algorithm.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    for (key, def) in &catalog.assets {
        if key != &def.id {
            return Err(ValidationError::DuplicateId(key.0.clone()));
        }
        validate_asset(def)?;
    }
    for (key, algo) in &catalog.algorithms {
        if key != &algo.id {
            return Err(ValidationError::DuplicateId(key.0.clone()));
        }
        validate_algorithm(algo)?;
    }
    if !catalog.algorithms.contains_key(&catalog.starter_algorithm) {
        return Err(ValidationError::UnknownAlgorithm(
            catalog.starter_algorithm.0.clone(),
        ));
    }
    let mut site_ids = BTreeSet::new();
    for site in &catalog.sites {
        if !site_ids.insert(&site.id) {
            return Err(ValidationError::DuplicateId(site.id.0.clone()));
        }
        check_money(site.cost, site.id.as_str())?;
    }
    if !catalog.sites.iter().any(|s| s.unlocked) {
        return Err(ValidationError::NoStartingFacility);
    }
    if catalog.clients.is_empty() {
        return Err(ValidationError::EmptyList("client"));
    }
    if catalog.tasks.is_empty() {
        return Err(ValidationError::EmptyList("task"));
    }
    Ok(())
}

/// Validate a game state against the catalog and the configured offer cap.
pub fn validate_state(
    state: &GameState,
    catalog: &Catalog,
    max_offers: usize,
) -> Result<(), ValidationError> {
    let mut facility_ids = BTreeSet::new();
    for f in &state.facilities {
        if !facility_ids.insert(&f.id) {
            return Err(ValidationError::DuplicateId(f.id.0.clone()));
        }
        for a in &f.assets {
            if catalog.asset(&a.asset_type).is_none() {
                return Err(ValidationError::UnknownAssetType(a.asset_type.0.clone()));
            }
        }
    }
    match state.viewed_facility() {
        None => {
            return Err(ValidationError::UnknownFacility(
                state.current_facility.0.clone(),
            ))
        }
        Some(f) if !f.unlocked => return Err(ValidationError::FacilityLocked(f.id.0.clone())),
        Some(_) => {}
    }
    for id in &state.unlocked_algorithms {
        if catalog.algorithm(id).is_none() {
            return Err(ValidationError::UnknownAlgorithm(id.0.clone()));
        }
    }
    if !state.unlocked_algorithms.contains(&state.active_algorithm) {
        return Err(ValidationError::AlgorithmLocked(
            state.active_algorithm.0.clone(),
        ));
    }

    let company = &state.company;
    if company.shares_outstanding == 0 {
        return Err(ValidationError::NoShares);
    }
    if company.available_contracts.len() > max_offers {
        return Err(ValidationError::OfferPoolOverflow {
            len: company.available_contracts.len(),
            max: max_offers,
        });
    }
    if company.active_contracts.len() > company.management_capacity() {
        return Err(ValidationError::ManagementOverflow {
            active: company.active_contracts.len(),
            capacity: company.management_capacity(),
        });
    }
    if let Some(c) = company.available_contracts.iter().find(|c| !c.is_offered()) {
        return Err(ValidationError::MisplacedContract(c.id));
    }
    if let Some(c) = company.active_contracts.iter().find(|c| !c.is_active()) {
        return Err(ValidationError::MisplacedContract(c.id));
    }
    check_ids(state)
}

/// Ids are unique and both counters sit above every id handed out so far.
fn check_ids(state: &GameState) -> Result<(), ValidationError> {
    let mut assets = BTreeSet::new();
    for a in state.facilities.iter().flat_map(|f| &f.assets) {
        if !assets.insert(a.id) {
            return Err(ValidationError::DuplicateAssetId(a.id));
        }
    }
    if let Some(max) = assets.last() {
        if state.next_asset_id <= max.0 {
            return Err(ValidationError::StaleAssetCounter {
                next: state.next_asset_id,
                max: max.0,
            });
        }
    }

    let company = &state.company;
    let mut contracts = BTreeSet::new();
    for c in company
        .available_contracts
        .iter()
        .chain(&company.active_contracts)
    {
        if !contracts.insert(c.id) {
            return Err(ValidationError::DuplicateContractId(c.id));
        }
    }
    if let Some(max) = contracts.last() {
        if state.next_contract_id <= max.0 {
            return Err(ValidationError::StaleContractCounter {
                next: state.next_contract_id,
                max: max.0,
            });
        }
    }
    Ok(())
}
