//! Static reference data: hardware, algorithms, sites and contract labels.

use crate::{
    AlgorithmId, AlgorithmProfile, AssetCategory, AssetDefinition, AssetTypeId, ConfigError,
    FacilityId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifiers of the standard catalog entries.
pub mod ids {
    pub const GPU_A100: &str = "GPU_A100";
    pub const GPU_H100: &str = "GPU_H100";
    pub const GPU_B200: &str = "GPU_B200";
    pub const TPU_V5P: &str = "TPU_V5P";
    pub const RACK_HGX_H200: &str = "RACK_HGX_H200";
    pub const RACK_GB200_NVL72: &str = "RACK_GB200_NVL72";
    pub const TPU_V6_TRILLIUM: &str = "TPU_V6_TRILLIUM";

    pub const COOLING_CRAC_STD: &str = "COOLING_CRAC_STD";
    pub const COOLING_IN_ROW: &str = "COOLING_IN_ROW";
    pub const COOLING_IMMERSION_TANK: &str = "COOLING_IMMERSION_TANK";
    pub const COOLING_CRYOGENIC: &str = "COOLING_CRYOGENIC";

    pub const POWER_DIESEL_GEN: &str = "POWER_DIESEL_GEN";
    pub const POWER_BATTERY_PACK: &str = "POWER_BATTERY_PACK";
    pub const POWER_SOLAR_ARRAY: &str = "POWER_SOLAR_ARRAY";
    pub const POWER_WIND_TURBINE: &str = "POWER_WIND_TURBINE";
    pub const POWER_HYDRO_STATION: &str = "POWER_HYDRO_STATION";
    pub const POWER_SMR_NUCLEAR: &str = "POWER_SMR_NUCLEAR";

    pub const BASIC_INFERENCE: &str = "BASIC_INFERENCE";
    pub const TRAINING_LLM: &str = "TRAINING_LLM";
    pub const CRYPTO_MINING: &str = "CRYPTO_MINING";
    pub const SCIENTIFIC_SIM: &str = "SCIENTIFIC_SIM";
    pub const AGI_RESEARCH: &str = "AGI_RESEARCH";

    pub const LOC_GARAGE: &str = "loc_garage";
    pub const LOC_WAREHOUSE: &str = "loc_warehouse";
    pub const LOC_UNDERWATER: &str = "loc_underwater";
    pub const LOC_DESERT: &str = "loc_desert";
}

/// Template a facility is created from at game start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacilitySite {
    pub id: FacilityId,
    pub name: String,
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Acquisition cost.
    pub cost: Decimal,
    /// Whether the site is owned from the start.
    #[serde(default)]
    pub unlocked: bool,
}

/// Read-only lookup tables shared by every part of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub assets: BTreeMap<AssetTypeId, AssetDefinition>,
    pub algorithms: BTreeMap<AlgorithmId, AlgorithmProfile>,
    /// Algorithm unlocked and active in a new game.
    pub starter_algorithm: AlgorithmId,
    pub sites: Vec<FacilitySite>,
    /// Client labels drawn for contract offers.
    pub clients: Vec<String>,
    /// Task labels drawn for contract offers.
    pub tasks: Vec<String>,
}

impl Catalog {
    pub fn asset(&self, id: &AssetTypeId) -> Option<&AssetDefinition> {
        self.assets.get(id)
    }

    pub fn algorithm(&self, id: &AlgorithmId) -> Option<&AlgorithmProfile> {
        self.algorithms.get(id)
    }

    /// Parse a catalog from YAML. The result is not validated.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The hardware, workloads and sites shipped with the game.
    pub fn standard() -> Self {
        let assets = [
            compute(ids::GPU_A100, "Nvidia A100 (80GB)", 1500, 22.0, 10.0, 0.5),
            compute(ids::GPU_H100, "Nvidia H100 Hopper", 8500, 90.0, 25.0, 0.8),
            compute(ids::GPU_B200, "Nvidia B200 Blackwell", 28500, 250.0, 45.0, 1.2),
            compute(ids::TPU_V5P, "Google TPU v5p Pod", 45000, 550.0, 70.0, 2.0),
            compute(ids::RACK_HGX_H200, "HGX H200 Cluster", 120000, 1100.0, 100.0, 9.0),
            compute(ids::RACK_GB200_NVL72, "Nvidia GB200 NVL72", 650000, 7000.0, 600.0, 100.0),
            compute(ids::TPU_V6_TRILLIUM, "TPU v6 Trillium", 1_200_000, 13500.0, 1000.0, 180.0),
            cooling(ids::COOLING_CRAC_STD, "CRAC Standard", 2000, 120.0, 3.0, 5),
            cooling(ids::COOLING_IN_ROW, "In-Row Cooling", 6500, 400.0, 8.0, 15),
            cooling(ids::COOLING_IMMERSION_TANK, "Immersion Tank", 25000, 1800.0, 15.0, 50),
            cooling(ids::COOLING_CRYOGENIC, "Cryogenic System", 85000, 6000.0, 120.0, 300),
            power(ids::POWER_DIESEL_GEN, "Diesel Generator", 1500, 150.0, 15.0, 12),
            power(ids::POWER_BATTERY_PACK, "Battery Megapack", 8000, 350.0, 5.0, 5),
            power(ids::POWER_SOLAR_ARRAY, "Industrial Solar Array", 15000, 200.0, 0.0, 2),
            power(ids::POWER_WIND_TURBINE, "Wind Turbine", 35000, 550.0, 5.0, 15),
            power(ids::POWER_HYDRO_STATION, "Mini Hydro Station", 250000, 4500.0, 20.0, 150),
            power(ids::POWER_SMR_NUCLEAR, "SMR Nuclear Reactor", 1_500_000, 45000.0, 1500.0, 5000),
        ]
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect();

        let algorithms = [
            algorithm(ids::BASIC_INFERENCE, "Basic Inference (Chatbot)", 80, 1.0, 1.0, 0),
            algorithm(ids::TRAINING_LLM, "LLM Training", 180, 1.4, 1.6, 15000),
            algorithm(ids::CRYPTO_MINING, "Crypto Mining", 140, 2.2, 2.5, 8000),
            algorithm(ids::SCIENTIFIC_SIM, "Scientific Simulation", 150, 1.1, 1.1, 35000),
            algorithm(ids::AGI_RESEARCH, "AGI Research", 450, 2.5, 2.5, 2_000_000),
        ]
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect();

        let sites = vec![
            site(ids::LOC_GARAGE, "Startup Garage", 10, 0, true),
            site(ids::LOC_WAREHOUSE, "Logistics Warehouse", 20, 150_000, false),
            site(ids::LOC_UNDERWATER, "Underwater Capsule", 30, 1_000_000, false),
            site(ids::LOC_DESERT, "Desert Gigafactory", 50, 10_000_000, false),
        ];

        let clients = [
            "OpenAI",
            "Anthropic",
            "DeepMind",
            "Meta AI",
            "Tesla",
            "Mistral",
            "Cohere",
            "Hugging Face",
            "Stability AI",
            "Midjourney",
            "Scale AI",
            "Databricks",
            "Snowflake",
            "Palantir",
            "Anduril",
        ];
        let tasks = [
            "GPT-5 Training",
            "Autonomous Driving Inference",
            "Protein Folding Simulation",
            "8K Video Generation",
            "Genomic Data Analysis",
            "Metaverse Rendering",
            "Financial Model Fine-tuning",
        ];

        Self {
            assets,
            algorithms,
            starter_algorithm: AlgorithmId::new(ids::BASIC_INFERENCE),
            sites,
            clients: clients.iter().map(|s| s.to_string()).collect(),
            tasks: tasks.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn blank(id: &str, name: &str, category: AssetCategory, cost: i64) -> AssetDefinition {
    AssetDefinition {
        id: AssetTypeId::new(id),
        name: name.to_string(),
        category,
        cost: Decimal::new(cost, 0),
        compute: 0.0,
        heat_generated: 0.0,
        energy_consumed: 0.0,
        cooling_provided: 0.0,
        energy_provided: 0.0,
        maintenance: Decimal::ZERO,
    }
}

fn compute(id: &str, name: &str, cost: i64, tflops: f64, heat: f64, energy: f64) -> AssetDefinition {
    AssetDefinition {
        compute: tflops,
        heat_generated: heat,
        energy_consumed: energy,
        ..blank(id, name, AssetCategory::Compute, cost)
    }
}

fn cooling(id: &str, name: &str, cost: i64, cooling: f64, energy: f64, upkeep: i64) -> AssetDefinition {
    AssetDefinition {
        cooling_provided: cooling,
        energy_consumed: energy,
        maintenance: Decimal::new(upkeep, 0),
        ..blank(id, name, AssetCategory::Cooling, cost)
    }
}

fn power(id: &str, name: &str, cost: i64, energy: f64, heat: f64, upkeep: i64) -> AssetDefinition {
    AssetDefinition {
        energy_provided: energy,
        heat_generated: heat,
        maintenance: Decimal::new(upkeep, 0),
        ..blank(id, name, AssetCategory::Power, cost)
    }
}

/// `revenue_cents` is revenue per unit of compute in hundredths.
fn algorithm(
    id: &str,
    name: &str,
    revenue_cents: i64,
    energy_multiplier: f64,
    heat_multiplier: f64,
    unlock_cost: i64,
) -> AlgorithmProfile {
    AlgorithmProfile {
        id: AlgorithmId::new(id),
        name: name.to_string(),
        revenue_per_unit: Decimal::new(revenue_cents, 2),
        energy_multiplier,
        heat_multiplier,
        unlock_cost: Decimal::new(unlock_cost, 0),
    }
}

fn site(id: &str, name: &str, grid_size: u32, cost: i64, unlocked: bool) -> FacilitySite {
    FacilitySite {
        id: FacilityId::new(id),
        name: name.to_string(),
        grid_size,
        cost: Decimal::new(cost, 0),
        unlocked,
    }
}
