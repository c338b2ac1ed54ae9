#![deny(warnings)]

//! Economic engine for Compute Tycoon.
//!
//! This crate turns a [`sim_core::GameState`] into the next one:
//! - Facility aggregation and power/thermal throttling
//! - Contract offers, signing, ageing and settlement
//! - Revenue, expenses, valuation and share price
//! - The player actions applied between ticks
//!
//! All randomness comes from an injected [`rand::Rng`], so seeding the
//! generator (the runtime uses `rand_chacha`) reproduces a run exactly.

pub mod actions;
pub mod engine;
pub mod facility;
pub mod generator;
pub mod ledger;
pub mod lifecycle;
pub mod market;
pub mod throttle;
pub mod valuation;

pub use actions::*;
pub use engine::{apply_tick, TickReport, TickSummary};
pub use facility::{aggregate, FacilityStats};
pub use ledger::Ledger;
pub use lifecycle::OfferChanges;
pub use throttle::PowerBalance;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sim_core::ContractError;
use thiserror::Error;

/// Errors produced while advancing a tick.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// The active algorithm is missing from the catalog.
    #[error("unknown active algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Numeric conversion to decimal failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
    /// Offers cannot be labelled without client and task names.
    #[error("catalog has no client or task labels")]
    NoContractLabels,
    /// A config value that `validate_config` rejects made a draw impossible.
    #[error("config value {0} is out of range")]
    InvalidConfig(&'static str),
    /// A contract was found in a phase its pool does not allow.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub(crate) fn to_decimal(value: f64) -> Result<Decimal, EconError> {
    if !value.is_finite() {
        return Err(EconError::NonFinite);
    }
    Decimal::from_f64(value).ok_or(EconError::NonFinite)
}

/// Round to a whole amount, halves away from zero.
pub(crate) fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
