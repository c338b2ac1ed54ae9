//! Ageing, resolving and refreshing contracts.

use crate::generator::generate_offer;
use crate::EconError;
use rand::distributions::Bernoulli;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    Catalog, Contract, ContractConfig, ContractId, GameState, Outcome, Reputation, Settlement,
};
use tracing::{debug, info};

/// Count every active contract down by one tick and settle the ones that
/// ran out against the compute available right now.
///
/// Resolved contracts leave `active`; reputation moves with each outcome.
pub fn advance_active(
    active: &mut Vec<Contract>,
    effective_compute: f64,
    reputation: &mut Reputation,
    cfg: &ContractConfig,
) -> Result<Vec<Settlement>, EconError> {
    let mut settlements = Vec::new();
    let mut still_active = Vec::with_capacity(active.len());
    for mut contract in active.drain(..) {
        contract.advance()?;
        if !contract.is_due() {
            still_active.push(contract);
            continue;
        }
        let settlement = contract.settle(effective_compute)?;
        match settlement.outcome {
            Outcome::Fulfilled => reputation.raise(cfg.success_reputation),
            Outcome::Breached => reputation.lower(cfg.failure_reputation),
        }
        info!(contract = %settlement.contract, client = %settlement.client, outcome = ?settlement.outcome, amount = %settlement.amount, "contract resolved");
        settlements.push(settlement);
    }
    *active = still_active;
    Ok(settlements)
}

/// What happened to the offer pool this tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferChanges {
    pub expired: Option<ContractId>,
    pub minted: Option<ContractId>,
}

fn chance(p: f64, what: &'static str) -> Result<Bernoulli, EconError> {
    Bernoulli::new(p).map_err(|_| EconError::InvalidConfig(what))
}

/// Possibly expire the oldest offer, then possibly mint a new one if the
/// pool has room.
///
/// Both chances are rolled every tick, even when the roll cannot have an
/// effect, so the random stream does not depend on the pool size.
pub fn refresh_offers<R: Rng + ?Sized>(
    rng: &mut R,
    state: &mut GameState,
    raw_compute: f64,
    catalog: &Catalog,
    cfg: &ContractConfig,
) -> Result<OfferChanges, EconError> {
    let mut changes = OfferChanges::default();

    let expire = rng.sample(chance(cfg.expiry_chance, "contracts.expiry_chance")?);
    if expire && !state.company.available_contracts.is_empty() {
        let oldest = state.company.available_contracts.remove(0);
        debug!(contract = %oldest.id, "offer expired");
        changes.expired = Some(oldest.id);
    }

    let mint = rng.sample(chance(cfg.generation_chance, "contracts.generation_chance")?);
    if mint && state.company.available_contracts.len() < cfg.max_offers {
        let id = state.allocate_contract_id();
        let offer = generate_offer(rng, id, raw_compute, state.company.reputation, catalog, cfg)?;
        state.company.available_contracts.push(offer);
        changes.minted = Some(id);
    }

    Ok(changes)
}
