//! Contract terms and the offer → active → resolved state machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a contract, allocated by `GameState::allocate_contract_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract-{}", self.0)
    }
}

/// Category tag of a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Retention,
    TrainingRun,
}

/// Immutable terms agreed when an offer is minted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub client: String,
    pub task: String,
    /// Effective compute that must be available when the contract ends.
    pub required_compute: u64,
    /// Staff needed to sign.
    pub required_employees: u32,
    /// Length of the contract in ticks.
    pub duration_ticks: u32,
    /// Paid in full on success.
    pub total_value: Decimal,
    /// Charged on failure.
    pub penalty: Decimal,
    pub kind: ContractKind,
}

/// Where a contract is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ContractPhase {
    /// In the offer pool, unsigned.
    Offered,
    /// Signed and counting down.
    Active { remaining_ticks: u32 },
}

/// How a contract ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Requirement met on the final tick.
    Fulfilled,
    /// Requirement missed on the final tick.
    Breached,
}

/// Cash effect of a resolved contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub contract: ContractId,
    pub client: String,
    pub outcome: Outcome,
    /// Positive payout on success, negative penalty on failure.
    pub amount: Decimal,
}

/// Illegal lifecycle transitions.
#[derive(Debug, Error, PartialEq)]
pub enum ContractError {
    #[error("{0} is not an open offer")]
    NotOffered(ContractId),
    #[error("{0} is not active")]
    NotActive(ContractId),
    #[error("{0} still has ticks remaining")]
    NotDue(ContractId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub terms: ContractTerms,
    phase: ContractPhase,
}

impl Contract {
    /// A fresh, unsigned offer.
    pub fn offer(id: ContractId, terms: ContractTerms) -> Self {
        Self {
            id,
            terms,
            phase: ContractPhase::Offered,
        }
    }

    pub fn phase(&self) -> ContractPhase {
        self.phase
    }

    pub fn is_offered(&self) -> bool {
        self.phase == ContractPhase::Offered
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, ContractPhase::Active { .. })
    }

    /// Ticks left while active.
    pub fn remaining_ticks(&self) -> Option<u32> {
        match self.phase {
            ContractPhase::Active { remaining_ticks } => Some(remaining_ticks),
            ContractPhase::Offered => None,
        }
    }

    /// Offered → Active with the full duration remaining.
    pub fn sign(&mut self) -> Result<(), ContractError> {
        if !self.is_offered() {
            return Err(ContractError::NotOffered(self.id));
        }
        self.phase = ContractPhase::Active {
            remaining_ticks: self.terms.duration_ticks,
        };
        Ok(())
    }

    /// Count down one tick.
    pub fn advance(&mut self) -> Result<(), ContractError> {
        match &mut self.phase {
            ContractPhase::Active { remaining_ticks } => {
                *remaining_ticks = remaining_ticks.saturating_sub(1);
                Ok(())
            }
            ContractPhase::Offered => Err(ContractError::NotActive(self.id)),
        }
    }

    /// Whether the contract has run out and must resolve this tick.
    pub fn is_due(&self) -> bool {
        self.phase == ContractPhase::Active { remaining_ticks: 0 }
    }

    /// Resolve a due contract against the effective compute available now.
    ///
    /// Only the compute at this instant counts; earlier ticks are not
    /// integrated.
    pub fn settle(&self, effective_compute: f64) -> Result<Settlement, ContractError> {
        if !self.is_active() {
            return Err(ContractError::NotActive(self.id));
        }
        if !self.is_due() {
            return Err(ContractError::NotDue(self.id));
        }
        let (outcome, amount) = if effective_compute >= self.terms.required_compute as f64 {
            (Outcome::Fulfilled, self.terms.total_value)
        } else {
            (Outcome::Breached, -self.terms.penalty)
        };
        Ok(Settlement {
            contract: self.id,
            client: self.terms.client.clone(),
            outcome,
            amount,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_terms() -> ContractTerms {
    ContractTerms {
        client: "Anthropic".into(),
        task: "Protein Folding Simulation".into(),
        required_compute: 1000,
        required_employees: 4,
        duration_ticks: 2,
        total_value: Decimal::new(90_000, 0),
        penalty: Decimal::new(13_500, 0),
        kind: ContractKind::TrainingRun,
    }
}
