//! Share price and IPO.
//!
//! A private company is priced at its fundamental value. Once listed the
//! price chases a target that is the fundamental value clamped to a band
//! around the IPO price, closing a fixed fraction of the gap each tick.

use crate::actions::ActionError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Company, Listing, MarketConfig};
use tracing::info;

/// Valuation per share; zero when there are no shares.
pub fn fundamental_price(valuation: Decimal, shares: u64) -> Decimal {
    if shares == 0 {
        return Decimal::ZERO;
    }
    valuation / Decimal::from(shares)
}

/// Fundamental price held inside `[max(0, ipo - below), ipo + above]`.
pub fn target_price(fundamental: Decimal, ipo_price: Decimal, cfg: &MarketConfig) -> Decimal {
    let floor = (ipo_price - cfg.band_below_ipo).max(Decimal::ZERO);
    let ceiling = ipo_price + cfg.band_above_ipo;
    // not `clamp`: a misconfigured band with floor > ceiling must not panic
    fundamental.max(floor).min(ceiling)
}

/// Share price after this tick's valuation.
pub fn next_share_price(company: &Company, valuation: Decimal, cfg: &MarketConfig) -> Decimal {
    let fundamental = fundamental_price(valuation, company.shares_outstanding);
    match company.listing {
        Listing::Private => fundamental,
        Listing::Public { ipo_price } => {
            let target = target_price(fundamental, ipo_price, cfg);
            company.share_price + cfg.price_smoothing * (target - company.share_price)
        }
    }
}

/// Result of a successful listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpoProceeds {
    pub ipo_price: Decimal,
    pub capital_raised: Decimal,
}

/// Terms of listing the company at its last valuation.
pub fn ipo_terms(company: &Company, cfg: &MarketConfig) -> Result<IpoProceeds, ActionError> {
    if company.is_public() {
        return Err(ActionError::AlreadyPublic);
    }
    if company.valuation < cfg.ipo_threshold {
        return Err(ActionError::BelowIpoThreshold {
            valuation: company.valuation,
            threshold: cfg.ipo_threshold,
        });
    }
    Ok(IpoProceeds {
        ipo_price: fundamental_price(company.valuation, company.shares_outstanding),
        capital_raised: company.valuation * cfg.ipo_capital_fraction,
    })
}

/// List the company. Irreversible.
pub(crate) fn go_public(company: &mut Company, proceeds: &IpoProceeds) {
    company.listing = Listing::Public {
        ipo_price: proceeds.ipo_price,
    };
    company.share_price = proceeds.ipo_price;
    info!(company = %company.name, ipo_price = %proceeds.ipo_price, raised = %proceeds.capital_raised, "company went public");
}
