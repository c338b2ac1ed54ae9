//! Company valuation.

use rust_decimal::Decimal;
use sim_core::MarketConfig;

/// Cash plus depreciated hardware plus a multiple of positive run-rate
/// profit. Losses never reduce the earnings component below zero.
pub fn valuation(cash: Decimal, asset_value: Decimal, net: Decimal, cfg: &MarketConfig) -> Decimal {
    let earnings = net.max(Decimal::ZERO) * cfg.run_rate_factor * cfg.earnings_multiple;
    cash + asset_value + earnings
}
