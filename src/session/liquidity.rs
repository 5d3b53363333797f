//! Built-in liquidity provider.
//!
//! When enabled for a security, the session quotes a standing bid and ask
//! around a reference price so a thin student-only book still has something
//! to trade against. It never crosses its own quotes and replaces both
//! sides atomically on every refresh so it can never be picked off between
//! a stale bid and a fresh ask.

use crate::{Price, Quantity, Side, TimeInForce, UserId};

use super::matching::SecurityEngine;

/// The reserved user id the liquidity provider trades under. Never assigned
/// to a real student or instructor.
pub const LIQUIDITY_PROVIDER_USER: UserId = UserId(0);

/// Configuration for one security's liquidity provider.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquidityConfig {
    pub enabled: bool,
    /// Half-spread, in ticks, quoted around the reference price.
    pub spread_ticks: i64,
    /// Size quoted on each side.
    pub quote_size: Quantity,
    /// Smallest price increment for this security (used to convert
    /// `spread_ticks` into a price offset).
    pub tick_size: i64,
}

impl LiquidityConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            spread_ticks: 0,
            quote_size: 0,
            tick_size: 1,
        }
    }

    pub fn new(spread_ticks: i64, quote_size: Quantity, tick_size: i64) -> Self {
        Self {
            enabled: true,
            spread_ticks,
            quote_size,
            tick_size,
        }
    }
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Standing order ids the provider currently has resting, so a refresh can
/// cancel the old quote before posting a new one.
#[derive(Default)]
pub struct LiquidityQuotes {
    bid_order_id: Option<crate::OrderId>,
    ask_order_id: Option<crate::OrderId>,
}

/// Cancel any resting quotes, then post a fresh bid/ask pair around
/// `reference_price`, if the config is enabled.
///
/// Quotes are posted as GTC limit orders owned by
/// [`LIQUIDITY_PROVIDER_USER`]; the session engine excludes that id from
/// privilege checks and from student-facing portfolio views.
pub fn refresh(
    engine: &mut SecurityEngine,
    quotes: &mut LiquidityQuotes,
    config: &LiquidityConfig,
    reference_price: Price,
) {
    if let Some(id) = quotes.bid_order_id.take() {
        engine.cancel(id);
    }
    if let Some(id) = quotes.ask_order_id.take() {
        engine.cancel(id);
    }

    if !config.enabled || config.quote_size == 0 {
        return;
    }

    let offset = config.spread_ticks.max(1) * config.tick_size.max(1);
    let bid_price = Price(reference_price.0 - offset);
    let ask_price = Price(reference_price.0 + offset);

    if bid_price.0 <= 0 {
        return;
    }

    if let Ok(result) = engine.submit_limit(
        LIQUIDITY_PROVIDER_USER,
        Side::Buy,
        bid_price,
        config.quote_size,
        TimeInForce::GTC,
    ) {
        if result.resting_quantity > 0 {
            quotes.bid_order_id = Some(result.order_id);
        }
    }

    if let Ok(result) = engine.submit_limit(
        LIQUIDITY_PROVIDER_USER,
        Side::Sell,
        ask_price,
        config.quote_size,
        TimeInForce::GTC,
    ) {
        if result.resting_quantity > 0 {
            quotes.ask_order_id = Some(result.order_id);
        }
    }
}
