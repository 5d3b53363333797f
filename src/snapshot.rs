//! Book snapshots for market data.

use crate::{OrderBook, Price, Quantity, Timestamp};

/// A snapshot of the order book at a point in time.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookSnapshot {
    /// Bid levels (highest price first)
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels (lowest price first)
    pub asks: Vec<LevelSnapshot>,
    /// Timestamp when snapshot was taken
    pub timestamp: Timestamp,
}

impl BookSnapshot {
    /// Returns the best bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    /// Returns the best ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    /// Returns the spread (best ask - best bid), if both exist.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.0 - bid.0),
            _ => None,
        }
    }

    /// Check if the snapshotted book is crossed (best bid >= best ask).
    pub fn is_crossed_view(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Returns the mid price ((best bid + best ask) / 2), if both exist.
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.0 + ask.0) as f64 / 2.0),
            _ => None,
        }
    }

    /// Returns total bid quantity across all levels.
    pub fn total_bid_quantity(&self) -> Quantity {
        self.bids.iter().map(|l| l.quantity).sum()
    }

    /// Returns total ask quantity across all levels.
    pub fn total_ask_quantity(&self) -> Quantity {
        self.asks.iter().map(|l| l.quantity).sum()
    }

    /// Order book imbalance: `(bid_qty - ask_qty) / (bid_qty + ask_qty)`.
    ///
    /// Returns a value in `[-1.0, 1.0]`:
    /// - `+1.0` = all liquidity on bid side (buy pressure)
    /// - `-1.0` = all liquidity on ask side (sell pressure)
    /// - `0.0` = balanced
    ///
    /// Returns `None` if the book is empty on both sides.
    pub fn imbalance(&self) -> Option<f64> {
        let bid_qty = self.total_bid_quantity();
        let ask_qty = self.total_ask_quantity();
        let total = bid_qty + ask_qty;
        if total == 0 {
            return None;
        }
        Some((bid_qty as f64 - ask_qty as f64) / total as f64)
    }

    /// Volume-weighted midpoint price.
    ///
    /// Weighted by the inverse of each side's quantity at the top of book:
    /// `(ask_qty * bid_price + bid_qty * ask_price) / (bid_qty + ask_qty)`
    ///
    /// This gives a midpoint that leans toward the side with less liquidity,
    /// reflecting where the next trade is more likely to occur.
    ///
    /// Returns `None` if either side has no levels.
    pub fn weighted_mid(&self) -> Option<f64> {
        let bid = self.bids.first()?;
        let ask = self.asks.first()?;
        let total = bid.quantity + ask.quantity;
        if total == 0 {
            return None;
        }
        Some(
            (ask.quantity as f64 * bid.price.0 as f64 + bid.quantity as f64 * ask.price.0 as f64)
                / total as f64,
        )
    }
}

/// A snapshot of a single price level.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelSnapshot {
    /// Price at this level
    pub price: Price,
    /// Total quantity at this level
    pub quantity: Quantity,
    /// Number of orders at this level
    pub order_count: usize,
}

impl OrderBook {
    /// Take a snapshot of the top N levels on each side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        fn snapshot_levels(levels: &crate::PriceLevels, depth: usize) -> Vec<LevelSnapshot> {
            levels
                .iter_best_to_worst()
                .take(depth)
                .map(|(price, level)| LevelSnapshot {
                    price: *price,
                    quantity: level.total_quantity(),
                    order_count: level.order_count(),
                })
                .collect()
        }

        BookSnapshot {
            bids: snapshot_levels(self.bids(), depth),
            asks: snapshot_levels(self.asks(), depth),
            timestamp: self.peek_next_order_id().0,
        }
    }

    /// Take a full snapshot of all levels.
    pub fn full_snapshot(&self) -> BookSnapshot {
        self.snapshot(usize::MAX)
    }
}
