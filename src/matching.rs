//! Matching engine: the core algorithm for executing trades.
//!
//! The matching engine implements price-time priority:
//! 1. Better prices match first (higher bids, lower asks)
//! 2. At the same price, earlier orders match first (FIFO)
//! 3. Trades execute at the resting order's price (price improvement for aggressor)

use crate::{Order, OrderBook, Price, Quantity, Side, Trade};

/// Result of matching an incoming order against the book.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// Trades that occurred during matching
    pub trades: Vec<Trade>,
    /// Quantity that could not be filled
    pub remaining_quantity: Quantity,
}

impl MatchResult {
    /// Returns the total quantity filled.
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// Returns true if the order was fully filled.
    pub fn is_fully_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Returns true if no trades occurred.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

impl OrderBook {
    /// Check if an incoming order's price crosses with a resting price.
    ///
    /// - Buy crosses if buy_price >= ask_price
    /// - Sell crosses if sell_price <= bid_price
    #[inline]
    fn prices_cross(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
        match incoming_side {
            Side::Buy => incoming_price >= resting_price,
            Side::Sell => incoming_price <= resting_price,
        }
    }

    /// Match an incoming order against the book.
    ///
    /// This is the core matching algorithm:
    /// 1. Find the best price on the opposite side
    /// 2. If prices cross, fill against resting orders (FIFO)
    /// 3. Continue until no more crosses or order is filled
    /// 4. Return trades and remaining quantity
    ///
    /// **Important**: This method modifies both the incoming order and
    /// resting orders in the book. The incoming order is NOT added to
    /// the book — the caller decides whether to add it based on TIF.
    pub fn match_order(&mut self, incoming: &mut Order) -> MatchResult {
        let mut result = MatchResult {
            trades: Vec::new(),
            remaining_quantity: incoming.remaining_quantity,
        };

        // Match until no more crosses or order is filled
        while incoming.remaining_quantity > 0 {
            // Get the best price on the opposite side
            let opposite = self.opposite_side(incoming.side);
            let best_price = match opposite.best_price() {
                Some(p) => p,
                None => break, // No liquidity
            };

            // Check if prices cross
            if !Self::prices_cross(incoming.side, incoming.price, best_price) {
                break; // No match at this price
            }

            // Match against orders at the best price level
            self.match_at_price(incoming, best_price, &mut result);
        }

        result.remaining_quantity = incoming.remaining_quantity;
        result
    }

    /// Match an incoming order against all orders at a specific price level.
    fn match_at_price(&mut self, incoming: &mut Order, price: Price, result: &mut MatchResult) {
        // Process orders at this price level until exhausted or incoming filled
        while incoming.remaining_quantity > 0 {
            // Get the front order at this price (skips tombstones)
            let opposite = self.opposite_side_mut(incoming.side);
            let resting_id = match opposite.get_level_mut(price).and_then(|l| l.front()) {
                Some(id) => id,
                _ => break, // Level exhausted or only tombstones left
            };

            // Get the resting order's remaining quantity
            let resting_remaining = match self.get_order(resting_id) {
                Some(o) => o.remaining_quantity,
                None => {
                    // Orphaned order ID in level — shouldn't happen, but handle gracefully
                    self.opposite_side_mut(incoming.side)
                        .get_level_mut(price)
                        .map(|l| l.pop_front(0));
                    continue;
                }
            };

            // Calculate fill quantity
            let fill_qty = incoming.remaining_quantity.min(resting_remaining);

            // Create the trade
            let trade = Trade::new(
                self.next_trade_id(),
                price, // Trade at resting order's price
                fill_qty,
                incoming.id,
                resting_id,
                incoming.side,
                self.next_timestamp(),
            );
            result.trades.push(trade);

            // Update the incoming order
            incoming.fill(fill_qty);

            // Update the resting order
            let resting_fully_filled = {
                let resting = self
                    .get_order_mut(resting_id)
                    .expect("invariant: resting order exists in book");
                resting.fill(fill_qty);
                resting.remaining_quantity == 0
            };

            // Update the price level
            let opposite = self.opposite_side_mut(incoming.side);
            if resting_fully_filled {
                // Remove the fully filled order from the level
                if let Some(level) = opposite.get_level_mut(price) {
                    level.pop_front(fill_qty);
                    if level.is_empty() {
                        opposite.remove_level(price);
                    }
                }
            } else {
                // Just decrease the level's quantity
                if let Some(level) = opposite.get_level_mut(price) {
                    level.decrease_quantity(fill_qty);
                }
            }
        }
    }

    /// Calculate how much quantity is available at prices that would cross.
    ///
    /// This is used for FOK (fill-or-kill) feasibility checks.
    pub fn available_to_fill(&self, side: Side, price: Price) -> Quantity {
        self.opposite_side(side).quantity_at_or_better(price)
    }

    /// Check if an order can be fully filled (for FOK orders).
    pub fn can_fully_fill(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        self.available_to_fill(side, price) >= quantity
    }
}
