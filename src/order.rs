//! Order representation and lifecycle

use crate::{OrderId, Price, Quantity, SessionId, Side, Symbol, TimeInForce, Timestamp, UserId};

/// Status of an order in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Accepted, waiting for a trigger condition (stop / stop-limit orders only)
    PendingTrigger,
    /// Order accepted, resting on book (no fills yet)
    #[default]
    Pending,
    /// Some quantity filled, remainder still on book
    PartiallyFilled,
    /// Fully executed, no longer on book
    Filled,
    /// Removed by user request or TIF rules, no longer on book
    Cancelled,
    /// Rejected at submission time, never entered the book
    Rejected,
}

impl OrderStatus {
    /// Returns true if the order is still active (can be filled or cancelled).
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::PartiallyFilled | OrderStatus::PendingTrigger
        )
    }

    /// Returns true if the order is terminal (no further state changes).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// Kind of order, distinguishing how its price is determined and whether
/// it requires a trigger before it can match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Matches immediately at the best available price(s).
    Market,
    /// Rests at a specific limit price until matched or cancelled.
    #[default]
    Limit,
    /// Becomes a market order once the stop price trades.
    Stop,
    /// Becomes a limit order once the stop price trades.
    StopLimit,
}

/// An order in the order book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier assigned by exchange
    pub id: OrderId,
    /// Security this order is for
    pub security: Symbol,
    /// Session this order was submitted within
    pub session_id: SessionId,
    /// User that submitted the order
    pub user_id: UserId,
    /// Buy or sell
    pub side: Side,
    /// Market, limit, stop, or stop-limit
    pub order_type: OrderType,
    /// Limit price (max for buy, min for sell). Meaningless for pure market orders.
    pub price: Price,
    /// Trigger price for stop / stop-limit orders
    pub stop_price: Option<Price>,
    /// Original quantity when submitted
    pub original_quantity: Quantity,
    /// Quantity still available to fill
    pub remaining_quantity: Quantity,
    /// Quantity that has been filled
    pub filled_quantity: Quantity,
    /// When the order was received by the matching engine
    pub timestamp: Timestamp,
    /// How long the order stays active
    pub time_in_force: TimeInForce,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// Why the order was rejected, if `status == Rejected`
    pub reject_reason: Option<String>,
}

impl Order {
    /// Create a new order with the given parameters.
    ///
    /// The order starts with `remaining_quantity == original_quantity`,
    /// `filled_quantity == 0`, and `status == Pending`. Identity fields
    /// (`security`, `session_id`, `user_id`) default to their zero value;
    /// attach real ones with [`Order::with_identity`].
    pub fn new(
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: Timestamp,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id,
            security: Symbol::default(),
            session_id: SessionId::default(),
            user_id: UserId::default(),
            side,
            order_type: OrderType::Limit,
            price,
            stop_price: None,
            original_quantity: quantity,
            remaining_quantity: quantity,
            filled_quantity: 0,
            timestamp,
            time_in_force,
            status: OrderStatus::Pending,
            reject_reason: None,
        }
    }

    /// Attach the security, session, and submitting user to this order.
    ///
    /// Called by the session engine right after `OrderBook::create_order`,
    /// which only knows about price/quantity/side and has no notion of
    /// sessions or users.
    pub fn with_identity(mut self, security: Symbol, session_id: SessionId, user_id: UserId) -> Self {
        self.security = security;
        self.session_id = session_id;
        self.user_id = user_id;
        self
    }

    /// Mark this as a market order (no resting limit price).
    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    /// Attach a stop trigger price (stop / stop-limit orders).
    pub fn with_stop_price(mut self, stop_price: Price) -> Self {
        self.stop_price = Some(stop_price);
        self.status = OrderStatus::PendingTrigger;
        self
    }

    /// Returns true if the order can still be filled or cancelled.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Reject the order before it ever enters the book.
    ///
    /// # Panics
    ///
    /// Panics if the order has already left the `Pending`/`PendingTrigger` state.
    pub fn reject(&mut self, reason: impl Into<String>) {
        assert!(
            matches!(self.status, OrderStatus::Pending | OrderStatus::PendingTrigger),
            "cannot reject order in state {:?}",
            self.status
        );
        self.status = OrderStatus::Rejected;
        self.reject_reason = Some(reason.into());
    }

    /// Trigger a pending stop order, turning it into an active resting order.
    ///
    /// # Panics
    ///
    /// Panics if the order is not in `PendingTrigger` state.
    pub fn trigger(&mut self) {
        assert_eq!(
            self.status,
            OrderStatus::PendingTrigger,
            "cannot trigger order in state {:?}",
            self.status
        );
        self.status = OrderStatus::Pending;
    }

    /// Fill the order by the given quantity.
    ///
    /// Updates `remaining_quantity`, `filled_quantity`, and `status`.
    ///
    /// # Panics
    ///
    /// Panics if `quantity > remaining_quantity`.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "fill quantity {} exceeds remaining {}",
            quantity,
            self.remaining_quantity
        );

        self.remaining_quantity -= quantity;
        self.filled_quantity += quantity;

        self.status = if self.remaining_quantity == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Cancel the order, setting status to Cancelled.
    ///
    /// Returns the quantity that was cancelled (remaining at time of cancel).
    ///
    /// # Panics
    ///
    /// Panics if the order is already in a terminal state.
    pub fn cancel(&mut self) -> Quantity {
        assert!(
            self.is_active(),
            "cannot cancel order in terminal state {:?}",
            self.status
        );

        let cancelled = self.remaining_quantity;
        self.remaining_quantity = 0;
        self.status = OrderStatus::Cancelled;
        cancelled
    }
}
