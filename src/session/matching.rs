//! Per-security matching engine.
//!
//! A session holds one `SecurityEngine` per traded symbol (see
//! [`crate::session::SessionRuntime`]). This is a direct generalization
//! of the single-exchange design: the book, stop book, and trade history are
//! unchanged, but every order now carries the identity (security, session,
//! user) that a multi-user session needs to attribute fills and reject bad
//! requests with a typed [`SessionError`] instead of a bare `ValidationError`.

use crate::error::{SessionError, ValidationError};
use crate::order::OrderType;
use crate::result::{CancelError, CancelResult, ModifyError, ModifyResult, StopSubmitResult};
use crate::snapshot::BookSnapshot;
use crate::stop::{StopBook, StopOrder, StopStatus};
use crate::{
    Order, OrderBook, OrderId, OrderStatus, Price, Quantity, SessionId, Side, Symbol, TimeInForce,
    Trade, UserId,
};

/// Result of submitting an order into a security's matching engine.
#[derive(Clone, Debug)]
pub struct SubmitResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub trades: Vec<Trade>,
    pub filled_quantity: Quantity,
    pub resting_quantity: Quantity,
    pub cancelled_quantity: Quantity,
}

impl SubmitResult {
    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }

    pub fn is_fully_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// Maximum stop-trigger cascade depth.
///
/// Bounded so a pathological lesson plan (stops chained tightly around a
/// thin book) cannot loop the engine forever; in practice a cascade this
/// deep would mean more pending stops than any real classroom roster has.
const MAX_CASCADE_DEPTH: usize = 100;

/// Matching and stop-triggering engine for a single security, scoped to one
/// session.
#[derive(Debug)]
pub struct SecurityEngine {
    pub(crate) security: Symbol,
    pub(crate) session_id: SessionId,
    pub(crate) book: OrderBook,
    pub(crate) trades: Vec<Trade>,
    pub(crate) stop_book: StopBook,
    pub(crate) last_trade_price: Option<Price>,
    /// Continuous trading is open for this security. When closed, new
    /// non-administrative orders are rejected with `SessionError::MarketClosed`.
    pub(crate) open: bool,
}

impl SecurityEngine {
    pub fn new(security: Symbol, session_id: SessionId) -> Self {
        Self {
            security,
            session_id,
            book: OrderBook::new(),
            trades: Vec::new(),
            stop_book: StopBook::new(),
            last_trade_price: None,
            open: false,
        }
    }

    pub fn open_market(&mut self) {
        self.open = true;
    }

    pub fn close_market(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn require_open(&self) -> Result<(), SessionError> {
        if self.open {
            Ok(())
        } else {
            Err(SessionError::MarketClosed {
                security: self.security,
            })
        }
    }

    fn validate(price: Price, quantity: Quantity, order_type: OrderType) -> Result<(), SessionError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }
        if order_type == OrderType::Limit && price.0 <= 0 {
            return Err(ValidationError::ZeroPrice.into());
        }
        Ok(())
    }

    /// Submit a limit order on behalf of `user_id`.
    pub fn submit_limit(
        &mut self,
        user_id: UserId,
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
    ) -> Result<SubmitResult, SessionError> {
        Self::validate(price, quantity, OrderType::Limit)?;
        self.require_open()?;
        Ok(self.submit_limit_internal(user_id, side, price, quantity, tif, OrderType::Limit))
    }

    /// Submit a market order on behalf of `user_id`. Unfilled remainder is
    /// always cancelled (IOC semantics).
    pub fn submit_market(
        &mut self,
        user_id: UserId,
        side: Side,
        quantity: Quantity,
    ) -> Result<SubmitResult, SessionError> {
        Self::validate(Price(1), quantity, OrderType::Market)?;
        self.require_open()?;
        if self.book.opposite_side(side).is_empty() {
            return Err(SessionError::Liquidity {
                security: self.security,
            });
        }
        let price = match side {
            Side::Buy => Price::MAX,
            Side::Sell => Price::MIN,
        };
        let result =
            self.submit_limit_internal(user_id, side, price, quantity, TimeInForce::IOC, OrderType::Market);
        Ok(result)
    }

    fn submit_limit_internal(
        &mut self,
        user_id: UserId,
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
        order_type: OrderType,
    ) -> SubmitResult {
        if tif == TimeInForce::FOK && !self.book.can_fully_fill(side, price, quantity) {
            // Consumes an order id for consistency with the caller's
            // expectations, but the order never enters the book.
            let order = self.book.create_order(side, price, quantity, tif);
            return SubmitResult {
                order_id: order.id,
                status: OrderStatus::Rejected,
                trades: Vec::new(),
                filled_quantity: 0,
                resting_quantity: 0,
                cancelled_quantity: quantity,
            };
        }

        let mut order = self
            .book
            .create_order(side, price, quantity, tif)
            .with_identity(self.security, self.session_id, user_id)
            .with_order_type(order_type);
        let order_id = order.id;

        let match_result = self.book.match_order(&mut order);
        let trades: Vec<Trade> = match_result
            .trades
            .iter()
            .cloned()
            .map(|t| t.with_security(self.security))
            .collect();
        self.trades.extend(trades.iter().cloned());

        let filled = order.filled_quantity;
        let remaining = order.remaining_quantity;

        let (status, resting, cancelled) = if remaining == 0 {
            order.status = OrderStatus::Filled;
            self.book.record_terminal_order(order);
            (OrderStatus::Filled, 0, 0)
        } else if tif.can_rest() {
            let status = if filled > 0 {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Pending
            };
            order.status = status;
            self.book.add_order(order);
            (status, remaining, 0)
        } else {
            let status = if filled > 0 {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Cancelled
            };
            order.status = status;
            self.book.record_terminal_order(order);
            (status, 0, remaining)
        };

        let mut trades = trades;
        if let Some(last) = trades.last() {
            self.last_trade_price = Some(last.price);
            trades.extend(self.process_trade_triggers());
        }

        SubmitResult {
            order_id,
            status,
            trades,
            filled_quantity: filled,
            resting_quantity: resting,
            cancelled_quantity: cancelled,
        }
    }

    pub fn cancel(&mut self, order_id: OrderId) -> CancelResult {
        if self.stop_book.contains_pending(order_id) {
            if let Some(stop) = self.stop_book.get(order_id) {
                let qty = stop.quantity;
                self.stop_book.cancel(order_id);
                return CancelResult::success(qty);
            }
        }

        let order = match self.book.get_order(order_id) {
            Some(o) => o,
            None => return CancelResult::failure(CancelError::OrderNotFound),
        };
        if !order.is_active() {
            return CancelResult::failure(CancelError::OrderNotActive);
        }
        match self.book.cancel_order(order_id) {
            Some(qty) => CancelResult::success(qty),
            None => CancelResult::failure(CancelError::OrderNotActive),
        }
    }

    /// Force-cancel every resting order whose time-in-force expires at
    /// market close (Day orders), returning the ids cancelled.
    pub fn expire_day_orders(&mut self) -> Vec<OrderId> {
        let day_order_ids: Vec<OrderId> = self
            .book
            .active_orders()
            .filter(|o| o.time_in_force.expires_at_close())
            .map(|o| o.id)
            .collect();
        for id in &day_order_ids {
            self.book.cancel_order(*id);
        }
        day_order_ids
    }

    /// Force-cancel every resting order, including GTC, and drop any
    /// pending-trigger stops. Used when a session ends for good — GTC
    /// survives pause and market close but not session termination.
    pub fn cancel_all_resting(&mut self) -> Vec<OrderId> {
        let order_ids: Vec<OrderId> = self.book.active_orders().map(|o| o.id).collect();
        for id in &order_ids {
            self.book.cancel_order(*id);
        }
        self.stop_book.cancel_all();
        order_ids
    }

    pub fn modify(
        &mut self,
        user_id: UserId,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> ModifyResult {
        if new_quantity == 0 {
            return ModifyResult::failure(order_id, ModifyError::InvalidQuantity);
        }

        let (side, tif, order_type) = match self.book.get_order(order_id) {
            Some(o) if o.is_active() => (o.side, o.time_in_force, o.order_type),
            Some(_) => return ModifyResult::failure(order_id, ModifyError::OrderNotActive),
            None => return ModifyResult::failure(order_id, ModifyError::OrderNotFound),
        };

        let cancelled = match self.book.cancel_order(order_id) {
            Some(qty) => qty,
            None => return ModifyResult::failure(order_id, ModifyError::OrderNotActive),
        };

        let result =
            self.submit_limit_internal(user_id, side, new_price, new_quantity, tif, order_type);

        ModifyResult::success(order_id, result.order_id, cancelled, result.trades)
    }

    pub fn submit_stop(
        &mut self,
        side: Side,
        stop_price: Price,
        limit_price: Option<Price>,
        quantity: Quantity,
        tif: TimeInForce,
        user_id: UserId,
    ) -> StopSubmitResult {
        let id = self.book.next_order_id();
        let timestamp = self.book.next_timestamp();

        let order = StopOrder {
            id,
            user_id,
            side,
            stop_price,
            limit_price,
            quantity,
            time_in_force: tif,
            timestamp,
            status: StopStatus::Pending,
        };
        self.stop_book.insert(order);

        if let Some(last_price) = self.last_trade_price {
            let should_trigger = match side {
                Side::Buy => last_price >= stop_price,
                Side::Sell => last_price <= stop_price,
            };
            if should_trigger {
                let trades = self.process_trade_triggers();
                let status = self
                    .stop_book
                    .get(id)
                    .map(|o| o.status)
                    .unwrap_or(StopStatus::Triggered);
                return StopSubmitResult { order_id: id, status, trades };
            }
        }

        StopSubmitResult {
            order_id: id,
            status: StopStatus::Pending,
            trades: Vec::new(),
        }
    }

    /// Triggered stops may themselves produce trades that trigger further
    /// stops; this recurses (bounded by `MAX_CASCADE_DEPTH`) until a round
    /// produces no new triggers. Returns every trade produced along the way
    /// so the caller can apply them to portfolios exactly like any other
    /// submission's trades.
    fn process_trade_triggers(&mut self) -> Vec<Trade> {
        let mut all_trades = Vec::new();
        for _ in 0..MAX_CASCADE_DEPTH {
            let trade_price = match self.last_trade_price {
                Some(p) => p,
                None => return all_trades,
            };

            let triggered = self.stop_book.collect_triggered(trade_price);
            if triggered.is_empty() {
                return all_trades;
            }

            let mut new_last_price = None;
            for stop in triggered {
                let result = match stop.limit_price {
                    Some(limit) => self.submit_limit_internal(
                        stop.user_id,
                        stop.side,
                        limit,
                        stop.quantity,
                        stop.time_in_force,
                        OrderType::StopLimit,
                    ),
                    None => {
                        let price = match stop.side {
                            Side::Buy => Price::MAX,
                            Side::Sell => Price::MIN,
                        };
                        self.submit_limit_internal(
                            stop.user_id,
                            stop.side,
                            price,
                            stop.quantity,
                            TimeInForce::IOC,
                            OrderType::Stop,
                        )
                    }
                };
                if let Some(last_trade) = result.trades.last() {
                    new_last_price = Some(last_trade.price);
                }
                all_trades.extend(result.trades);
            }

            match new_last_price {
                Some(p) => self.last_trade_price = Some(p),
                None => return all_trades,
            }
        }
        all_trades
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.book.get_order(order_id)
    }

    /// Every order `user_id` still has resting on this security's book.
    pub fn orders_for(&self, user_id: UserId) -> impl Iterator<Item = &Order> {
        self.book.active_orders().filter(move |o| o.user_id == user_id)
    }

    pub fn best_bid_ask(&self) -> (Option<Price>, Option<Price>) {
        self.book.best_bid_ask()
    }

    pub fn spread(&self) -> Option<i64> {
        self.book.spread()
    }

    pub fn depth(&self, levels: usize) -> BookSnapshot {
        self.book.snapshot(levels)
    }

    pub fn full_book(&self) -> BookSnapshot {
        self.book.full_snapshot()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn last_trade_price(&self) -> Option<Price> {
        self.last_trade_price
    }

    pub fn pending_stop_count(&self) -> usize {
        self.stop_book.pending_count()
    }
}
