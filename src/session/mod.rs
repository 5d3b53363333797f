//! The session engine: lifecycle state machine, command dispatch, and the
//! collection of per-security matching engines a running lesson owns.
//!
//! A session is this crate's unit of isolation — one [`SessionRuntime`] owns
//! everything needed to run one lesson for one roster of students, with no
//! state shared across sessions except through the
//! [`crate::event_bus::EventBus`] each one hands out subscriptions to.

pub mod actor;
pub mod liquidity;
pub mod matching;
pub mod portfolio;
pub mod snapshot;

use rustc_hash::FxHashMap;

use crate::auction::{Auction, AuctionConfig, AuctionState};
use crate::error::{SessionError, SessionStateError};
use crate::event::{Journal, JournalEvent};
use crate::event_bus::{EventBus, SessionEvent};
use crate::lesson::{Command, LessonPlan, Role, Target};
use crate::privilege::PrivilegeRegistry;
use crate::result::{CancelResult, ModifyResult};
use crate::{OrderId, Price, Privilege, Quantity, SessionId, Side, Symbol, TimeInForce, Trade, UserId};

use liquidity::{LiquidityConfig, LiquidityQuotes};
use matching::{SecurityEngine, SubmitResult};
use portfolio::{PortfolioEngine, PortfolioSnapshot};

/// Where a session sits in its scripted run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionLifecycle {
    /// Created, not yet started; the roster is still filling up.
    Pending,
    /// Running: the timeline is advancing and trading commands are accepted.
    InProgress,
    /// Temporarily halted. Resting orders and privilege grants are
    /// preserved; new orders are rejected until resumed.
    Paused,
    /// Finished normally.
    Completed,
    /// Torn down before it ever started.
    Cancelled,
}

impl SessionLifecycle {
    fn accepts_trading(self) -> bool {
        matches!(self, SessionLifecycle::InProgress)
    }
}

/// Everything one running lesson owns: its matching engines, portfolios,
/// privilege grants, event bus, and scripted timeline position.
pub struct SessionRuntime {
    session_id: SessionId,
    lesson: LessonPlan,
    lifecycle: SessionLifecycle,
    engines: FxHashMap<Symbol, SecurityEngine>,
    portfolio: PortfolioEngine,
    privileges: PrivilegeRegistry,
    pub event_bus: EventBus,
    journal: Journal,
    liquidity_configs: FxHashMap<Symbol, LiquidityConfig>,
    liquidity_quotes: FxHashMap<Symbol, LiquidityQuotes>,
    roster: Vec<(UserId, String, Role)>,
    auctions: FxHashMap<Privilege, Auction>,
    /// Seconds elapsed since `start()`; frozen while paused.
    elapsed_s: u64,
    /// Index into `lesson.timeline` of the next command not yet applied.
    next_timeline_idx: usize,
    /// Securities with no explicit `OpenMarket`/`CloseMarket` command in the
    /// timeline, waiting on `lesson.market_open_delay_s` to open on their
    /// own. Drained the first time `advance` sees the delay has elapsed.
    auto_open_pending: Vec<Symbol>,
}

impl SessionRuntime {
    pub fn new(session_id: SessionId, lesson: LessonPlan) -> Self {
        let mut engines = FxHashMap::default();
        let mut liquidity_configs = FxHashMap::default();
        let mut liquidity_quotes = FxHashMap::default();
        for &security in &lesson.securities {
            engines.insert(security, SecurityEngine::new(security, session_id));
            liquidity_configs.insert(security, LiquidityConfig::disabled());
            liquidity_quotes.insert(security, LiquidityQuotes::default());
        }
        let portfolio = PortfolioEngine::new(lesson.starting_cash.0);

        let scripted: std::collections::HashSet<Symbol> = lesson
            .timeline
            .iter()
            .filter_map(|scheduled| match &scheduled.command {
                Command::OpenMarket { security } | Command::CloseMarket { security } => {
                    Some(*security)
                }
                _ => None,
            })
            .collect();
        let auto_open_pending = lesson
            .securities
            .iter()
            .filter(|s| !scripted.contains(s))
            .copied()
            .collect();

        Self {
            session_id,
            lesson,
            lifecycle: SessionLifecycle::Pending,
            engines,
            portfolio,
            privileges: PrivilegeRegistry::new(),
            event_bus: EventBus::new(),
            journal: Journal::new(),
            liquidity_configs,
            liquidity_quotes,
            roster: Vec::new(),
            auctions: FxHashMap::default(),
            elapsed_s: 0,
            next_timeline_idx: 0,
            auto_open_pending,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Add a user to the roster and seed their default privilege grants.
    /// A no-op if the user already joined.
    pub fn join(&mut self, user_id: UserId, login: impl Into<String>, role: Role) {
        if self.roster.iter().any(|(id, _, _)| *id == user_id) {
            return;
        }
        self.roster.push((user_id, login.into(), role));
        self.privileges.init_user(self.session_id, user_id);
    }

    fn require_state(&self) -> Result<(), SessionError> {
        if self.lifecycle.accepts_trading() {
            return Ok(());
        }
        let source = match self.lifecycle {
            SessionLifecycle::Pending => SessionStateError::NotStarted,
            SessionLifecycle::Paused => SessionStateError::Paused,
            SessionLifecycle::InProgress => unreachable!(),
            SessionLifecycle::Completed | SessionLifecycle::Cancelled => SessionStateError::Ended,
        };
        Err(SessionError::SessionState {
            session_id: self.session_id,
            source,
        })
    }

    fn require_privilege(&self, user_id: UserId, privilege: Privilege) -> Result<(), SessionError> {
        if self.privileges.has(self.session_id, user_id, privilege) {
            Ok(())
        } else {
            Err(SessionError::Privilege {
                user_id,
                privilege: format!("{privilege:?}"),
            })
        }
    }

    fn tif_privilege(tif: TimeInForce) -> Option<Privilege> {
        match tif {
            TimeInForce::IOC => Some(Privilege::SubmitIocOrder),
            TimeInForce::FOK => Some(Privilege::SubmitFokOrder),
            TimeInForce::Day => Some(Privilege::SubmitDayOrder),
            TimeInForce::GTC => None,
        }
    }

    fn engine_mut(&mut self, security: Symbol) -> Result<&mut SecurityEngine, SessionError> {
        self.engines
            .get_mut(&security)
            .ok_or_else(|| SessionError::NotFound(format!("security {security}")))
    }

    /// Estimated notional of a buy, per §4.2: the order's own limit price if
    /// it has one, else the security's current best ask, else its last
    /// trade price. Zero if none of those are available yet (an untraded
    /// security with no limit price estimates to zero cost).
    fn estimate_buy_cost(&self, security: Symbol, limit_price: Option<Price>, quantity: Quantity) -> i64 {
        let engine = self.engines.get(&security);
        let price = limit_price
            .map(|p| p.0)
            .or_else(|| engine.and_then(|e| e.best_bid_ask().1).map(|p| p.0))
            .or_else(|| engine.and_then(|e| e.last_trade_price()).map(|p| p.0))
            .unwrap_or(0);
        price * quantity as i64
    }

    /// Validate a buy's estimated cost against the submitter's cash balance
    /// (§4.2's `insufficient-funds` rejection). A no-op for sells, which
    /// raise cash rather than spend it; short-selling admissibility is
    /// enforced separately via the `ShortSell` privilege.
    fn require_sufficient_funds(
        &self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        limit_price: Option<Price>,
        quantity: Quantity,
    ) -> Result<(), SessionError> {
        if side != Side::Buy {
            return Ok(());
        }
        let required = self.estimate_buy_cost(security, limit_price, quantity);
        let available = self.portfolio.cash(user_id);
        if required > available {
            return Err(SessionError::InsufficientFunds {
                user_id,
                required,
                available,
            });
        }
        Ok(())
    }

    // === Lifecycle transitions ===

    /// Start the session: move Pending -> InProgress and apply every
    /// timeline entry scheduled at offset zero.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.lifecycle != SessionLifecycle::Pending {
            return Err(SessionError::SessionState {
                session_id: self.session_id,
                source: SessionStateError::Ended,
            });
        }
        self.lifecycle = SessionLifecycle::InProgress;
        self.advance(0)
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.lifecycle != SessionLifecycle::InProgress {
            return Err(SessionError::SessionState {
                session_id: self.session_id,
                source: SessionStateError::NotStarted,
            });
        }
        self.lifecycle = SessionLifecycle::Paused;
        self.event_bus.publish(|seq| SessionEvent::SessionPaused { seq });
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.lifecycle != SessionLifecycle::Paused {
            return Err(SessionError::SessionState {
                session_id: self.session_id,
                source: SessionStateError::NotStarted,
            });
        }
        self.lifecycle = SessionLifecycle::InProgress;
        self.event_bus.publish(|seq| SessionEvent::SessionResumed { seq });
        Ok(())
    }

    /// End the session for good: all resting orders (including GTC) are
    /// abandoned and privilege grants for this session are dropped.
    pub fn end(&mut self) -> Result<(), SessionError> {
        if !matches!(
            self.lifecycle,
            SessionLifecycle::InProgress | SessionLifecycle::Paused
        ) {
            return Err(SessionError::SessionState {
                session_id: self.session_id,
                source: SessionStateError::Ended,
            });
        }
        self.lifecycle = SessionLifecycle::Completed;
        for (&security, engine) in self.engines.iter_mut() {
            for order_id in engine.cancel_all_resting() {
                self.event_bus
                    .publish(|seq| SessionEvent::OrderCancelled { seq, order_id, security });
            }
        }
        self.privileges.clear_session(self.session_id);
        self.event_bus.publish(|seq| SessionEvent::SessionEnded { seq });
        Ok(())
    }

    /// Cancel a session that never started.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.lifecycle != SessionLifecycle::Pending {
            return Err(SessionError::SessionState {
                session_id: self.session_id,
                source: SessionStateError::Ended,
            });
        }
        self.lifecycle = SessionLifecycle::Cancelled;
        for engine in self.engines.values_mut() {
            engine.cancel_all_resting();
        }
        self.privileges.clear_session(self.session_id);
        Ok(())
    }

    // === Scripted timeline ===

    /// Apply every timeline command whose offset has elapsed, advancing the
    /// session's clock to `elapsed_s`. Calling this repeatedly with a
    /// monotonically increasing `elapsed_s` drives the lesson forward; the
    /// caller (the session actor) is responsible for not advancing time
    /// while the session is paused.
    pub fn advance(&mut self, elapsed_s: u64) -> Result<(), SessionError> {
        self.elapsed_s = elapsed_s;

        if elapsed_s >= self.lesson.market_open_delay_s && !self.auto_open_pending.is_empty() {
            for security in std::mem::take(&mut self.auto_open_pending) {
                if let Some(engine) = self.engines.get_mut(&security) {
                    engine.open_market();
                    self.event_bus
                        .publish(|seq| SessionEvent::MarketOpened { seq, security });
                }
            }
        }

        while self.next_timeline_idx < self.lesson.timeline.len() {
            let due = self.lesson.timeline[self.next_timeline_idx].offset_s <= elapsed_s;
            if !due {
                break;
            }
            let command = self.lesson.timeline[self.next_timeline_idx].command.clone();
            self.next_timeline_idx += 1;
            self.apply_lesson_command(&command)?;
        }
        Ok(())
    }

    fn apply_lesson_command(&mut self, command: &Command) -> Result<(), SessionError> {
        self.journal.record(JournalEvent::LessonCommand {
            session_id: self.session_id,
            command: command.clone(),
        });

        match command {
            Command::GrantPrivilege { target, privilege } => {
                for user_id in target.resolve(&self.roster) {
                    self.privileges.grant(self.session_id, user_id, *privilege);
                    self.event_bus.publish(|seq| SessionEvent::PrivilegeChanged {
                        seq,
                        user_id,
                        privilege: *privilege,
                        granted: true,
                    });
                }
                Ok(())
            }
            Command::RemovePrivilege { target, privilege } => {
                for user_id in target.resolve(&self.roster) {
                    self.privileges.remove(self.session_id, user_id, *privilege);
                    self.event_bus.publish(|seq| SessionEvent::PrivilegeChanged {
                        seq,
                        user_id,
                        privilege: *privilege,
                        granted: false,
                    });
                }
                Ok(())
            }
            Command::OpenMarket { security } => {
                self.engine_mut(*security)?.open_market();
                self.event_bus
                    .publish(|seq| SessionEvent::MarketOpened { seq, security: *security });
                Ok(())
            }
            Command::CloseMarket { security } => {
                self.engine_mut(*security)?.expire_day_orders();
                self.engine_mut(*security)?.close_market();
                self.event_bus
                    .publish(|seq| SessionEvent::MarketClosed { seq, security: *security });
                Ok(())
            }
            Command::SetLiquidityTrader { security, enabled } => {
                let reference = self
                    .engines
                    .get(security)
                    .and_then(|e| e.last_trade_price())
                    .or_else(|| self.lesson.starting_price(*security))
                    .unwrap_or(Price::ZERO);

                let config = self
                    .liquidity_configs
                    .entry(*security)
                    .or_insert_with(LiquidityConfig::disabled);
                if *enabled && !config.enabled {
                    *config = LiquidityConfig::new(config.spread_ticks.max(1), config.quote_size.max(100), config.tick_size.max(1));
                } else {
                    config.enabled = *enabled;
                }
                let config = *config;

                let quotes = self.liquidity_quotes.entry(*security).or_default();
                let engine = self
                    .engines
                    .get_mut(security)
                    .ok_or_else(|| SessionError::NotFound(format!("security {security}")))?;
                liquidity::refresh(engine, quotes, &config, reference);
                Ok(())
            }
            Command::CreateAuction(config) => {
                self.auctions.insert(config.privilege, Auction::new(*config));
                Ok(())
            }
            Command::StartAuction { privilege } => {
                let auction = self
                    .auctions
                    .get_mut(privilege)
                    .ok_or_else(|| SessionError::NotFound(format!("auction for {privilege:?}")))?;
                auction
                    .start()
                    .map_err(|e| SessionError::Internal(e.to_string()))?;
                self.event_bus
                    .publish(|seq| SessionEvent::PrivilegeAuctionStarted { seq, privilege: *privilege });
                Ok(())
            }
            Command::SetHoldingValue { target, amount } => {
                for user_id in target.resolve(&self.roster) {
                    self.portfolio.set_starting_cash(user_id, amount.0);
                }
                Ok(())
            }
        }
    }

    /// Submit a bid into the named privilege's auction, on behalf of a
    /// participant who holds [`Privilege::ParticipateInAuction`].
    pub fn bid_in_auction(
        &mut self,
        user_id: UserId,
        privilege: Privilege,
        max_price: Price,
    ) -> Result<(), SessionError> {
        self.require_privilege(user_id, Privilege::ParticipateInAuction)?;
        let auction = self
            .auctions
            .get_mut(&privilege)
            .ok_or_else(|| SessionError::NotFound(format!("auction for {privilege:?}")))?;
        auction
            .bid(user_id, max_price)
            .map_err(|e| SessionError::Internal(e.to_string()))
    }

    /// Advance an active auction's clock by one round, granting the
    /// privilege to its winners once the round completes.
    pub fn advance_auction(&mut self, privilege: Privilege) -> Result<bool, SessionError> {
        let auction = self
            .auctions
            .get_mut(&privilege)
            .ok_or_else(|| SessionError::NotFound(format!("auction for {privilege:?}")))?;
        let completed = auction
            .advance_round()
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        if completed && auction.state() == AuctionState::Completed {
            let winners = auction.winners().to_vec();
            for &user_id in &winners {
                self.privileges.grant(self.session_id, user_id, privilege);
            }
            self.event_bus.publish(|seq| SessionEvent::PrivilegeAuctionCompleted {
                seq,
                privilege,
                winners: winners.clone(),
            });
        }
        Ok(completed)
    }

    // === Trading ===

    fn apply_trades_to_portfolio(&mut self, security: Symbol, trades: &[Trade]) {
        let Some(engine) = self.engines.get(&security) else {
            return;
        };
        for trade in trades {
            if let Some(aggressor) = engine.get_order(trade.aggressor_order_id) {
                let user_id = aggressor.user_id;
                self.portfolio
                    .on_trade(user_id, security, trade.aggressor_side, trade.price.0, trade.quantity);
            }
            if let Some(passive) = engine.get_order(trade.passive_order_id) {
                let user_id = passive.user_id;
                self.portfolio
                    .on_trade(user_id, security, trade.passive_side(), trade.price.0, trade.quantity);
            }
            self.event_bus.publish(|seq| SessionEvent::TradeExecuted {
                seq,
                trade_id: trade.id,
                security,
                price: trade.price,
                quantity: trade.quantity,
                aggressor_side: trade.aggressor_side,
            });
        }
        if !trades.is_empty() {
            self.event_bus
                .publish(|seq| SessionEvent::BookChanged { seq, security });
        }
    }

    fn publish_submission(&mut self, user_id: UserId, security: Symbol, result: &SubmitResult) {
        use crate::OrderStatus;
        match result.status {
            OrderStatus::Rejected => {
                self.event_bus.publish(|seq| SessionEvent::OrderRejected {
                    seq,
                    user_id,
                    security,
                    reason: "could not be filled".to_string(),
                });
            }
            _ => {
                self.event_bus.publish(|seq| SessionEvent::OrderAccepted {
                    seq,
                    order_id: result.order_id,
                    user_id,
                    security,
                });
            }
        }
    }

    pub fn submit_limit_order(
        &mut self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
    ) -> Result<SubmitResult, SessionError> {
        self.require_state()?;
        self.require_privilege(user_id, Privilege::SubmitLimitOrder)?;
        if let Some(required) = Self::tif_privilege(tif) {
            self.require_privilege(user_id, required)?;
        }
        if side == Side::Sell
            && self.portfolio.would_go_short(user_id, security, side, quantity)
        {
            self.require_privilege(user_id, Privilege::ShortSell)?;
        }
        self.require_sufficient_funds(user_id, security, side, Some(price), quantity)?;

        let result = self
            .engine_mut(security)?
            .submit_limit(user_id, side, price, quantity, tif)?;

        self.journal.record(JournalEvent::SubmitLimit {
            session_id: self.session_id,
            user_id,
            security,
            side,
            price,
            quantity,
            time_in_force: tif,
        });
        self.apply_trades_to_portfolio(security, &result.trades);
        self.publish_submission(user_id, security, &result);
        Ok(result)
    }

    pub fn submit_market_order(
        &mut self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        quantity: Quantity,
    ) -> Result<SubmitResult, SessionError> {
        self.require_state()?;
        self.require_privilege(user_id, Privilege::SubmitMarketOrder)?;
        if side == Side::Sell
            && self.portfolio.would_go_short(user_id, security, side, quantity)
        {
            self.require_privilege(user_id, Privilege::ShortSell)?;
        }
        self.require_sufficient_funds(user_id, security, side, None, quantity)?;

        let result = self.engine_mut(security)?.submit_market(user_id, side, quantity)?;

        self.journal.record(JournalEvent::SubmitMarket {
            session_id: self.session_id,
            user_id,
            security,
            side,
            quantity,
        });
        self.apply_trades_to_portfolio(security, &result.trades);
        self.publish_submission(user_id, security, &result);
        Ok(result)
    }

    pub fn submit_stop_order(
        &mut self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        stop_price: Price,
        limit_price: Option<Price>,
        quantity: Quantity,
        tif: TimeInForce,
    ) -> Result<OrderId, SessionError> {
        self.require_state()?;
        let privilege = if limit_price.is_some() {
            Privilege::SubmitStopLimitOrder
        } else {
            Privilege::SubmitStopOrder
        };
        self.require_privilege(user_id, privilege)?;

        let result = self
            .engine_mut(security)?
            .submit_stop(side, stop_price, limit_price, quantity, tif, user_id);

        self.journal.record(JournalEvent::SubmitStop {
            session_id: self.session_id,
            user_id,
            security,
            side,
            stop_price,
            limit_price,
            quantity,
            time_in_force: tif,
        });

        // A stop that triggers immediately on submission produces trades
        // the same way a marketable limit order would.
        self.apply_trades_to_portfolio(security, &result.trades);
        Ok(result.order_id)
    }

    pub fn cancel_order(&mut self, user_id: UserId, security: Symbol, order_id: OrderId) -> Result<CancelResult, SessionError> {
        self.require_state()?;
        self.require_privilege(user_id, Privilege::CancelOwnOrder)?;

        let result = self.engine_mut(security)?.cancel(order_id);
        if result.success {
            self.journal.record(JournalEvent::Cancel {
                session_id: self.session_id,
                user_id,
                security,
                order_id,
            });
            self.event_bus
                .publish(|seq| SessionEvent::OrderCancelled { seq, order_id, security });
        }
        Ok(result)
    }

    pub fn modify_order(
        &mut self,
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<ModifyResult, SessionError> {
        self.require_state()?;
        self.require_privilege(user_id, Privilege::ModifyOwnOrder)?;

        let result = self.engine_mut(security)?.modify(user_id, order_id, new_price, new_quantity);
        if result.success {
            self.journal.record(JournalEvent::Modify {
                session_id: self.session_id,
                user_id,
                security,
                order_id,
                new_price,
                new_quantity,
            });
            self.apply_trades_to_portfolio(security, &result.trades);
        }
        Ok(result)
    }

    // === Reads ===

    pub fn portfolio_snapshot(&self, user_id: UserId) -> PortfolioSnapshot {
        let marks: Vec<(Symbol, i64)> = self
            .engines
            .iter()
            .filter_map(|(symbol, engine)| engine.last_trade_price().map(|p| (*symbol, p.0)))
            .collect();
        self.portfolio.snapshot(user_id, &marks)
    }

    pub fn best_bid_ask(&self, security: Symbol) -> Option<(Option<Price>, Option<Price>)> {
        self.engines.get(&security).map(|e| e.best_bid_ask())
    }

    pub fn has_privilege(&self, user_id: UserId, privilege: Privilege) -> bool {
        self.privileges.has(self.session_id, user_id, privilege)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aoe() -> Symbol {
        Symbol::new("AOE")
    }

    fn lesson() -> LessonPlan {
        LessonPlan::new("intro")
            .with_scenario_id("S1")
            .with_security(aoe())
            .with_starting_cash(Price(100_000_00))
            .with_command(0, Command::OpenMarket { security: aoe() })
    }

    fn started_session() -> SessionRuntime {
        let mut s = SessionRuntime::new(SessionId::new(), lesson());
        s.join(UserId(1), "alice", Role::Speculator);
        s.join(UserId(2), "bob", Role::Speculator);
        s.start().unwrap();
        s
    }

    #[test]
    fn start_opens_the_market_from_timeline() {
        let s = started_session();
        assert_eq!(s.lifecycle(), SessionLifecycle::InProgress);
        let (bid, ask) = s.best_bid_ask(aoe()).unwrap();
        assert_eq!((bid, ask), (None, None));
    }

    #[test]
    fn trading_rejected_before_start() {
        let mut s = SessionRuntime::new(SessionId::new(), lesson());
        s.join(UserId(1), "alice", Role::Speculator);
        let err = s
            .submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 10, TimeInForce::GTC)
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionState { .. }));
    }

    #[test]
    fn cross_updates_both_sides_portfolio() {
        let mut s = started_session();
        s.submit_limit_order(UserId(1), aoe(), Side::Sell, Price(100_00), 100, TimeInForce::GTC)
            .unwrap();
        s.submit_limit_order(UserId(2), aoe(), Side::Buy, Price(100_00), 100, TimeInForce::GTC)
            .unwrap();

        let alice = s.portfolio_snapshot(UserId(1));
        let bob = s.portfolio_snapshot(UserId(2));
        assert_eq!(alice.cash, 100_000_00 + 100 * 100_00);
        assert_eq!(bob.cash, 100_000_00 - 100 * 100_00);
    }

    #[test]
    fn short_sell_without_privilege_is_rejected() {
        let mut s = started_session();
        let err = s
            .submit_limit_order(UserId(1), aoe(), Side::Sell, Price(100_00), 10, TimeInForce::GTC)
            .unwrap_err();
        assert!(matches!(err, SessionError::Privilege { .. }));
    }

    #[test]
    fn short_sell_allowed_once_granted() {
        let mut s = started_session();
        s.apply_lesson_command(&Command::GrantPrivilege {
            target: Target::All,
            privilege: Privilege::ShortSell,
        })
        .unwrap();

        let result = s
            .submit_limit_order(UserId(1), aoe(), Side::Sell, Price(100_00), 10, TimeInForce::GTC)
            .unwrap();
        assert!(result.resting_quantity > 0 || result.has_trades());
    }

    #[test]
    fn buy_exceeding_cash_is_rejected_with_insufficient_funds() {
        let mut s = started_session();
        let err = s
            .submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 2000, TimeInForce::GTC)
            .unwrap_err();
        assert!(matches!(err, SessionError::InsufficientFunds { .. }));

        // No book change — the reject happens before the order ever reaches
        // the matching engine.
        let (bid, _) = s.best_bid_ask(aoe()).unwrap();
        assert_eq!(bid, None);
    }

    #[test]
    fn buy_within_cash_is_accepted() {
        let mut s = started_session();
        s.submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 10, TimeInForce::GTC)
            .unwrap();
        let (bid, _) = s.best_bid_ask(aoe()).unwrap();
        assert_eq!(bid, Some(Price(100_00)));
    }

    #[test]
    fn market_buy_estimates_cost_from_best_ask() {
        let mut s = started_session();
        s.apply_lesson_command(&Command::GrantPrivilege {
            target: Target::All,
            privilege: Privilege::ShortSell,
        })
        .unwrap();
        s.submit_limit_order(UserId(2), aoe(), Side::Sell, Price(100_00), 2000, TimeInForce::GTC)
            .unwrap();

        let err = s
            .submit_market_order(UserId(1), aoe(), Side::Buy, 2000)
            .unwrap_err();
        assert!(matches!(err, SessionError::InsufficientFunds { .. }));
    }

    #[test]
    fn sell_is_never_funds_limited() {
        let mut s = started_session();
        s.apply_lesson_command(&Command::GrantPrivilege {
            target: Target::All,
            privilege: Privilege::ShortSell,
        })
        .unwrap();

        s.submit_limit_order(UserId(1), aoe(), Side::Sell, Price(100_00), 1_000_000, TimeInForce::GTC)
            .unwrap();
    }

    #[test]
    fn pause_then_trading_rejected_then_resume_allows_again() {
        let mut s = started_session();
        s.pause().unwrap();
        let err = s
            .submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 10, TimeInForce::GTC)
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionState { .. }));

        s.resume().unwrap();
        s.submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 10, TimeInForce::GTC)
            .unwrap();
    }

    #[test]
    fn scheduled_command_applies_once_its_offset_elapses() {
        let plan = lesson().with_command(
            30,
            Command::GrantPrivilege {
                target: Target::All,
                privilege: Privilege::ShortSell,
            },
        );
        let mut s = SessionRuntime::new(SessionId::new(), plan);
        s.join(UserId(1), "alice", Role::Speculator);
        s.start().unwrap();

        assert!(!s.has_privilege(UserId(1), Privilege::ShortSell));
        s.advance(30).unwrap();
        assert!(s.has_privilege(UserId(1), Privilege::ShortSell));
    }

    #[test]
    fn set_holding_value_overrides_starting_cash() {
        let plan = lesson().with_command(
            0,
            Command::SetHoldingValue {
                target: Target::User("alice".to_string()),
                amount: Price(500_00),
            },
        );
        let mut s = SessionRuntime::new(SessionId::new(), plan);
        s.join(UserId(1), "alice", Role::Speculator);
        s.start().unwrap();

        assert_eq!(s.portfolio_snapshot(UserId(1)).cash, 500_00);
    }

    #[test]
    fn liquidity_provider_quotes_after_enabling() {
        let plan = lesson()
            .with_starting_price(aoe(), Price(100_00))
            .with_command(0, Command::SetLiquidityTrader { security: aoe(), enabled: true });
        let mut s = SessionRuntime::new(SessionId::new(), plan);
        s.start().unwrap();

        let (bid, ask) = s.best_bid_ask(aoe()).unwrap();
        assert!(bid.is_some() && ask.is_some());
        assert!(bid.unwrap() < ask.unwrap());
    }

    #[test]
    fn auction_grants_privilege_to_winner() {
        let mut s = started_session();
        let config = AuctionConfig {
            privilege: Privilege::ShortSell,
            available: 1,
            initial_price: Price(10_00),
            increment: Price(1_00),
            interval_s: 10,
        };
        s.apply_lesson_command(&Command::CreateAuction(config)).unwrap();
        s.apply_lesson_command(&Command::StartAuction { privilege: Privilege::ShortSell })
            .unwrap();

        s.bid_in_auction(UserId(1), Privilege::ShortSell, Price(20_00)).unwrap();
        s.bid_in_auction(UserId(2), Privilege::ShortSell, Price(15_00)).unwrap();

        let completed = s.advance_auction(Privilege::ShortSell).unwrap();
        assert!(completed);
        assert!(s.has_privilege(UserId(1), Privilege::ShortSell));
        assert!(s.has_privilege(UserId(2), Privilege::ShortSell));
    }

    #[test]
    fn end_drops_privileges() {
        let mut s = started_session();
        s.apply_lesson_command(&Command::GrantPrivilege {
            target: Target::All,
            privilege: Privilege::ShortSell,
        })
        .unwrap();
        assert!(s.has_privilege(UserId(1), Privilege::ShortSell));

        s.end().unwrap();
        assert!(!s.has_privilege(UserId(1), Privilege::ShortSell));
        assert_eq!(s.lifecycle(), SessionLifecycle::Completed);
    }

    #[test]
    fn end_cancels_resting_gtc_orders() {
        let mut s = started_session();
        s.submit_limit_order(UserId(1), aoe(), Side::Buy, Price(99_00), 10, TimeInForce::GTC)
            .unwrap();
        let (bid, _) = s.best_bid_ask(aoe()).unwrap();
        assert_eq!(bid, Some(Price(99_00)));

        s.end().unwrap();
        let (bid, ask) = s.best_bid_ask(aoe()).unwrap();
        assert_eq!((bid, ask), (None, None));
    }
}
