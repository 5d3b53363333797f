//! A session's `subscribe` contract: `(snapshot, stream)`, where the
//! snapshot is consistent with the stream starting at `seq`.
//!
//! The snapshot gives a newly-connected (or just-resubscribed) terminal
//! everything it needs to render state without waiting on the live feed:
//! the visible book per security, the caller's own resting orders, their
//! portfolio, each market's open/closed state, and their current
//! privileges.

use crate::{Order, Price, Privilege, SessionId, Symbol};

use super::portfolio::PortfolioSnapshot;
use super::{SessionLifecycle, SessionRuntime};

/// One security's visible market state at snapshot time.
#[derive(Clone, Debug)]
pub struct MarketSnapshot {
    pub security: Symbol,
    pub is_open: bool,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub last_trade_price: Option<Price>,
}

/// Everything a subscriber needs before it starts consuming the live event
/// stream at [`SessionSnapshot::seq`].
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub lifecycle: SessionLifecycle,
    /// The event sequence number this snapshot is consistent with: a
    /// subscriber that starts reading the stream at this `seq` sees every
    /// change made after the snapshot was taken, exactly once.
    pub seq: u64,
    pub markets: Vec<MarketSnapshot>,
    pub own_orders: Vec<Order>,
    pub portfolio: PortfolioSnapshot,
    pub privileges: Vec<Privilege>,
}

impl SessionRuntime {
    /// Build a consistent `(snapshot, stream)` pair for `user_id`. The
    /// returned `seq` is the sequence number of the next event the bus will
    /// publish, so replaying the stream from there never misses or repeats
    /// an update relative to this snapshot.
    pub fn snapshot(&self, user_id: crate::UserId) -> SessionSnapshot {
        let markets = self
            .lesson
            .securities
            .iter()
            .map(|&security| {
                let engine = self.engines.get(&security);
                let (best_bid, best_ask) = engine.map(|e| e.best_bid_ask()).unwrap_or((None, None));
                MarketSnapshot {
                    security,
                    is_open: engine.is_some_and(|e| e.is_open()),
                    best_bid,
                    best_ask,
                    last_trade_price: engine.and_then(|e| e.last_trade_price()),
                }
            })
            .collect();

        let own_orders = self
            .engines
            .values()
            .flat_map(|engine| engine.orders_for(user_id).cloned())
            .collect();

        SessionSnapshot {
            session_id: self.session_id,
            lifecycle: self.lifecycle,
            seq: self.event_bus.next_seq(),
            markets,
            own_orders,
            portfolio: self.portfolio_snapshot(user_id),
            privileges: self.privileges.granted(self.session_id, user_id),
        }
    }
}
