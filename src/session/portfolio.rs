//! Per-session, multi-user portfolio tracking.
//!
//! Wraps the single-user [`crate::portfolio::Position`] cost-basis primitive
//! in a table keyed by user, since a session has many students trading the
//! same securities simultaneously rather than one implicit account.

use rustc_hash::FxHashMap;

use crate::portfolio::Position;
use crate::{Quantity, Side, Symbol, UserId};

/// A user's holdings and cash balance within one session.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSnapshot {
    pub user_id: UserId,
    pub cash: i64,
    pub positions: Vec<Position>,
    pub realized_pnl: i64,
    pub unrealized_pnl: i64,
}

struct Account {
    cash: i64,
    starting_cash: i64,
    positions: FxHashMap<Symbol, Position>,
}

impl Account {
    fn new(starting_cash: i64) -> Self {
        Self {
            cash: starting_cash,
            starting_cash,
            positions: FxHashMap::default(),
        }
    }
}

/// Tracks every user's cash and positions for one session.
///
/// `on_trade` is called once per side of every executed trade by the session
/// engine (once for the aggressor, once for the passive counterparty), so
/// each fill updates exactly the two accounts it involves.
pub struct PortfolioEngine {
    default_starting_cash: i64,
    accounts: FxHashMap<UserId, Account>,
}

impl PortfolioEngine {
    pub fn new(default_starting_cash: i64) -> Self {
        Self {
            default_starting_cash,
            accounts: FxHashMap::default(),
        }
    }

    fn account_mut(&mut self, user_id: UserId) -> &mut Account {
        let starting_cash = self.default_starting_cash;
        self.accounts
            .entry(user_id)
            .or_insert_with(|| Account::new(starting_cash))
    }

    /// Current cash balance for `user_id`, or the session default for a
    /// user never seen before (matches the default-snapshot infallibility
    /// rule `snapshot` follows).
    pub fn cash(&self, user_id: UserId) -> i64 {
        self.accounts
            .get(&user_id)
            .map(|a| a.cash)
            .unwrap_or(self.default_starting_cash)
    }

    /// Seed a user with a specific starting cash balance, overriding the
    /// session default (used by `Command::SetHoldingValue`).
    pub fn set_starting_cash(&mut self, user_id: UserId, cash: i64) {
        let account = self.account_mut(user_id);
        account.cash = cash;
        account.starting_cash = cash;
    }

    /// Apply one fill to a user's account.
    ///
    /// `side` is the side *this user* traded (buy increases the position,
    /// sell decreases it); `price` and `quantity` describe the execution.
    pub fn on_trade(&mut self, user_id: UserId, security: Symbol, side: Side, price: i64, quantity: Quantity) {
        let signed_qty = match side {
            Side::Buy => quantity as i64,
            Side::Sell => -(quantity as i64),
        };

        let account = self.account_mut(user_id);
        let position = account
            .positions
            .entry(security)
            .or_insert_with(|| Position::new(security));
        position.apply_fill(signed_qty, price);

        // Cash moves opposite the position: buying spends cash, selling raises it.
        account.cash -= signed_qty * price;
    }

    /// Mark every position to the given reference price for unrealized PnL
    /// and equity calculations. Does not affect cash or realized PnL.
    pub fn snapshot(&self, user_id: UserId, marks: &[(Symbol, i64)]) -> PortfolioSnapshot {
        let Some(account) = self.accounts.get(&user_id) else {
            return PortfolioSnapshot {
                user_id,
                cash: self.default_starting_cash,
                positions: Vec::new(),
                realized_pnl: 0,
                unrealized_pnl: 0,
            };
        };

        let mark_of = |symbol: Symbol| -> i64 {
            marks
                .iter()
                .find(|(s, _)| *s == symbol)
                .map(|(_, p)| *p)
                .unwrap_or(0)
        };

        let mut realized_pnl = 0;
        let mut unrealized_pnl = 0;
        let mut positions = Vec::new();
        for position in account.positions.values() {
            realized_pnl += position.realized_pnl;
            unrealized_pnl += position.unrealized_pnl(mark_of(position.symbol));
            positions.push(position.clone());
        }
        positions.sort_by_key(|p| p.symbol);

        PortfolioSnapshot {
            user_id,
            cash: account.cash,
            positions,
            realized_pnl,
            unrealized_pnl,
        }
    }

    /// Reset a user's account back to the session's starting cash with no
    /// positions, used when an instructor restarts a lesson mid-session.
    pub fn reset(&mut self, user_id: UserId) {
        if let Some(account) = self.accounts.get_mut(&user_id) {
            account.cash = account.starting_cash;
            account.positions.clear();
        }
    }

    /// Returns true if short selling would take `user_id` net short in
    /// `security` by more than the session allows — callers gate
    /// `Privilege::ShortSell` separately; this only checks the resulting
    /// sign, not the privilege.
    pub fn would_go_short(&self, user_id: UserId, security: Symbol, side: Side, quantity: Quantity) -> bool {
        if side != Side::Sell {
            return false;
        }
        let current = self
            .accounts
            .get(&user_id)
            .and_then(|a| a.positions.get(&security))
            .map(|p| p.quantity)
            .unwrap_or(0);
        current - quantity as i64 < 0
    }
}
