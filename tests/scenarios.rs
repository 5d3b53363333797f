// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! Literal scenario fixtures a correct matching/session engine must
//! reproduce exactly, covering a simple cross, a partial fill, a multi-level
//! market sweep, a fill-or-kill rejection, price-time priority, and
//! mark-to-market on a third party's trade.

use tradesim::lesson::{Command, LessonPlan, Role};
use tradesim::session::matching::SecurityEngine;
use tradesim::session::SessionRuntime;
use tradesim::{OrderStatus, Price, SessionId, Side, Symbol, TimeInForce, UserId};

fn aoe() -> Symbol {
    Symbol::new("AOE")
}

fn started_session(starting_cash: i64) -> SessionRuntime {
    let plan = LessonPlan::new("scenario")
        .with_scenario_id("S")
        .with_security(aoe())
        .with_starting_cash(Price(starting_cash))
        .with_command(0, Command::OpenMarket { security: aoe() })
        .with_command(
            0,
            Command::GrantPrivilege {
                target: tradesim::lesson::Target::All,
                privilege: tradesim::Privilege::ShortSell,
            },
        );
    let mut session = SessionRuntime::new(SessionId::new(), plan);
    session.join(UserId(1), "a", Role::Speculator);
    session.join(UserId(2), "b", Role::Speculator);
    session.start().unwrap();
    session
}

/// S1 — Simple cross.
#[test]
fn s1_simple_cross() {
    let mut session = started_session(100_000_00);

    session
        .submit_limit_order(UserId(1), aoe(), Side::Sell, Price(100_00), 100, TimeInForce::Day)
        .unwrap();
    let fill = session
        .submit_limit_order(UserId(2), aoe(), Side::Buy, Price(100_00), 100, TimeInForce::Day)
        .unwrap();

    assert_eq!(fill.trades.len(), 1);
    assert_eq!(fill.trades[0].price, Price(100_00));
    assert_eq!(fill.trades[0].quantity, 100);
    assert!(fill.is_fully_filled());

    let a = session.portfolio_snapshot(UserId(1));
    let b = session.portfolio_snapshot(UserId(2));
    assert_eq!(a.cash, 100_000_00 + 100 * 100_00);
    assert_eq!(b.cash, 100_000_00 - 100 * 100_00);
    assert_eq!(a.positions.iter().find(|p| p.symbol == aoe()).unwrap().quantity, -100);
    assert_eq!(b.positions.iter().find(|p| p.symbol == aoe()).unwrap().quantity, 100);
    assert_eq!(b.positions.iter().find(|p| p.symbol == aoe()).unwrap().avg_entry_price, 100_00);

    let (bid, ask) = session.best_bid_ask(aoe()).unwrap();
    assert_eq!((bid, ask), (None, None));
}

/// S2 — Partial fill with residual resting.
#[test]
fn s2_partial_fill_leaves_residual() {
    let mut engine = SecurityEngine::new(aoe(), SessionId::new());
    engine.open_market();
    engine.submit_limit(UserId(1), Side::Sell, Price(101_00), 60, TimeInForce::GTC).unwrap();
    engine.submit_limit(UserId(1), Side::Sell, Price(102_00), 40, TimeInForce::GTC).unwrap();

    let result = engine
        .submit_limit(UserId(2), Side::Buy, Price(101_00), 80, TimeInForce::GTC)
        .unwrap();

    assert_eq!(result.status, OrderStatus::PartiallyFilled);
    assert_eq!(result.filled_quantity, 60);
    assert_eq!(result.resting_quantity, 20);

    let depth = engine.depth(10);
    assert_eq!(depth.asks.len(), 1);
    assert_eq!(depth.asks[0].price, Price(102_00));
    assert_eq!(depth.asks[0].quantity, 40);
    assert_eq!(depth.bids.len(), 1);
    assert_eq!(depth.bids[0].price, Price(101_00));
    assert_eq!(depth.bids[0].quantity, 20);
}

/// S3 — Market order walks multiple levels.
#[test]
fn s3_market_order_walks_levels() {
    let mut engine = SecurityEngine::new(aoe(), SessionId::new());
    engine.open_market();
    engine.submit_limit(UserId(1), Side::Buy, Price(99_00), 30, TimeInForce::GTC).unwrap();
    engine.submit_limit(UserId(1), Side::Buy, Price(98_00), 50, TimeInForce::GTC).unwrap();

    let result = engine.submit_market(UserId(2), Side::Sell, 70).unwrap();

    assert!(result.is_fully_filled());
    assert_eq!(result.trades.len(), 2);
    assert_eq!(result.trades[0].price, Price(99_00));
    assert_eq!(result.trades[0].quantity, 30);
    assert_eq!(result.trades[1].price, Price(98_00));
    assert_eq!(result.trades[1].quantity, 40);

    let depth = engine.depth(10);
    assert_eq!(depth.bids.len(), 1);
    assert_eq!(depth.bids[0].price, Price(98_00));
    assert_eq!(depth.bids[0].quantity, 10);
    assert_eq!(engine.last_trade_price(), Some(Price(98_00)));
}

/// S4 — Fill-or-kill insufficient liquidity.
#[test]
fn s4_fok_insufficient_rejects_cleanly() {
    let mut engine = SecurityEngine::new(aoe(), SessionId::new());
    engine.open_market();
    engine.submit_limit(UserId(1), Side::Sell, Price(100_00), 40, TimeInForce::GTC).unwrap();

    let result = engine
        .submit_limit(UserId(2), Side::Buy, Price(100_00), 50, TimeInForce::FOK)
        .unwrap();

    assert_eq!(result.status, OrderStatus::Rejected);
    assert!(result.trades.is_empty());
    assert_eq!(result.filled_quantity, 0);

    let depth = engine.depth(10);
    assert_eq!(depth.asks.len(), 1);
    assert_eq!(depth.asks[0].quantity, 40);
}

/// S5 — Price-time priority: the earlier order at a price level fills first.
#[test]
fn s5_price_time_priority() {
    let mut engine = SecurityEngine::new(aoe(), SessionId::new());
    engine.open_market();
    let a = engine
        .submit_limit(UserId(1), Side::Buy, Price(100_00), 20, TimeInForce::GTC)
        .unwrap();
    let b = engine
        .submit_limit(UserId(2), Side::Buy, Price(100_00), 20, TimeInForce::GTC)
        .unwrap();

    let result = engine.submit_market(UserId(3), Side::Sell, 20).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].passive_order_id, a.order_id);

    let depth = engine.depth(10);
    assert_eq!(depth.bids.len(), 1);
    assert_eq!(depth.bids[0].quantity, 20);
    let b_order = engine.get_order(b.order_id).unwrap();
    assert_eq!(b_order.remaining_quantity, 20);
}

/// S6 — Mark-to-market: a trade elsewhere in the security marks a holder's
/// unrealized PnL without touching cash or realized PnL.
#[test]
fn s6_mark_to_market_on_third_party_trade() {
    let plan = LessonPlan::new("scenario")
        .with_scenario_id("S6")
        .with_security(aoe())
        .with_starting_cash(Price(100_000_00))
        .with_command(0, Command::OpenMarket { security: aoe() })
        .with_command(
            0,
            Command::GrantPrivilege {
                target: tradesim::lesson::Target::All,
                privilege: tradesim::Privilege::ShortSell,
            },
        );
    let mut session = SessionRuntime::new(SessionId::new(), plan);
    session.join(UserId(1), "a", Role::Speculator);
    session.join(UserId(2), "b", Role::Speculator);
    session.join(UserId(3), "c", Role::Speculator);
    session.join(UserId(4), "d", Role::Speculator);
    session.start().unwrap();

    // A builds a +100 @ 100.00 position.
    session
        .submit_limit_order(UserId(1), aoe(), Side::Buy, Price(100_00), 100, TimeInForce::Day)
        .unwrap();
    session
        .submit_limit_order(UserId(2), aoe(), Side::Sell, Price(100_00), 100, TimeInForce::Day)
        .unwrap();

    let before = session.portfolio_snapshot(UserId(1));
    let cash_before = before.cash;
    let realized_before = before.realized_pnl;

    // A trade elsewhere in AOE at 105.00, between two other participants,
    // moves the mark without A ever trading again.
    session
        .submit_limit_order(UserId(3), aoe(), Side::Sell, Price(105_00), 10, TimeInForce::Day)
        .unwrap();
    session
        .submit_limit_order(UserId(4), aoe(), Side::Buy, Price(105_00), 10, TimeInForce::Day)
        .unwrap();

    let after = session.portfolio_snapshot(UserId(1));
    assert_eq!(after.unrealized_pnl, 100 * 5_00);
    assert_eq!(after.cash, cash_before);
    assert_eq!(after.realized_pnl, realized_before);
}
