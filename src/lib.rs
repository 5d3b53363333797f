// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! # tradesim
//!
//! A multi-user trading simulation server for finance education: instructors
//! script a lesson as a timed sequence of commands — grant a privilege, open
//! a market, schedule a privilege auction — and a roster of students trade
//! against each other and a built-in liquidity provider through a real
//! price-time-priority matching engine.
//!
//! ## Layers
//!
//! - [`book`] / [`matching`] / [`stop`]: the single-security limit order book,
//!   its price-time matching algorithm, and pending stop/stop-limit orders.
//! - [`session`]: one [`session::matching::SecurityEngine`] per traded
//!   symbol plus the portfolio ledger and built-in liquidity provider,
//!   wired together by [`session::SessionRuntime`] into one lesson's
//!   lifecycle.
//! - [`privilege`]: the closed set of capabilities a session can grant or
//!   withhold per student.
//! - [`lesson`]: the instructor-authored script — a timed [`lesson::Command`]
//!   timeline plus session-wide defaults — a [`session::SessionRuntime`] replays.
//! - [`auction`]: the ascending-price mechanism used to allocate a scarce
//!   privilege among students who want it.
//! - [`event_bus`]: the live best-effort feed student/instructor terminals
//!   subscribe to.
//! - [`event`] / [`persistence`]: the durable, ordered journal used to
//!   reconstruct a session after a crash.
//!
//! ## Quick Start
//!
//! ```
//! use tradesim::session::matching::SecurityEngine;
//! use tradesim::{Price, SessionId, Side, Symbol, TimeInForce, UserId};
//!
//! let mut engine = SecurityEngine::new(Symbol::new("AOE"), SessionId::new());
//! engine.open_market();
//!
//! // Place a resting ask (sell order)
//! engine
//!     .submit_limit(UserId(1), Side::Sell, Price(101_00), 100, TimeInForce::GTC)
//!     .unwrap();
//!
//! // Place a bid that crosses — this will match!
//! let result = engine
//!     .submit_limit(UserId(2), Side::Buy, Price(101_00), 50, TimeInForce::GTC)
//!     .unwrap();
//!
//! assert_eq!(result.filled_quantity, 50);
//! assert_eq!(result.trades.len(), 1);
//! assert_eq!(result.trades[0].price, Price(101_00));
//! ```
//!
//! ## Price Representation
//!
//! Prices are stored as [`i64`] in the smallest unit (e.g., cents):
//!
//! ```
//! use tradesim::Price;
//!
//! let price = Price(100_50);  // $100.50
//! assert_eq!(format!("{}", price), "$100.50");
//! ```
//!
//! ## Running a lesson
//!
//! ```
//! use tradesim::lesson::{Command, LessonPlan, Role};
//! use tradesim::session::SessionRuntime;
//! use tradesim::{Price, SessionId, Side, Symbol, TimeInForce, UserId};
//!
//! let plan = LessonPlan::new("intro-to-limit-orders")
//!     .with_scenario_id("S1")
//!     .with_security(Symbol::new("AOE"))
//!     .with_starting_cash(Price(100_000_00))
//!     .with_command(0, Command::OpenMarket { security: Symbol::new("AOE") });
//!
//! let mut session = SessionRuntime::new(SessionId::new(), plan);
//! session.join(UserId(1), "alice", Role::Speculator);
//! session.join(UserId(2), "bob", Role::Speculator);
//! session.start().unwrap();
//!
//! session
//!     .submit_limit_order(UserId(1), Symbol::new("AOE"), Side::Sell, Price(100_00), 10, TimeInForce::GTC)
//!     .unwrap();
//! let result = session
//!     .submit_limit_order(UserId(2), Symbol::new("AOE"), Side::Buy, Price(100_00), 10, TimeInForce::GTC)
//!     .unwrap();
//! assert!(result.has_trades());
//! ```

pub mod auction;
mod book;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod lesson;
mod level;
mod matching;
mod order;
#[cfg(feature = "persistence")]
pub mod persistence;
pub mod portfolio;
mod price_levels;
pub mod privilege;
pub mod result;
pub mod security;
pub mod session;
mod side;
mod snapshot;
pub mod stop;
pub mod supervisor;
mod tif;
mod trade;
mod types;

pub use book::OrderBook;
pub use error::{SessionError, ValidationError};
pub use event::JournalEvent;
pub use lesson::LessonPlan;
pub use level::Level;
pub use matching::MatchResult;
pub use order::{Order, OrderStatus, OrderType};
pub use price_levels::PriceLevels;
pub use privilege::Privilege;
pub use result::{
    CancelError, CancelResult, ModifyError, ModifyResult, StopSubmitResult, SubmitResult,
};
pub use security::{Security, SecurityKind};
pub use side::Side;
pub use snapshot::{BookSnapshot, LevelSnapshot};
pub use stop::{StopBook, StopOrder, StopStatus};
pub use tif::TimeInForce;
pub use trade::Trade;
pub use types::{OrderId, Price, Quantity, SessionId, Symbol, Timestamp, TradeId, UserId};
