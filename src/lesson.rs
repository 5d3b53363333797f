//! Lesson plans: the instructor-authored script a session replays.

use crate::auction::AuctionConfig;
use crate::{Price, Privilege, Symbol, UserId};

/// Who a command's target resolves to.
///
/// Lesson authors write commands against named groups rather than raw user
/// ids, since the roster of who has joined isn't known until runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    /// Every user currently in the session.
    All,
    /// Users tagged as speculators (no designated market-making role).
    Speculators,
    /// Users tagged as market makers.
    MarketMakers,
    /// One specific user, by login name as assigned at session join time.
    User(String),
}

impl Target {
    /// Resolve this target against the session roster.
    ///
    /// `roster` maps each joined user to its tag (speculator / market maker).
    pub fn resolve(&self, roster: &[(UserId, String, Role)]) -> Vec<UserId> {
        match self {
            Target::All => roster.iter().map(|(id, _, _)| *id).collect(),
            Target::Speculators => roster
                .iter()
                .filter(|(_, _, role)| *role == Role::Speculator)
                .map(|(id, _, _)| *id)
                .collect(),
            Target::MarketMakers => roster
                .iter()
                .filter(|(_, _, role)| *role == Role::MarketMaker)
                .map(|(id, _, _)| *id)
                .collect(),
            Target::User(name) => roster
                .iter()
                .filter(|(_, login, _)| login == name)
                .map(|(id, _, _)| *id)
                .collect(),
        }
    }
}

/// The role tag a student is assigned when they join, used to resolve the
/// `$Speculators` and `$MarketMakers` groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Speculator,
    MarketMaker,
}

/// A single step of a lesson plan.
///
/// Commands are executed in order by the session engine; most take effect
/// immediately, `StartAuction` and the market open/close pair additionally
/// drive the session's own lifecycle state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Grant a privilege to every user a target resolves to.
    GrantPrivilege { target: Target, privilege: Privilege },
    /// Remove a privilege from every user a target resolves to.
    RemovePrivilege { target: Target, privilege: Privilege },
    /// Open continuous trading for a security.
    OpenMarket { security: Symbol },
    /// Halt a security; resting orders remain queued but cannot match.
    CloseMarket { security: Symbol },
    /// Enable or disable the built-in liquidity provider for a security.
    SetLiquidityTrader { security: Symbol, enabled: bool },
    /// Schedule a privilege auction. The auction is created in `Pending`
    /// state; `StartAuction` opens it for bidding.
    CreateAuction(AuctionConfig),
    /// Open the previously scheduled auction for the given privilege for
    /// bidding.
    StartAuction { privilege: Privilege },
    /// Override a target's starting cash balance for this session, replacing
    /// the session-wide default (used to seed unequal starting positions).
    SetHoldingValue { target: Target, amount: Price },
}

/// One entry in a lesson's timeline: a command plus the number of seconds
/// after session start at which the session engine should apply it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledCommand {
    /// Seconds elapsed since the session entered `InProgress`.
    pub offset_s: u64,
    pub command: Command,
}

/// An ordered, timed script plus the securities and session-wide defaults a
/// session is built from.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LessonPlan {
    /// Human-readable identifier for the scenario this plan implements.
    pub scenario_id: String,
    pub name: String,
    pub securities: Vec<Symbol>,
    /// Default starting cash for every student who doesn't get an explicit
    /// `SetHoldingValue` override.
    pub starting_cash: Price,
    /// Seconds after session start before the market opens automatically,
    /// if the plan doesn't drive `OpenMarket` itself via the timeline.
    pub market_open_delay_s: u64,
    /// Opening reference price per security, used to seed the liquidity
    /// provider and mark-to-market calculations before the first trade.
    pub starting_prices: Vec<(Symbol, Price)>,
    pub timeline: Vec<ScheduledCommand>,
}

impl LessonPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scenario_id: String::new(),
            name: name.into(),
            securities: Vec::new(),
            starting_cash: Price(0),
            market_open_delay_s: 0,
            starting_prices: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub fn with_scenario_id(mut self, scenario_id: impl Into<String>) -> Self {
        self.scenario_id = scenario_id.into();
        self
    }

    pub fn with_security(mut self, symbol: Symbol) -> Self {
        self.securities.push(symbol);
        self
    }

    pub fn with_starting_cash(mut self, amount: Price) -> Self {
        self.starting_cash = amount;
        self
    }

    pub fn with_starting_price(mut self, symbol: Symbol, price: Price) -> Self {
        self.starting_prices.push((symbol, price));
        self
    }

    pub fn with_command(mut self, offset_s: u64, command: Command) -> Self {
        self.timeline.push(ScheduledCommand { offset_s, command });
        self
    }

    /// The starting price seeded for `symbol`, if the plan specifies one.
    pub fn starting_price(&self, symbol: Symbol) -> Option<Price> {
        self.starting_prices
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, p)| *p)
    }
}
