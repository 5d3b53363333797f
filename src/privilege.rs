//! The privilege registry: a fixed catalog of command-level permissions an
//! instructor can grant to or remove from a student, scoped to one session.

use rustc_hash::FxHashMap;

use crate::{SessionId, UserId};

/// Which part of the system a privilege gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrivilegeCategory {
    /// Submitting or cancelling orders.
    Trading,
    /// Reading market data (book depth, trade tape).
    MarketData,
    /// Portfolio and risk queries.
    Analysis,
    /// Session administration (open/close market, manage privileges).
    Admin,
    /// Everything else a capability table needs a slot for (auction
    /// participation and similar conveniences that are neither a trading
    /// action nor an administrative one).
    Utility,
}

/// A single grantable permission.
///
/// This is a fixed, closed enumeration — new capabilities are added here,
/// never invented ad hoc by a lesson plan. Each privilege carries the
/// category it belongs to and whether it is meaningful during an auction
/// (some trading actions, like IOC orders, make no sense while the book is
/// in a call-auction cross and are excluded from auction participation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Privilege {
    SubmitLimitOrder,
    SubmitMarketOrder,
    SubmitStopOrder,
    SubmitStopLimitOrder,
    SubmitDayOrder,
    SubmitIocOrder,
    SubmitFokOrder,
    CancelOwnOrder,
    ModifyOwnOrder,
    ShortSell,
    ViewTopOfBook,
    ViewFullDepth,
    ViewTradeTape,
    ViewOwnPortfolio,
    ViewOthersPortfolio,
    ParticipateInAuction,
    SubmitAuctionOrder,
    GrantPrivilege,
    RemovePrivilege,
    OpenMarket,
    CloseMarket,
    SetLiquidityTrader,
    CreateAuction,
    StartAuction,
    SetHoldingValue,
    PauseSession,
    ResumeSession,
}

impl Privilege {
    pub fn category(self) -> PrivilegeCategory {
        use Privilege::*;
        match self {
            SubmitLimitOrder | SubmitMarketOrder | SubmitStopOrder | SubmitStopLimitOrder
            | SubmitDayOrder | SubmitIocOrder | SubmitFokOrder | CancelOwnOrder
            | ModifyOwnOrder | ShortSell => PrivilegeCategory::Trading,
            ViewTopOfBook | ViewFullDepth | ViewTradeTape => PrivilegeCategory::MarketData,
            ViewOwnPortfolio | ViewOthersPortfolio => PrivilegeCategory::Analysis,
            GrantPrivilege | RemovePrivilege | OpenMarket | CloseMarket | SetLiquidityTrader
            | CreateAuction | StartAuction | SetHoldingValue | PauseSession
            | ResumeSession => PrivilegeCategory::Admin,
            ParticipateInAuction | SubmitAuctionOrder => PrivilegeCategory::Utility,
        }
    }

    /// A stable integer id for this privilege, suitable for wire transport
    /// or persistence — the enum's declaration order, which only grows by
    /// appending new variants at the end.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// The human-readable name shown to an instructor configuring grants.
    pub fn name(self) -> &'static str {
        use Privilege::*;
        match self {
            SubmitLimitOrder => "Submit Limit Order",
            SubmitMarketOrder => "Submit Market Order",
            SubmitStopOrder => "Submit Stop Order",
            SubmitStopLimitOrder => "Submit Stop-Limit Order",
            SubmitDayOrder => "Submit Day Order",
            SubmitIocOrder => "Submit Immediate-or-Cancel Order",
            SubmitFokOrder => "Submit Fill-or-Kill Order",
            CancelOwnOrder => "Cancel Own Order",
            ModifyOwnOrder => "Modify Own Order",
            ShortSell => "Short Sell",
            ViewTopOfBook => "View Top of Book",
            ViewFullDepth => "View Full Depth",
            ViewTradeTape => "View Trade Tape",
            ViewOwnPortfolio => "View Own Portfolio",
            ViewOthersPortfolio => "View Others' Portfolio",
            ParticipateInAuction => "Participate in Auction",
            SubmitAuctionOrder => "Submit Auction Order",
            GrantPrivilege => "Grant Privilege",
            RemovePrivilege => "Remove Privilege",
            OpenMarket => "Open Market",
            CloseMarket => "Close Market",
            SetLiquidityTrader => "Set Liquidity Trader",
            CreateAuction => "Create Auction",
            StartAuction => "Start Auction",
            SetHoldingValue => "Set Holding Value",
            PauseSession => "Pause Session",
            ResumeSession => "Resume Session",
        }
    }

    /// Returns true if this privilege remains meaningful while a security is
    /// in a call-auction cross (as opposed to continuous trading).
    pub fn auctionable(self) -> bool {
        matches!(
            self,
            Privilege::SubmitAuctionOrder
                | Privilege::ParticipateInAuction
                | Privilege::ViewTopOfBook
                | Privilege::ViewFullDepth
                | Privilege::ViewTradeTape
                | Privilege::ViewOwnPortfolio
        )
    }
}

/// Default privileges granted to every student the moment they join a
/// session, before the instructor customizes anything.
pub const DEFAULT_STUDENT_PRIVILEGES: &[Privilege] = &[
    Privilege::SubmitLimitOrder,
    Privilege::SubmitMarketOrder,
    Privilege::SubmitIocOrder,
    Privilege::SubmitFokOrder,
    Privilege::SubmitDayOrder,
    Privilege::CancelOwnOrder,
    Privilege::ModifyOwnOrder,
    Privilege::ViewTopOfBook,
    Privilege::ViewTradeTape,
    Privilege::ViewOwnPortfolio,
];

/// Per-(session, user) grant table.
///
/// Keyed the same way `MultiExchange` keys its per-symbol order books: a
/// flat hash map, since sessions and users are both small in number
/// relative to orders and trades.
#[derive(Debug, Default)]
pub struct PrivilegeRegistry {
    grants: FxHashMap<(SessionId, UserId), std::collections::HashSet<Privilege>>,
}

impl PrivilegeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's privilege set with the session default grant.
    pub fn init_user(&mut self, session_id: SessionId, user_id: UserId) {
        let set = self.grants.entry((session_id, user_id)).or_default();
        set.extend(DEFAULT_STUDENT_PRIVILEGES.iter().copied());
    }

    pub fn grant(&mut self, session_id: SessionId, user_id: UserId, privilege: Privilege) {
        self.grants
            .entry((session_id, user_id))
            .or_default()
            .insert(privilege);
    }

    pub fn remove(&mut self, session_id: SessionId, user_id: UserId, privilege: Privilege) {
        if let Some(set) = self.grants.get_mut(&(session_id, user_id)) {
            set.remove(&privilege);
        }
    }

    pub fn has(&self, session_id: SessionId, user_id: UserId, privilege: Privilege) -> bool {
        self.grants
            .get(&(session_id, user_id))
            .is_some_and(|set| set.contains(&privilege))
    }

    /// Every privilege currently granted to `user_id`, for display in a
    /// snapshot. Empty (not an error) if the user has never been seen.
    pub fn granted(&self, session_id: SessionId, user_id: UserId) -> Vec<Privilege> {
        self.grants
            .get(&(session_id, user_id))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Grant every currently-known user in the session the given privilege.
    /// Used to resolve the `$All` group in a lesson command.
    pub fn grant_all(&mut self, session_id: SessionId, privilege: Privilege) {
        for ((sid, _uid), set) in self.grants.iter_mut() {
            if *sid == session_id {
                set.insert(privilege);
            }
        }
    }

    /// Drop every grant recorded for a session (on session teardown).
    pub fn clear_session(&mut self, session_id: SessionId) {
        self.grants.retain(|(sid, _), _| *sid != session_id);
    }
}
