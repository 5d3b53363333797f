//! Journal events: the durable, ordered replay log for a session.
//!
//! Distinct from [`crate::event_bus`]'s live fan-out feed: the journal
//! records every input the session engine accepted (order submissions,
//! cancels, modifies, and scripted lesson commands), scoped to the session,
//! security, and user that produced them, so a session's state can be
//! reconstructed exactly by replaying it from an empty [`crate::session::matching::SecurityEngine`]
//! and [`crate::session::portfolio::PortfolioEngine`] pair. A slow bus
//! subscriber can drop a live update; the journal never does.

use crate::lesson::Command;
use crate::{OrderId, Price, Quantity, SessionId, Side, Symbol, TimeInForce, UserId};

/// One durable input to a session, in the order the session engine accepted it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JournalEvent {
    /// A limit order submission.
    SubmitLimit {
        session_id: SessionId,
        user_id: UserId,
        security: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        time_in_force: TimeInForce,
    },
    /// A market order submission.
    SubmitMarket {
        session_id: SessionId,
        user_id: UserId,
        security: Symbol,
        side: Side,
        quantity: Quantity,
    },
    /// A stop or stop-limit order submission.
    SubmitStop {
        session_id: SessionId,
        user_id: UserId,
        security: Symbol,
        side: Side,
        stop_price: Price,
        limit_price: Option<Price>,
        quantity: Quantity,
        time_in_force: TimeInForce,
    },
    /// An order cancellation request.
    Cancel {
        session_id: SessionId,
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
    },
    /// An order modification (cancel and replace at a new price/quantity).
    Modify {
        session_id: SessionId,
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    },
    /// A scripted lesson command applied by the session engine's own
    /// scheduler rather than by a participant's order submission.
    LessonCommand {
        session_id: SessionId,
        command: Command,
    },
}

impl JournalEvent {
    /// The session this event belongs to, for every variant.
    pub fn session_id(&self) -> SessionId {
        match self {
            JournalEvent::SubmitLimit { session_id, .. }
            | JournalEvent::SubmitMarket { session_id, .. }
            | JournalEvent::SubmitStop { session_id, .. }
            | JournalEvent::Cancel { session_id, .. }
            | JournalEvent::Modify { session_id, .. }
            | JournalEvent::LessonCommand { session_id, .. } => *session_id,
        }
    }
}

/// An append-only, in-memory log of [`JournalEvent`]s for one session.
///
/// The session engine appends to this as it accepts inputs; persistence
/// (see [`crate::persistence`]) reads it back out for durable storage.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    events: Vec<JournalEvent>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one accepted input.
    pub fn record(&mut self, event: JournalEvent) {
        self.events.push(event);
    }

    /// All recorded events, in acceptance order.
    pub fn events(&self) -> &[JournalEvent] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop all recorded events, e.g. after they have been durably persisted.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
