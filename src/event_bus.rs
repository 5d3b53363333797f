//! The live event bus: a broadcast channel that fans out every session
//! event to however many student and instructor terminals are watching.
//!
//! This is distinct from the replay journal in [`crate::event`] /
//! [`crate::persistence`]: the journal is an ordered, durable log used to
//! reconstruct state after a crash, while the bus is a best-effort live feed
//! — a slow subscriber drops messages rather than stalling the session.

use tokio::sync::broadcast;

use crate::{OrderId, Price, Privilege, Quantity, Side, Symbol, TradeId, UserId};

/// A single notification pushed to subscribers.
///
/// Every variant carries a monotonically increasing `seq` so a client that
/// reconnects after a `Lagged` error can tell how many updates it missed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionEvent {
    OrderAccepted {
        seq: u64,
        order_id: OrderId,
        user_id: UserId,
        security: Symbol,
    },
    OrderRejected {
        seq: u64,
        user_id: UserId,
        security: Symbol,
        reason: String,
    },
    OrderCancelled {
        seq: u64,
        order_id: OrderId,
        security: Symbol,
    },
    TradeExecuted {
        seq: u64,
        trade_id: TradeId,
        security: Symbol,
        price: Price,
        quantity: Quantity,
        aggressor_side: Side,
    },
    BookChanged {
        seq: u64,
        security: Symbol,
    },
    MarketOpened {
        seq: u64,
        security: Symbol,
    },
    MarketClosed {
        seq: u64,
        security: Symbol,
    },
    /// A scarce privilege's bidding round has opened.
    PrivilegeAuctionStarted {
        seq: u64,
        privilege: Privilege,
    },
    /// A privilege auction has produced its winners.
    PrivilegeAuctionCompleted {
        seq: u64,
        privilege: Privilege,
        winners: Vec<UserId>,
    },
    /// A user's privilege grant changed as a result of a scripted command or
    /// an auction win.
    PrivilegeChanged {
        seq: u64,
        user_id: UserId,
        privilege: Privilege,
        granted: bool,
    },
    SessionPaused {
        seq: u64,
    },
    SessionResumed {
        seq: u64,
    },
    SessionEnded {
        seq: u64,
    },
}

impl SessionEvent {
    pub fn seq(&self) -> u64 {
        match self {
            SessionEvent::OrderAccepted { seq, .. }
            | SessionEvent::OrderRejected { seq, .. }
            | SessionEvent::OrderCancelled { seq, .. }
            | SessionEvent::TradeExecuted { seq, .. }
            | SessionEvent::BookChanged { seq, .. }
            | SessionEvent::MarketOpened { seq, .. }
            | SessionEvent::MarketClosed { seq, .. }
            | SessionEvent::PrivilegeAuctionStarted { seq, .. }
            | SessionEvent::PrivilegeAuctionCompleted { seq, .. }
            | SessionEvent::PrivilegeChanged { seq, .. }
            | SessionEvent::SessionPaused { seq }
            | SessionEvent::SessionResumed { seq }
            | SessionEvent::SessionEnded { seq } => *seq,
        }
    }
}

/// Default capacity of the broadcast channel's internal ring buffer.
///
/// Sized generously enough that a subscriber handling one tick of UI
/// rendering won't see a `Lagged` error under normal load; tune per
/// deployment if sessions run with heavier fan-out.
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Publishes [`SessionEvent`]s for one session and hands out subscriptions.
///
/// Wraps a `tokio::sync::broadcast::Sender` the way the session wraps a
/// single matching engine: one bus per session, shared by every connected
/// terminal.
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
    next_seq: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self {
            sender,
            next_seq: 0,
        }
    }

    /// Publish an event, stamping it with the next sequence number.
    ///
    /// Publishing never blocks: if there are no subscribers the event is
    /// simply dropped, and a full ring buffer overwrites its oldest entry.
    pub fn publish(&mut self, build: impl FnOnce(u64) -> SessionEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        // A send error only means there are currently no subscribers; the
        // event was still "published" from the engine's point of view.
        let _ = self.sender.send(build(seq));
    }

    /// Subscribe to the live feed. The returned receiver yields
    /// `Err(Lagged(n))` if it falls more than the channel capacity behind —
    /// callers should treat that as "resync from a fresh snapshot", never as
    /// a fatal error.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The sequence number the next published event will carry. A snapshot
    /// taken alongside a fresh `subscribe()` call is consistent with the
    /// stream starting here.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_is_received_by_subscriber() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(|seq| SessionEvent::MarketOpened {
            seq,
            security: Symbol::new("AOE"),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.seq(), 0);
        assert!(matches!(event, SessionEvent::MarketOpened { .. }));
    }

    #[tokio::test]
    async fn sequence_numbers_increase_monotonically() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe();

        for _ in 0..3 {
            bus.publish(|seq| SessionEvent::SessionPaused { seq });
        }

        for expected in 0..3u64 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.seq(), expected);
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let mut bus = EventBus::new();
        bus.publish(|seq| SessionEvent::SessionEnded { seq });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn next_seq_tracks_the_upcoming_publish() {
        let mut bus = EventBus::new();
        assert_eq!(bus.next_seq(), 0);
        bus.publish(|seq| SessionEvent::SessionPaused { seq });
        assert_eq!(bus.next_seq(), 1);
    }

    #[tokio::test]
    async fn lagging_subscriber_sees_lagged_error() {
        let mut bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..5 {
            bus.publish(|seq| SessionEvent::SessionResumed { seq });
        }

        let result = rx.recv().await;
        assert!(matches!(result, Err(broadcast::error::RecvError::Lagged(_))));
    }
}
