//! The session actor: one serial execution context per session.
//!
//! A [`SessionRuntime`] is `!Sync` by convention — it is never accessed from
//! more than one task at a time. The actor enforces that by owning the
//! runtime exclusively and processing one [`Command`](Envelope) at a time off
//! a mailbox, so the engine itself never needs internal locking.

use tokio::sync::{mpsc, oneshot};

use crate::error::SessionError;
use crate::event_bus::SessionEvent;
use crate::lesson::{LessonPlan, Role};
use crate::result::{CancelResult, ModifyResult};
use crate::session::matching::SubmitResult;
use crate::session::portfolio::PortfolioSnapshot;
use crate::session::snapshot::SessionSnapshot;
use crate::{OrderId, Price, Quantity, SessionId, Side, Symbol, TimeInForce, UserId};

use super::{SessionLifecycle, SessionRuntime};

/// One request sent to a running session's mailbox, paired with the channel
/// its result is delivered on.
enum Envelope {
    Join {
        user_id: UserId,
        login: String,
        role: Role,
        reply: oneshot::Sender<()>,
    },
    Start(oneshot::Sender<Result<(), SessionError>>),
    Pause(oneshot::Sender<Result<(), SessionError>>),
    Resume(oneshot::Sender<Result<(), SessionError>>),
    End(oneshot::Sender<Result<(), SessionError>>),
    Advance {
        elapsed_s: u64,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SubmitLimit {
        user_id: UserId,
        security: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
        reply: oneshot::Sender<Result<SubmitResult, SessionError>>,
    },
    SubmitMarket {
        user_id: UserId,
        security: Symbol,
        side: Side,
        quantity: Quantity,
        reply: oneshot::Sender<Result<SubmitResult, SessionError>>,
    },
    CancelOrder {
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
        reply: oneshot::Sender<Result<CancelResult, SessionError>>,
    },
    ModifyOrder {
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        reply: oneshot::Sender<Result<ModifyResult, SessionError>>,
    },
    PortfolioSnapshot {
        user_id: UserId,
        reply: oneshot::Sender<PortfolioSnapshot>,
    },
    Lifecycle(oneshot::Sender<SessionLifecycle>),
    Subscribe(oneshot::Sender<tokio::sync::broadcast::Receiver<SessionEvent>>),
    SubscribeWithSnapshot {
        user_id: UserId,
        #[allow(clippy::type_complexity)]
        reply: oneshot::Sender<(SessionSnapshot, tokio::sync::broadcast::Receiver<SessionEvent>)>,
    },
}

/// A cheap, cloneable reference to a running session.
///
/// Every method sends one [`Envelope`] across the mailbox and awaits its
/// reply; the actor task processes requests strictly in arrival order, so
/// two students racing to hit the same price level see a well-defined
/// ordering rather than a data race.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<Envelope>,
}

/// Channel depth for a session's mailbox. Generous enough that a burst of
/// simultaneous order submissions from an active classroom doesn't apply
/// backpressure under normal load.
const MAILBOX_CAPACITY: usize = 256;

impl SessionHandle {
    /// Spawn a session actor task and return a handle to it. The task runs
    /// until every clone of the returned handle (and the internally retained
    /// sender) is dropped.
    pub fn spawn(session_id: SessionId, lesson: LessonPlan) -> Self {
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
        let runtime = SessionRuntime::new(session_id, lesson);
        tokio::spawn(run(runtime, receiver));
        Self { session_id, sender }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Envelope) -> T {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .expect("session actor task ended unexpectedly");
        rx.await.expect("session actor dropped reply channel")
    }

    pub async fn join(&self, user_id: UserId, login: impl Into<String>, role: Role) {
        let login = login.into();
        self.call(|reply| Envelope::Join { user_id, login, role, reply }).await
    }

    pub async fn start(&self) -> Result<(), SessionError> {
        self.call(Envelope::Start).await
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.call(Envelope::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.call(Envelope::Resume).await
    }

    pub async fn end(&self) -> Result<(), SessionError> {
        self.call(Envelope::End).await
    }

    pub async fn advance(&self, elapsed_s: u64) -> Result<(), SessionError> {
        self.call(|reply| Envelope::Advance { elapsed_s, reply }).await
    }

    pub async fn submit_limit_order(
        &self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
    ) -> Result<SubmitResult, SessionError> {
        self.call(|reply| Envelope::SubmitLimit {
            user_id,
            security,
            side,
            price,
            quantity,
            tif,
            reply,
        })
        .await
    }

    pub async fn submit_market_order(
        &self,
        user_id: UserId,
        security: Symbol,
        side: Side,
        quantity: Quantity,
    ) -> Result<SubmitResult, SessionError> {
        self.call(|reply| Envelope::SubmitMarket { user_id, security, side, quantity, reply })
            .await
    }

    pub async fn cancel_order(
        &self,
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
    ) -> Result<CancelResult, SessionError> {
        self.call(|reply| Envelope::CancelOrder { user_id, security, order_id, reply }).await
    }

    pub async fn modify_order(
        &self,
        user_id: UserId,
        security: Symbol,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<ModifyResult, SessionError> {
        self.call(|reply| Envelope::ModifyOrder {
            user_id,
            security,
            order_id,
            new_price,
            new_quantity,
            reply,
        })
        .await
    }

    pub async fn portfolio_snapshot(&self, user_id: UserId) -> PortfolioSnapshot {
        self.call(|reply| Envelope::PortfolioSnapshot { user_id, reply }).await
    }

    pub async fn lifecycle(&self) -> SessionLifecycle {
        self.call(Envelope::Lifecycle).await
    }

    /// Subscribe to this session's live event feed.
    ///
    /// Requires a round trip through the mailbox since the bus lives inside
    /// the runtime the actor task owns exclusively.
    pub async fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(Envelope::Subscribe(reply))
            .await
            .expect("session actor task ended unexpectedly");
        rx.await.expect("session actor dropped reply channel")
    }

    /// The external `subscribe(sessionId, userId) -> (snapshot, eventStream)`
    /// contract: both halves are produced within the same mailbox turn, so
    /// the snapshot is guaranteed consistent with the stream starting at
    /// `snapshot.seq` — no event can be produced, and no state can change,
    /// between the two.
    pub async fn subscribe_with_snapshot(
        &self,
        user_id: UserId,
    ) -> (SessionSnapshot, tokio::sync::broadcast::Receiver<SessionEvent>) {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(Envelope::SubscribeWithSnapshot { user_id, reply })
            .await
            .expect("session actor task ended unexpectedly");
        rx.await.expect("session actor dropped reply channel")
    }
}

async fn run(mut runtime: SessionRuntime, mut mailbox: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = mailbox.recv().await {
        match envelope {
            Envelope::Join { user_id, login, role, reply } => {
                runtime.join(user_id, login, role);
                let _ = reply.send(());
            }
            Envelope::Start(reply) => {
                let _ = reply.send(runtime.start());
            }
            Envelope::Pause(reply) => {
                let _ = reply.send(runtime.pause());
            }
            Envelope::Resume(reply) => {
                let _ = reply.send(runtime.resume());
            }
            Envelope::End(reply) => {
                let _ = reply.send(runtime.end());
            }
            Envelope::Advance { elapsed_s, reply } => {
                let _ = reply.send(runtime.advance(elapsed_s));
            }
            Envelope::SubmitLimit { user_id, security, side, price, quantity, tif, reply } => {
                let _ = reply.send(runtime.submit_limit_order(user_id, security, side, price, quantity, tif));
            }
            Envelope::SubmitMarket { user_id, security, side, quantity, reply } => {
                let _ = reply.send(runtime.submit_market_order(user_id, security, side, quantity));
            }
            Envelope::CancelOrder { user_id, security, order_id, reply } => {
                let _ = reply.send(runtime.cancel_order(user_id, security, order_id));
            }
            Envelope::ModifyOrder { user_id, security, order_id, new_price, new_quantity, reply } => {
                let _ = reply.send(runtime.modify_order(user_id, security, order_id, new_price, new_quantity));
            }
            Envelope::PortfolioSnapshot { user_id, reply } => {
                let _ = reply.send(runtime.portfolio_snapshot(user_id));
            }
            Envelope::Lifecycle(reply) => {
                let _ = reply.send(runtime.lifecycle());
            }
            Envelope::Subscribe(reply) => {
                let _ = reply.send(runtime.event_bus.subscribe());
            }
            Envelope::SubscribeWithSnapshot { user_id, reply } => {
                let snapshot = runtime.snapshot(user_id);
                let stream = runtime.event_bus.subscribe();
                let _ = reply.send((snapshot, stream));
            }
        }
    }
}
