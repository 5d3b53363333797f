//! Error taxonomy for session and order operations.

use crate::{SessionId, Symbol, UserId};

/// Errors returned by validated order submission methods.
///
/// Field-level problems with an order that are caught before it is ever
/// handed to a matching engine (as opposed to [`SessionError`], which also
/// covers session lifecycle and privilege failures).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    /// Quantity must be greater than zero.
    ZeroQuantity,
    /// Price must be greater than zero for limit orders.
    ZeroPrice,
    /// Stop / stop-limit orders require a stop price.
    MissingStopPrice,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroQuantity => write!(f, "quantity must be greater than zero"),
            ValidationError::ZeroPrice => write!(f, "price must be greater than zero"),
            ValidationError::MissingStopPrice => {
                write!(f, "stop orders require a stop price")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors arising from the session's own lifecycle state (paused, not yet
/// started, already ended).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionStateError {
    /// The session has not started yet.
    NotStarted,
    /// The session is paused; new orders are rejected until resumed.
    Paused,
    /// The session has already completed or was cancelled.
    Ended,
}

impl std::fmt::Display for SessionStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStateError::NotStarted => write!(f, "session has not started"),
            SessionStateError::Paused => write!(f, "session is paused"),
            SessionStateError::Ended => write!(f, "session has ended"),
        }
    }
}

impl std::error::Error for SessionStateError {}

/// The `SessionError` taxonomy returned by every command the session engine
/// accepts.
///
/// Each variant maps to exactly one of the rejection categories a student
/// terminal can display: a validation problem with the order itself, the
/// session being in the wrong lifecycle state, the security being halted,
/// a missing privilege, cash insufficient to cover a buy's estimated cost,
/// a market order with no resting opposite side (or an all-or-nothing order
/// that can't be filled in full), a reference to something that does not
/// exist, or an invariant violation inside the engine that should never
/// happen in practice.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The order itself failed validation (bad price/quantity/stop price).
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The session is not accepting commands right now.
    #[error("session {session_id} unavailable: {source}")]
    SessionState {
        session_id: SessionId,
        #[source]
        source: SessionStateError,
    },

    /// The security is halted or the market for it is closed.
    #[error("market closed for {security}")]
    MarketClosed { security: Symbol },

    /// The user lacks the privilege required to issue this command.
    #[error("user {user_id} lacks privilege {privilege}")]
    Privilege { user_id: UserId, privilege: String },

    /// A buy's estimated notional (limit price, or current best ask, or
    /// last mark, times quantity) exceeds the submitter's cash balance.
    #[error(
        "user {user_id} has insufficient funds: requires {required}, has {available}"
    )]
    InsufficientFunds {
        user_id: UserId,
        required: i64,
        available: i64,
    },

    /// A market order found no resting liquidity on the opposite side, or a
    /// fill-or-kill order could not be fully filled against resting liquidity.
    #[error("no liquidity available for {security}")]
    Liquidity { security: Symbol },

    /// A referenced entity (order, session, user, security) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An internal invariant was violated. Indicates an engine bug, not a
    /// user-facing validation problem.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", ValidationError::ZeroQuantity),
            "quantity must be greater than zero"
        );
        assert_eq!(
            format!("{}", ValidationError::ZeroPrice),
            "price must be greater than zero"
        );
        assert_eq!(
            format!("{}", ValidationError::MissingStopPrice),
            "stop orders require a stop price"
        );
    }

    #[test]
    fn validation_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ValidationError::ZeroQuantity);
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn session_error_from_validation() {
        let err: SessionError = ValidationError::ZeroPrice.into();
        assert!(matches!(err, SessionError::Validation(ValidationError::ZeroPrice)));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn session_error_market_closed_message() {
        let err = SessionError::MarketClosed {
            security: Symbol::new("AOE"),
        };
        assert_eq!(err.to_string(), "market closed for AOE");
    }

    #[test]
    fn session_error_privilege_message() {
        let err = SessionError::Privilege {
            user_id: UserId(3),
            privilege: "SHORT_SELL".to_string(),
        };
        assert_eq!(err.to_string(), "user U3 lacks privilege SHORT_SELL");
    }

    #[test]
    fn session_error_insufficient_funds_message() {
        let err = SessionError::InsufficientFunds {
            user_id: UserId(1),
            required: 100_000_00,
            available: 100_00,
        };
        assert_eq!(
            err.to_string(),
            "user U1 has insufficient funds: requires 10000000, has 10000"
        );
    }

    #[test]
    fn session_error_liquidity_message() {
        let err = SessionError::Liquidity {
            security: Symbol::new("AOE"),
        };
        assert_eq!(err.to_string(), "no liquidity available for AOE");
    }
}
