//! Securities tradeable within a session.

use crate::{Price, Symbol};

/// Broad asset class of a security. Determines which order types and
/// lifecycle rules apply (e.g. options can expire, equities cannot).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SecurityKind {
    Equity,
    Bond,
    Option,
    Future,
}

/// A tradeable instrument within a session.
///
/// Created by the instructor when building a lesson plan, one per symbol
/// the session will quote. Immutable once the session starts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Security {
    pub symbol: Symbol,
    pub kind: SecurityKind,
    /// Minimum price increment. Limit and stop prices must be a multiple of this.
    pub tick_size: Price,
    /// Number of decimal digits used when quoting price to students.
    pub quote_precision: u8,
}

impl Security {
    pub fn new(symbol: Symbol, kind: SecurityKind, tick_size: Price) -> Self {
        Self {
            symbol,
            kind,
            tick_size,
            quote_precision: 2,
        }
    }

    /// Returns true if `price` lands exactly on a tick boundary.
    pub fn is_valid_tick(&self, price: Price) -> bool {
        if self.tick_size.0 <= 0 {
            return true;
        }
        price.0 % self.tick_size.0 == 0
    }
}
