//! Core types: Price, Quantity, Timestamp, OrderId, TradeId, Symbol, UserId, SessionId

use std::fmt;

/// Price in smallest units (e.g., cents, basis points).
///
/// `Price(10050)` represents $100.50 if tick size is $0.01.
/// Using fixed-point avoids floating-point errors in financial calculations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);
    pub const MAX: Price = Price(i64::MAX);
    pub const MIN: Price = Price(i64::MIN);
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display as dollars.cents assuming cents
        let dollars = self.0 / 100;
        let cents = (self.0 % 100).abs();
        if self.0 < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), cents)
        } else {
            write!(f, "${}.{:02}", dollars, cents)
        }
    }
}

/// Quantity of shares/contracts. Always positive.
pub type Quantity = u64;

/// Timestamp in nanoseconds since session start.
/// Monotonically increasing, assigned by the matching engine.
pub type Timestamp = u64;

/// Unique order identifier assigned by the matching engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// Unique trade identifier assigned by the matching engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Maximum length of a symbol, in bytes. Covers every real ticker and then some.
const SYMBOL_CAP: usize = 15;

/// A security identifier ("AAPL", "AOE", ...).
///
/// Stored inline (no heap allocation) so it stays `Copy` and cheap to use as
/// a hash map key across order books, positions, and event payloads.
#[derive(Clone, Copy, Eq, Hash)]
pub struct Symbol {
    buf: [u8; SYMBOL_CAP],
    len: u8,
}

impl Symbol {
    /// Build a symbol from a string slice.
    ///
    /// # Panics
    ///
    /// Panics if `s` is longer than `SYMBOL_CAP` bytes or is not ASCII.
    pub fn new(s: &str) -> Self {
        assert!(s.is_ascii(), "symbol must be ASCII: {s:?}");
        assert!(
            s.len() <= SYMBOL_CAP,
            "symbol too long ({} > {SYMBOL_CAP}): {s:?}",
            s.len()
        );
        let mut buf = [0u8; SYMBOL_CAP];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        Self {
            buf,
            len: s.len() as u8,
        }
    }

    /// Borrow the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len as usize]).expect("symbol bytes are ASCII")
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::new("")
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(&s))
    }
}

/// A participant in a session: an instructor or a student terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

/// Unique identifier for a running session, assigned by the supervisor.
///
/// Wraps a UUID rather than a sequential counter since sessions are created
/// and torn down independently by instructors across a shared process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_ordering() {
        assert!(Price(100) < Price(200));
        assert!(Price(-50) < Price(50));
        assert_eq!(Price(100), Price(100));
    }

    #[test]
    fn price_display() {
        assert_eq!(format!("{}", Price(10050)), "$100.50");
        assert_eq!(format!("{}", Price(100)), "$1.00");
        assert_eq!(format!("{}", Price(5)), "$0.05");
        assert_eq!(format!("{}", Price(-250)), "-$2.50");
    }

    #[test]
    fn order_id_display() {
        assert_eq!(format!("{}", OrderId(42)), "O42");
    }

    #[test]
    fn trade_id_display() {
        assert_eq!(format!("{}", TradeId(7)), "T7");
    }

    #[test]
    fn symbol_roundtrip() {
        let sym = Symbol::new("AAPL");
        assert_eq!(sym.as_str(), "AAPL");
        assert_eq!(format!("{sym}"), "AAPL");
    }

    #[test]
    fn symbol_equality_and_hash() {
        assert_eq!(Symbol::new("AOE"), Symbol::new("AOE"));
        assert_ne!(Symbol::new("AOE"), Symbol::new("MSFT"));
    }

    #[test]
    fn symbol_ordering_is_lexicographic() {
        assert!(Symbol::new("AAPL") < Symbol::new("MSFT"));
    }

    #[test]
    #[should_panic(expected = "symbol too long")]
    fn symbol_too_long_panics() {
        Symbol::new("WAY_TOO_LONG_FOR_A_TICKER");
    }

    #[test]
    fn user_id_display() {
        assert_eq!(format!("{}", UserId(3)), "U3");
    }

    #[test]
    fn session_id_is_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
