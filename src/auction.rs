//! Privilege auctions: an ascending-price mechanism for allocating a scarce
//! capability (e.g. "only 2 seats at the market-maker desk") to the highest
//! bidders among the students who want it.
//!
//! This is unrelated to a security's call-auction price cross — that lives
//! entirely inside [`crate::session::matching`]. A privilege auction never
//! touches an order book; it only decides who ends up holding a
//! [`crate::Privilege`] grant.

use rustc_hash::FxHashMap;

use crate::{Price, Privilege, UserId};

/// Errors raised by auction state transitions.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AuctionError {
    /// `start` was called on an auction that is already running.
    #[error("auction for {privilege:?} is already active")]
    AlreadyActive { privilege: Privilege },
    /// A bid or round advance was attempted before `start`.
    #[error("auction for {privilege:?} has not started")]
    NotActive { privilege: Privilege },
    /// The auction has already produced winners and cannot accept more input.
    #[error("auction for {privilege:?} has already completed")]
    AlreadyCompleted { privilege: Privilege },
}

/// Configuration an instructor supplies when scheduling a privilege auction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuctionConfig {
    /// The privilege being allocated.
    pub privilege: Privilege,
    /// How many students may win the privilege.
    pub available: u32,
    /// The opening clock price.
    pub initial_price: Price,
    /// How much the clock price rises each round.
    pub increment: Price,
    /// How long, in seconds, each round stays open before advancing.
    pub interval_s: u64,
}

/// Lifecycle of one privilege auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuctionState {
    /// Created but not yet accepting bids.
    Pending,
    /// Accepting bids at the current clock price.
    Active,
    /// Winners have been determined; no further bids accepted.
    Completed,
}

/// An ascending-clock ("English") auction for one [`Privilege`].
///
/// Every participant declares the maximum clock price they are willing to
/// pay. Each round the clock price rises by `increment`; anyone whose max
/// is below the new price drops out. The auction completes the first round
/// in which the number of remaining participants is at or below `available`
/// seats, or when participation hits zero.
pub struct Auction {
    config: AuctionConfig,
    state: AuctionState,
    current_price: Price,
    /// Max price each still-active bidder is willing to pay.
    bids: FxHashMap<UserId, Price>,
    winners: Vec<UserId>,
}

impl Auction {
    pub fn new(config: AuctionConfig) -> Self {
        let current_price = config.initial_price;
        Self {
            config,
            state: AuctionState::Pending,
            current_price,
            bids: FxHashMap::default(),
            winners: Vec::new(),
        }
    }

    pub fn privilege(&self) -> Privilege {
        self.config.privilege
    }

    pub fn state(&self) -> AuctionState {
        self.state
    }

    pub fn current_price(&self) -> Price {
        self.current_price
    }

    pub fn winners(&self) -> &[UserId] {
        &self.winners
    }

    /// Open the auction for bidding at `initial_price`.
    pub fn start(&mut self) -> Result<(), AuctionError> {
        if self.state != AuctionState::Pending {
            return Err(AuctionError::AlreadyActive {
                privilege: self.config.privilege,
            });
        }
        self.state = AuctionState::Active;
        Ok(())
    }

    /// Declare (or update) the maximum clock price `user_id` will pay.
    ///
    /// A bid below the current clock price is accepted but drops the bidder
    /// out on the very next round advance, same as never bidding at all.
    pub fn bid(&mut self, user_id: UserId, max_price: Price) -> Result<(), AuctionError> {
        if self.state != AuctionState::Active {
            return Err(AuctionError::NotActive {
                privilege: self.config.privilege,
            });
        }
        self.bids.insert(user_id, max_price);
        Ok(())
    }

    /// Advance one round: drop bidders below the new clock price, then check
    /// whether the field has narrowed to `available` seats or fewer.
    ///
    /// Returns `true` if this round produced winners and completed the
    /// auction.
    pub fn advance_round(&mut self) -> Result<bool, AuctionError> {
        if self.state != AuctionState::Active {
            return Err(AuctionError::NotActive {
                privilege: self.config.privilege,
            });
        }

        self.bids
            .retain(|_, max_price| max_price.0 >= self.current_price.0);

        if self.bids.len() as u32 <= self.config.available {
            self.finish();
            return Ok(true);
        }

        self.current_price = Price(self.current_price.0 + self.config.increment.0);
        Ok(false)
    }

    fn finish(&mut self) {
        let mut winners: Vec<(UserId, Price)> =
            self.bids.iter().map(|(user_id, price)| (*user_id, *price)).collect();
        // Highest bid wins ties; stable fallback on user id keeps replay deterministic.
        winners.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.0.0.cmp(&b.0.0)));
        self.winners = winners
            .into_iter()
            .take(self.config.available as usize)
            .map(|(user_id, _)| user_id)
            .collect();
        self.state = AuctionState::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(available: u32) -> AuctionConfig {
        AuctionConfig {
            privilege: Privilege::ShortSell,
            available,
            initial_price: Price(10_00),
            increment: Price(1_00),
            interval_s: 30,
        }
    }

    #[test]
    fn bidding_before_start_is_rejected() {
        let mut auction = Auction::new(config(1));
        assert!(auction.bid(UserId(1), Price(20_00)).is_err());
    }

    #[test]
    fn field_already_within_seats_completes_on_first_round() {
        let mut auction = Auction::new(config(2));
        auction.start().unwrap();
        auction.bid(UserId(1), Price(15_00)).unwrap();
        auction.bid(UserId(2), Price(12_00)).unwrap();

        let completed = auction.advance_round().unwrap();
        assert!(completed);
        assert_eq!(auction.state(), AuctionState::Completed);
        let mut winners = auction.winners().to_vec();
        winners.sort_by_key(|u| u.0);
        assert_eq!(winners, vec![UserId(1), UserId(2)]);
    }

    #[test]
    fn narrows_field_across_rounds() {
        let mut auction = Auction::new(config(1));
        auction.start().unwrap();
        auction.bid(UserId(1), Price(10_00)).unwrap(); // drops at price 11
        auction.bid(UserId(2), Price(12_00)).unwrap();

        // Round 1: clock at 10_00, both qualify (two bidders, one seat) -> advance.
        assert!(!auction.advance_round().unwrap());
        assert_eq!(auction.current_price(), Price(11_00));

        // Round 2: clock at 11_00, bidder 1 (max 10_00) drops out.
        let completed = auction.advance_round().unwrap();
        assert!(completed);
        assert_eq!(auction.winners(), &[UserId(2)]);
    }

    #[test]
    fn everyone_dropping_out_still_completes() {
        let mut auction = Auction::new(config(1));
        auction.start().unwrap();
        auction.bid(UserId(1), Price(5_00)).unwrap();

        let completed = auction.advance_round().unwrap();
        assert!(completed);
        assert!(auction.winners().is_empty());
    }

    #[test]
    fn double_start_is_rejected() {
        let mut auction = Auction::new(config(1));
        auction.start().unwrap();
        assert!(auction.start().is_err());
    }

    #[test]
    fn bidding_after_completion_is_rejected() {
        let mut auction = Auction::new(config(1));
        auction.start().unwrap();
        auction.bid(UserId(1), Price(10_00)).unwrap();
        auction.advance_round().unwrap();

        assert!(auction.bid(UserId(2), Price(50_00)).is_err());
    }
}
