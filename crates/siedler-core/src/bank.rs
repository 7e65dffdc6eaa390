//! The bank: the finite supply of resource cards.
//!
//! Every card in the game is either in the bank or in a player's hand. The
//! bank never goes negative; when it runs dry the request is skipped or
//! refused instead.

use crate::board::{Field, Resource};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cards a player hands in for a four-to-one trade
pub const TRADE_OFFER_AMOUNT: u32 = 4;

/// Cards a player receives from a four-to-one trade
pub const TRADE_WANT_AMOUNT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    stock: ResourceHand,
}

impl Bank {
    /// A bank holding the given starting supply
    pub fn new(supply: ResourceHand) -> Self {
        Self { stock: supply }
    }

    /// Cards of one resource still in the bank
    pub fn stock(&self, resource: Resource) -> u32 {
        self.stock.get(resource)
    }

    /// The bank's whole current supply
    pub fn supply(&self) -> &ResourceHand {
        &self.stock
    }

    /// Return cards to the bank (building costs, discards, trade-ins)
    pub fn deposit(&mut self, cards: &ResourceHand) {
        self.stock.add_hand(cards);
    }

    /// Take `amount` cards of one resource, or nothing if the bank is short
    pub fn withdraw(&mut self, resource: Resource, amount: u32) -> bool {
        self.stock.try_remove(resource, amount)
    }

    /// Hand out one card per producing field, for a second setup settlement.
    ///
    /// Desert and water produce nothing. A resource the bank has run out of is
    /// skipped rather than taken below zero.
    pub fn distribute_initial(&mut self, lands: &[&Field]) -> ResourceHand {
        let mut handed_out = ResourceHand::new();
        for resource in lands.iter().filter_map(|field| field.resource()) {
            if self.withdraw(resource, 1) {
                handed_out.add(resource, 1);
            } else {
                warn!(?resource, "bank is out of stock, initial card skipped");
            }
        }
        handed_out
    }

    /// Take four `offer` cards in exchange for one `want` card.
    ///
    /// Fails without change when the bank holds no `want`. The caller is
    /// responsible for taking the four cards out of the player's hand.
    pub fn trade_four_to_one(&mut self, offer: Resource, want: Resource) -> bool {
        if !self.withdraw(want, TRADE_WANT_AMOUNT) {
            return false;
        }
        self.stock.add(offer, TRADE_OFFER_AMOUNT);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Land;
    use crate::hex::Coord;
    use pretty_assertions::assert_eq;

    fn full_bank() -> Bank {
        Bank::new(ResourceHand::with_amounts(19, 19, 19, 19, 19))
    }

    fn field(land: Land) -> Field {
        Field {
            coord: Coord::new(0, 0),
            land,
            dice: None,
        }
    }

    #[test]
    fn test_new_bank_holds_supply() {
        let bank = full_bank();
        for resource in Resource::ALL {
            assert_eq!(bank.stock(resource), 19);
        }
    }

    #[test]
    fn test_distribute_initial_skips_desert_and_water() {
        let mut bank = full_bank();
        let forest = field(Land::Forest);
        let desert = field(Land::Desert);
        let water = field(Land::Water);

        let cards = bank.distribute_initial(&[&forest, &desert, &water]);
        assert_eq!(cards, ResourceHand::single(Resource::Lumber, 1));
        assert_eq!(bank.stock(Resource::Lumber), 18);
        assert_eq!(bank.supply().total(), 94);
    }

    #[test]
    fn test_distribute_initial_clamps_at_zero() {
        let mut bank = Bank::new(ResourceHand::with_amounts(0, 1, 0, 0, 0));
        let hill = field(Land::Hill);
        let forest = field(Land::Forest);

        let cards = bank.distribute_initial(&[&hill, &forest, &forest]);
        assert_eq!(cards, ResourceHand::single(Resource::Lumber, 1));
        assert_eq!(bank.stock(Resource::Brick), 0);
        assert_eq!(bank.stock(Resource::Lumber), 0);
    }

    #[test]
    fn test_trade_four_to_one() {
        let mut bank = full_bank();
        assert!(bank.trade_four_to_one(Resource::Wool, Resource::Ore));
        assert_eq!(bank.stock(Resource::Wool), 23);
        assert_eq!(bank.stock(Resource::Ore), 18);
    }

    #[test]
    fn test_trade_fails_when_bank_empty() {
        let mut bank = Bank::new(ResourceHand::with_amounts(5, 5, 0, 5, 5));
        assert!(!bank.trade_four_to_one(Resource::Wool, Resource::Ore));
        assert_eq!(bank.supply(), &ResourceHand::with_amounts(5, 5, 0, 5, 5));
    }

    #[test]
    fn test_withdraw_and_deposit() {
        let mut bank = Bank::new(ResourceHand::with_amounts(1, 0, 0, 0, 0));
        assert!(!bank.withdraw(Resource::Brick, 2));
        assert!(bank.withdraw(Resource::Brick, 1));
        assert_eq!(bank.stock(Resource::Brick), 0);

        bank.deposit(&ResourceHand::with_amounts(1, 1, 0, 0, 0));
        assert_eq!(bank.supply(), &ResourceHand::with_amounts(1, 1, 0, 0, 0));
    }
}
