//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions.

use crate::board::Resource;
use crate::hex::{Coord, EdgeCoord};
use crate::player::{Faction, ResourceHand};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Setup Phase ====================
    /// Place initial settlement during setup
    PlaceInitialSettlement(Coord),
    /// Place initial road during setup (must start at the settlement just placed)
    PlaceInitialRoad(Coord, Coord),

    // ==================== Turn Actions ====================
    /// Roll the dice (must be done at start of turn)
    RollDice,

    // ==================== Thief Actions ====================
    /// Discard cards after a 7 when holding too many
    DiscardCards(ResourceHand),
    /// Move the thief to a field (after rolling 7)
    PlaceThief(Coord),
    /// Choose a player to steal from (after moving the thief)
    StealFrom(Faction),

    // ==================== Building Actions (Main Phase) ====================
    /// Build a road between two corners
    BuildRoad(Coord, Coord),
    /// Build a settlement at a corner
    BuildSettlement(Coord),
    /// Upgrade a settlement to a city
    BuildCity(Coord),

    // ==================== Trading ====================
    /// Trade four cards of `offer` with the bank for one `want`
    TradeWithBank { offer: Resource, want: Resource },

    // ==================== Turn Management ====================
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: Faction,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were paid out, from setup or a dice roll
    ResourcesDistributed {
        distributions: Vec<(Faction, Resource, u32)>,
    },

    /// The bank could not cover everyone owed a resource, so nobody got it
    PayoutWithheld {
        resource: Resource,
        owed: u32,
        available: u32,
    },

    /// A settlement was built
    SettlementBuilt { player: Faction, location: Coord },

    /// A settlement was upgraded to a city
    CityBuilt { player: Faction, location: Coord },

    /// A road was built
    RoadBuilt { player: Faction, location: EdgeCoord },

    /// Player had to discard cards
    CardsDiscarded {
        player: Faction,
        cards: ResourceHand,
    },

    /// The thief was moved
    ThiefMoved {
        player: Faction,
        from: Coord,
        to: Coord,
    },

    /// A resource was stolen (None when the victim had no cards)
    ResourceStolen {
        thief: Faction,
        victim: Faction,
        resource: Option<Resource>,
    },

    /// Four-to-one trade with the bank completed
    BankTradeCompleted {
        player: Faction,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },

    /// All initial placements are done
    SetupCompleted,

    /// Turn ended
    TurnEnded { player: Faction, next_player: Faction },

    /// A player won the game
    GameWon { player: Faction, points: u32 },
}
