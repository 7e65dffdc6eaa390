//! Game configuration: rule tables, board layout, and discard policy.
//!
//! Nothing in here is global. A `GameConfig` is built once, validated, and
//! handed to [`GameState::new`](crate::game::GameState::new), which owns it
//! for the rest of the game.

use crate::board::Land;
use crate::hex::Coord;
use crate::player::{costs, ResourceHand, StructureKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Cards of each resource the bank starts with
pub const BANK_SUPPLY_PER_RESOURCE: u32 = 19;

/// Points needed to win a standard game
pub const DEFAULT_WIN_POINTS: u32 = 10;

/// Lowest accepted win threshold
pub const MIN_WIN_POINTS: u32 = 3;

/// Largest corner column a board may use
pub const MAX_BOARD_X: i32 = 14;

/// Largest corner row a board may use
pub const MAX_BOARD_Y: i32 = 22;

/// Hand size at which a player must discard when a 7 is rolled
pub const DEFAULT_DISCARD_THRESHOLD: u32 = 7;

/// Errors raised while validating a configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Player count must be between 2 and 4, got {0}")]
    InvalidPlayerCount(u8),

    #[error("Win points must be at least 3, got {0}")]
    WinPointsTooLow(u32),

    #[error("{0} is not a field coordinate")]
    NotAFieldCoordinate(Coord),

    #[error("Field {0} has corners outside the board bounds")]
    FieldOutOfBounds(Coord),

    #[error("Field {0} appears more than once in the layout")]
    DuplicateField(Coord),

    #[error("Field {0} has invalid dice number {1}")]
    InvalidDiceNumber(Coord, u8),

    #[error("Thief must start on a land field, {0} is not one")]
    ThiefNotOnLand(Coord),
}

/// How cards are chosen when a 7 forces players to discard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscardMode {
    /// The engine removes cards at random
    #[default]
    Random,
    /// Each affected player submits a `DiscardCards` action
    PlayerChoice,
}

/// Fixed rule tables for a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub road_cost: ResourceHand,
    pub settlement_cost: ResourceHand,
    pub city_cost: ResourceHand,
    pub road_limit: u32,
    pub settlement_limit: u32,
    pub city_limit: u32,
    /// Starting bank stock
    pub bank_supply: ResourceHand,
    pub win_points: u32,
    pub discard_threshold: u32,
}

impl Rules {
    /// The standard rule set
    pub fn standard() -> Self {
        let n = BANK_SUPPLY_PER_RESOURCE;
        Self {
            road_cost: costs::road(),
            settlement_cost: costs::settlement(),
            city_cost: costs::city(),
            road_limit: 15,
            settlement_limit: 5,
            city_limit: 4,
            bank_supply: ResourceHand::with_amounts(n, n, n, n, n),
            win_points: DEFAULT_WIN_POINTS,
            discard_threshold: DEFAULT_DISCARD_THRESHOLD,
        }
    }

    /// Cost of building one piece of the given kind
    pub fn cost(&self, kind: StructureKind) -> &ResourceHand {
        match kind {
            StructureKind::Road => &self.road_cost,
            StructureKind::Settlement => &self.settlement_cost,
            StructureKind::City => &self.city_cost,
        }
    }

    /// How many pieces of a kind one faction may have on the board
    pub fn limit(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Road => self.road_limit,
            StructureKind::Settlement => self.settlement_limit,
            StructureKind::City => self.city_limit,
        }
    }

    /// Whether `count` pieces already exhaust the stock for `kind`
    pub fn is_limit_reached(&self, kind: StructureKind, count: u32) -> bool {
        count >= self.limit(kind)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}

/// One field of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub coord: Coord,
    pub land: Land,
    /// Dice value that triggers production (2-12, never 7)
    pub dice: Option<u8>,
}

/// The fields of a board and where the thief starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub fields: Vec<FieldSpec>,
    pub thief: Coord,
}

#[rustfmt::skip]
const STANDARD_FIELDS: [(i32, i32, Land, Option<u8>); 37] = [
    (4, 2, Land::Water, None), (6, 2, Land::Water, None), (8, 2, Land::Water, None), (10, 2, Land::Water, None),
    (3, 5, Land::Water, None), (5, 5, Land::Forest, Some(6)), (7, 5, Land::Pasture, Some(3)),
    (9, 5, Land::Pasture, Some(8)), (11, 5, Land::Water, None),
    (2, 8, Land::Water, None), (4, 8, Land::Farmland, Some(2)), (6, 8, Land::Mountain, Some(4)),
    (8, 8, Land::Farmland, Some(5)), (10, 8, Land::Forest, Some(10)), (12, 8, Land::Water, None),
    (1, 11, Land::Water, None), (3, 11, Land::Forest, Some(5)), (5, 11, Land::Hill, Some(9)),
    (7, 11, Land::Desert, None), (9, 11, Land::Mountain, Some(6)), (11, 11, Land::Farmland, Some(9)),
    (13, 11, Land::Water, None),
    (2, 14, Land::Water, None), (4, 14, Land::Farmland, Some(10)), (6, 14, Land::Mountain, Some(11)),
    (8, 14, Land::Forest, Some(3)), (10, 14, Land::Pasture, Some(12)), (12, 14, Land::Water, None),
    (3, 17, Land::Water, None), (5, 17, Land::Pasture, Some(8)), (7, 17, Land::Hill, Some(4)),
    (9, 17, Land::Hill, Some(11)), (11, 17, Land::Water, None),
    (4, 20, Land::Water, None), (6, 20, Land::Water, None), (8, 20, Land::Water, None), (10, 20, Land::Water, None),
];

impl BoardLayout {
    /// The fixed 37-field board: 19 land fields ringed by water, thief on the desert
    pub fn standard() -> Self {
        Self {
            fields: STANDARD_FIELDS
                .iter()
                .map(|&(x, y, land, dice)| FieldSpec {
                    coord: Coord::new(x, y),
                    land,
                    dice,
                })
                .collect(),
            thief: Coord::new(7, 11),
        }
    }

    /// Check that every field sits on the lattice inside the board bounds and
    /// the thief starts on land
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_within_bounds(field.coord) {
                return Err(ConfigError::FieldOutOfBounds(field.coord));
            }
            if !field.coord.is_field_center() {
                return Err(ConfigError::NotAFieldCoordinate(field.coord));
            }
            if !seen.insert(field.coord) {
                return Err(ConfigError::DuplicateField(field.coord));
            }
            if let Some(dice) = field.dice {
                if !(2..=12).contains(&dice) || dice == 7 {
                    return Err(ConfigError::InvalidDiceNumber(field.coord, dice));
                }
            }
        }

        let thief_on_land = self
            .fields
            .iter()
            .any(|f| f.coord == self.thief && f.land != Land::Water);
        if !thief_on_land {
            return Err(ConfigError::ThiefNotOnLand(self.thief));
        }

        Ok(())
    }
}

/// Every corner of the field lies in `0..=MAX_BOARD_X` x `0..=MAX_BOARD_Y`
fn is_within_bounds(field: Coord) -> bool {
    field.field_corners().is_some_and(|corners| {
        corners
            .iter()
            .all(|c| (0..=MAX_BOARD_X).contains(&c.x) && (0..=MAX_BOARD_Y).contains(&c.y))
    })
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Everything needed to start a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub player_count: u8,
    pub rules: Rules,
    pub layout: BoardLayout,
    pub discard_mode: DiscardMode,
    /// Seed for dice, discards and steals; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Standard rules and board for the given number of players
    pub fn new(player_count: u8) -> Self {
        Self {
            player_count,
            rules: Rules::standard(),
            layout: BoardLayout::standard(),
            discard_mode: DiscardMode::default(),
            seed: None,
        }
    }

    pub fn with_win_points(mut self, win_points: u32) -> Self {
        self.rules.win_points = win_points;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_discard_mode(mut self, mode: DiscardMode) -> Self {
        self.discard_mode = mode;
        self
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=4).contains(&self.player_count) {
            return Err(ConfigError::InvalidPlayerCount(self.player_count));
        }
        if self.rules.win_points < MIN_WIN_POINTS {
            return Err(ConfigError::WinPointsTooLow(self.rules.win_points));
        }
        self.layout.validate()
    }
}
