//! Player state and resource management.
//!
//! This module contains:
//! - Faction identities and their board markers
//! - ResourceHand for managing resource counts
//! - Building costs and structure kinds
//! - Player struct with hand, piece counts and points

use crate::board::Resource;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player's fixed identity for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Faction {
    /// All factions in play order
    pub const ALL: [Faction; 4] = [Faction::Red, Faction::Blue, Faction::Green, Faction::Yellow];

    /// Faction for a seat index
    pub fn for_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Seat index in play order
    pub fn index(&self) -> usize {
        match self {
            Faction::Red => 0,
            Faction::Blue => 1,
            Faction::Green => 2,
            Faction::Yellow => 3,
        }
    }

    /// Two-letter board marker for a settlement ("rr", "bb", ...)
    pub fn marker(&self) -> &'static str {
        match self {
            Faction::Red => "rr",
            Faction::Blue => "bb",
            Faction::Green => "gg",
            Faction::Yellow => "yy",
        }
    }

    /// Two-letter board marker for a city ("RR", "BB", ...)
    pub fn city_marker(&self) -> &'static str {
        match self {
            Faction::Red => "RR",
            Faction::Blue => "BB",
            Faction::Green => "GG",
            Faction::Yellow => "YY",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Brick => self.brick = count,
            Resource::Lumber => self.lumber = count,
            Resource::Ore => self.ore = count,
            Resource::Grain => self.grain = count,
            Resource::Wool => self.wool = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|&r| self.get(r) >= cost.get(r))
    }

    /// Remove `amount` of one resource, returning false (and changing nothing)
    /// if there are not enough
    pub fn try_remove(&mut self, resource: Resource, amount: u32) -> bool {
        let have = self.get(resource);
        if have < amount {
            return false;
        }
        self.set(resource, have - amount);
        true
    }

    /// Try to subtract, returning false if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for resource in Resource::ALL {
            self.set(resource, self.get(resource) - cost.get(resource));
        }
        true
    }

    /// Remove a random card, each card equally likely
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let resource = *self.to_cards().choose(rng)?;
        self.try_remove(resource, 1).then_some(resource)
    }

    /// Remove up to `count` random cards and return them
    pub fn take_random<R: Rng>(&mut self, count: u32, rng: &mut R) -> ResourceHand {
        let mut taken = ResourceHand::new();
        for _ in 0..count {
            match self.steal_random(rng) {
                Some(resource) => taken.add(resource, 1),
                None => break,
            }
        }
        taken
    }

    /// Resources present, one entry per card
    pub fn to_cards(&self) -> Vec<Resource> {
        Resource::ALL
            .iter()
            .flat_map(|&r| std::iter::repeat(r).take(self.get(r) as usize))
            .collect()
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }
}

/// The kinds of piece a player can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    Road,
    Settlement,
    City,
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub faction: Faction,
    /// Current resources
    pub resources: ResourceHand,
    settlements: u32,
    cities: u32,
    roads: u32,
    points: u32,
}

impl Player {
    /// Create a new player with an empty hand and nothing built
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            resources: ResourceHand::new(),
            settlements: 0,
            cities: 0,
            roads: 0,
            points: 0,
        }
    }

    /// Pay a building cost. On failure the hand is untouched.
    pub fn pay_cost(&mut self, cost: &ResourceHand) -> bool {
        self.resources.try_subtract(cost)
    }

    pub fn add_resources(&mut self, resource: Resource, amount: u32) {
        self.resources.add(resource, amount);
    }

    /// Remove cards of one type; fails without change if the hand is short
    pub fn remove_resources(&mut self, resource: Resource, amount: u32) -> bool {
        self.resources.try_remove(resource, amount)
    }

    /// Number of cards in hand
    pub fn card_count(&self) -> u32 {
        self.resources.total()
    }

    /// Pieces of a kind currently on the board
    pub fn structure_count(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Road => self.roads,
            StructureKind::Settlement => self.settlements,
            StructureKind::City => self.cities,
        }
    }

    pub fn road_count(&self) -> u32 {
        self.roads
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn add_points(&mut self, points: u32) {
        self.points += points;
    }

    /// Record a newly placed piece
    pub fn add_structure(&mut self, kind: StructureKind) {
        match kind {
            StructureKind::Road => self.roads += 1,
            StructureKind::Settlement => self.settlements += 1,
            StructureKind::City => self.cities += 1,
        }
    }

    /// Take a piece off the count (a settlement replaced by a city).
    /// Returns false and changes nothing if the count is already zero.
    pub fn remove_structure(&mut self, kind: StructureKind) -> bool {
        let count = match kind {
            StructureKind::Road => &mut self.roads,
            StructureKind::Settlement => &mut self.settlements,
            StructureKind::City => &mut self.cities,
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}
