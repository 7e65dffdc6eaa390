//! Game board representation: fields, corners, and edges.
//!
//! This module contains:
//! - Resource and land types
//! - Building markers for corners (settlements, cities) and edges (roads)
//! - The board graph with its adjacency queries
//!
//! The topology is fixed at construction. Every corner and edge gets a stable
//! index into an arena, and adjacency is stored as index lists, so nothing
//! after construction ever needs to walk coordinates again.

use crate::config::{BoardLayout, ConfigError};
use crate::game::GameError;
use crate::hex::{Coord, EdgeCoord};
use crate::player::{Faction, ResourceHand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Resource card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

/// Terrain of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Land {
    Forest,
    Hill,
    Pasture,
    Mountain,
    Farmland,
    Desert,
    Water,
}

impl Land {
    /// The resource this land produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Land::Forest => Some(Resource::Lumber),
            Land::Hill => Some(Resource::Brick),
            Land::Pasture => Some(Resource::Wool),
            Land::Mountain => Some(Resource::Ore),
            Land::Farmland => Some(Resource::Grain),
            Land::Desert | Land::Water => None,
        }
    }
}

/// A single field on the board. Never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub coord: Coord,
    pub land: Land,
    /// Dice value that triggers production (None for desert and water)
    pub dice: Option<u8>,
}

impl Field {
    /// Get the resource this field produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.land.resource()
    }

    pub fn is_water(&self) -> bool {
        self.land == Land::Water
    }
}

/// What's built on a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CornerBuilding {
    /// Nothing built
    #[default]
    Empty,
    /// Settlement (1 point, 1 card per adjacent field)
    Settlement(Faction),
    /// City (2 points, 2 cards per adjacent field)
    City(Faction),
}

impl CornerBuilding {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<Faction> {
        match self {
            CornerBuilding::Empty => None,
            CornerBuilding::Settlement(f) | CornerBuilding::City(f) => Some(*f),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CornerBuilding::Empty)
    }

    /// Board marker: faction marker, upper case for a city
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            CornerBuilding::Empty => None,
            CornerBuilding::Settlement(f) => Some(f.marker()),
            CornerBuilding::City(f) => Some(f.city_marker()),
        }
    }

    /// Cards produced per triggered adjacent field
    pub fn yield_per_field(&self) -> u32 {
        match self {
            CornerBuilding::Empty => 0,
            CornerBuilding::Settlement(_) => 1,
            CornerBuilding::City(_) => 2,
        }
    }
}

/// What's built on an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EdgeBuilding {
    /// Nothing built
    #[default]
    Empty,
    Road(Faction),
}

impl EdgeBuilding {
    /// Get the owner of this road, if any
    pub fn owner(&self) -> Option<Faction> {
        match self {
            EdgeBuilding::Empty => None,
            EdgeBuilding::Road(f) => Some(*f),
        }
    }
}

#[derive(Debug, Clone)]
struct CornerNode {
    coord: Coord,
    fields: Vec<usize>,
    edges: Vec<usize>,
    neighbours: Vec<usize>,
    building: CornerBuilding,
}

#[derive(Debug, Clone)]
struct EdgeNode {
    coord: EdgeCoord,
    road: EdgeBuilding,
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    fields: Vec<Field>,
    /// Corner indices of each field, clockwise from the top
    field_corners: Vec<[usize; 6]>,
    corners: Vec<CornerNode>,
    edges: Vec<EdgeNode>,
    field_index: HashMap<Coord, usize>,
    corner_index: HashMap<Coord, usize>,
    edge_index: HashMap<EdgeCoord, usize>,
    thief: Coord,
}

impl Board {
    /// Build a board from a layout, validating it first
    pub fn new(layout: &BoardLayout) -> Result<Self, ConfigError> {
        layout.validate()?;
        Self::build(layout)
    }

    fn build(layout: &BoardLayout) -> Result<Self, ConfigError> {
        let mut fields = Vec::with_capacity(layout.fields.len());
        let mut field_index = HashMap::new();
        for spec in &layout.fields {
            field_index.insert(spec.coord, fields.len());
            fields.push(Field {
                coord: spec.coord,
                land: spec.land,
                dice: spec.dice,
            });
        }

        let mut corners: Vec<CornerNode> = Vec::new();
        let mut corner_index: HashMap<Coord, usize> = HashMap::new();
        let mut edges: Vec<EdgeNode> = Vec::new();
        let mut edge_index: HashMap<EdgeCoord, usize> = HashMap::new();
        let mut field_corners = Vec::with_capacity(fields.len());

        for (field_id, field) in fields.iter().enumerate() {
            let coords = field
                .coord
                .field_corners()
                .ok_or(ConfigError::FieldOutOfBounds(field.coord))?;
            let ids = coords.map(|coord| {
                *corner_index.entry(coord).or_insert_with(|| {
                    corners.push(CornerNode {
                        coord,
                        fields: Vec::new(),
                        edges: Vec::new(),
                        neighbours: Vec::new(),
                        building: CornerBuilding::Empty,
                    });
                    corners.len() - 1
                })
            });

            for &corner_id in &ids {
                corners[corner_id].fields.push(field_id);
            }

            for i in 0..6 {
                let (a, b) = (ids[i], ids[(i + 1) % 6]);
                let coord = EdgeCoord::new(corners[a].coord, corners[b].coord);
                if edge_index.contains_key(&coord) {
                    continue;
                }
                edge_index.insert(coord, edges.len());
                corners[a].edges.push(edges.len());
                corners[b].edges.push(edges.len());
                corners[a].neighbours.push(b);
                corners[b].neighbours.push(a);
                edges.push(EdgeNode {
                    coord,
                    road: EdgeBuilding::Empty,
                });
            }

            field_corners.push(ids);
        }

        Ok(Self {
            fields,
            field_corners,
            corners,
            edges,
            field_index,
            corner_index,
            edge_index,
            thief: layout.thief,
        })
    }

    // ==================== Fields ====================

    /// All fields in layout order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn field_at(&self, coord: Coord) -> Option<&Field> {
        self.field_index.get(&coord).map(|&i| &self.fields[i])
    }

    /// Fields whose dice value is `value`
    pub fn fields_for_dice(&self, value: u8) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.dice == Some(value)).collect()
    }

    /// Corners of a field, clockwise from the top. Empty if `field` is not a field.
    pub fn corners_of_field(&self, field: Coord) -> Vec<Coord> {
        match self.field_index.get(&field) {
            Some(&i) => self.field_corners[i]
                .iter()
                .map(|&c| self.corners[c].coord)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Factions with a settlement or city on a corner of `field`, in play order
    pub fn factions_at_field(&self, field: Coord) -> Vec<Faction> {
        let mut factions: Vec<Faction> = self
            .corners_of_field(field)
            .into_iter()
            .filter_map(|c| self.get_corner(c).and_then(|b| b.owner()))
            .collect();
        factions.sort();
        factions.dedup();
        factions
    }

    // ==================== Corners ====================

    pub fn has_corner(&self, coord: Coord) -> bool {
        self.corner_index.contains_key(&coord)
    }

    /// Every corner with its current building
    pub fn corners(&self) -> impl Iterator<Item = (Coord, CornerBuilding)> + '_ {
        self.corners.iter().map(|c| (c.coord, c.building))
    }

    /// Fields touching a corner (one to three)
    pub fn fields_of_corner(&self, corner: Coord) -> Vec<&Field> {
        match self.corner_index.get(&corner) {
            Some(&i) => self.corners[i]
                .fields
                .iter()
                .map(|&f| &self.fields[f])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Corners one road length away
    pub fn neighbours_of_corner(&self, corner: Coord) -> Vec<Coord> {
        match self.corner_index.get(&corner) {
            Some(&i) => self.corners[i]
                .neighbours
                .iter()
                .map(|&n| self.corners[n].coord)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Road markers on the edges meeting at a corner, empty ones included
    pub fn edges_of_corner(&self, corner: Coord) -> Vec<EdgeBuilding> {
        match self.corner_index.get(&corner) {
            Some(&i) => self.corners[i]
                .edges
                .iter()
                .map(|&e| self.edges[e].road)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether `faction` has a road ending at this corner
    pub fn has_road_at(&self, corner: Coord, faction: Faction) -> bool {
        self.edges_of_corner(corner)
            .iter()
            .any(|road| road.owner() == Some(faction))
    }

    /// Whether every field around this corner is water
    pub fn is_water_corner(&self, corner: Coord) -> bool {
        self.fields_of_corner(corner).iter().all(|f| f.is_water())
    }

    pub fn get_corner(&self, coord: Coord) -> Option<CornerBuilding> {
        self.corner_index
            .get(&coord)
            .map(|&i| self.corners[i].building)
    }

    /// Place or upgrade a building.
    ///
    /// Only empty → settlement and settlement → city of the same faction are
    /// accepted; a building is never removed or handed to another faction.
    pub fn set_corner(&mut self, coord: Coord, building: CornerBuilding) -> Result<(), GameError> {
        let &i = self
            .corner_index
            .get(&coord)
            .ok_or(GameError::InvalidCoordinate)?;
        let current = self.corners[i].building;

        let allowed = match (current, building) {
            (CornerBuilding::Empty, CornerBuilding::Settlement(_)) => true,
            (CornerBuilding::Settlement(owner), CornerBuilding::City(upgrader)) => {
                owner == upgrader
            }
            _ => false,
        };
        if !allowed {
            return Err(GameError::OccupiedSpot);
        }

        self.corners[i].building = building;
        Ok(())
    }

    // ==================== Edges ====================

    pub fn has_edge(&self, from: Coord, to: Coord) -> bool {
        self.edge_index.contains_key(&EdgeCoord::new(from, to))
    }

    /// Every edge with its current road marker
    pub fn edges(&self) -> impl Iterator<Item = (EdgeCoord, EdgeBuilding)> + '_ {
        self.edges.iter().map(|e| (e.coord, e.road))
    }

    pub fn get_edge(&self, from: Coord, to: Coord) -> Option<EdgeBuilding> {
        self.edge_index
            .get(&EdgeCoord::new(from, to))
            .map(|&i| self.edges[i].road)
    }

    /// Place a road. Pairs that are not adjacent corners are rejected, and a
    /// road once placed is permanent.
    pub fn set_edge(&mut self, from: Coord, to: Coord, road: EdgeBuilding) -> Result<(), GameError> {
        let coord = EdgeCoord::new(from, to);
        if !coord.is_geometric() {
            return Err(GameError::InvalidCoordinate);
        }
        let &i = self
            .edge_index
            .get(&coord)
            .ok_or(GameError::InvalidCoordinate)?;

        match (self.edges[i].road, road) {
            (EdgeBuilding::Empty, EdgeBuilding::Empty) => Ok(()),
            (EdgeBuilding::Empty, new_road) => {
                self.edges[i].road = new_road;
                Ok(())
            }
            _ => Err(GameError::OccupiedSpot),
        }
    }

    // ==================== Thief ====================

    pub fn thief_position(&self) -> Coord {
        self.thief
    }

    pub fn set_thief_position(&mut self, field: Coord) -> Result<(), GameError> {
        if !self.field_index.contains_key(&field) {
            return Err(GameError::InvalidCoordinate);
        }
        self.thief = field;
        Ok(())
    }

    // ==================== Production ====================

    /// Cards owed to each faction when `value` is rolled.
    ///
    /// The field under the thief produces nothing. Settlements earn one card
    /// per triggered field and cities two. Factions owed nothing are absent.
    pub fn production_for_dice(&self, value: u8) -> BTreeMap<Faction, ResourceHand> {
        let mut owed: BTreeMap<Faction, ResourceHand> = BTreeMap::new();

        for (field_id, field) in self.fields.iter().enumerate() {
            if field.dice != Some(value) || field.coord == self.thief {
                continue;
            }
            let Some(resource) = field.resource() else {
                continue;
            };

            for &corner_id in &self.field_corners[field_id] {
                let building = self.corners[corner_id].building;
                if let Some(owner) = building.owner() {
                    owed.entry(owner)
                        .or_default()
                        .add(resource, building.yield_per_field());
                }
            }
        }

        owed
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// The standard 37-field board
    pub(crate) fn standard() -> Self {
        Self::new(&BoardLayout::standard()).expect("standard layout is valid")
    }
}
