//! Placement rules for settlements, cities, roads and the thief.
//!
//! Every check here only reads the board. `Ok(())` means the placement is
//! legal; `Err` carries the reason it is not.

use crate::board::{Board, CornerBuilding};
use crate::game::GameError;
use crate::hex::Coord;
use crate::player::Faction;

/// Can `faction` put a settlement on `at`?
///
/// During setup no connecting road is required.
pub fn can_place_settlement(
    board: &Board,
    at: Coord,
    faction: Faction,
    initial: bool,
) -> Result<(), GameError> {
    let building = board.get_corner(at).ok_or(GameError::InvalidCoordinate)?;

    if board.is_water_corner(at) {
        return Err(GameError::WaterPlacement);
    }
    if !building.is_empty() {
        return Err(GameError::OccupiedSpot);
    }

    // Distance rule: no building on a neighbouring corner
    let crowded = board
        .neighbours_of_corner(at)
        .into_iter()
        .any(|n| board.get_corner(n).is_some_and(|b| !b.is_empty()));
    if crowded {
        return Err(GameError::AdjacencyViolation);
    }

    if !initial && !board.has_road_at(at, faction) {
        return Err(GameError::AdjacencyViolation);
    }

    Ok(())
}

/// Can `faction` upgrade the building on `at` to a city?
pub fn can_place_city(board: &Board, at: Coord, faction: Faction) -> Result<(), GameError> {
    match board.get_corner(at).ok_or(GameError::InvalidCoordinate)? {
        CornerBuilding::Settlement(owner) if owner == faction => Ok(()),
        CornerBuilding::Settlement(_) => Err(GameError::NotOwner),
        CornerBuilding::City(_) => Err(GameError::OccupiedSpot),
        CornerBuilding::Empty => Err(GameError::NoSettlementToUpgrade),
    }
}

/// Can `faction` build a road between `from` and `to`?
///
/// In setup the road must start at a settlement of `faction` that has no road
/// of its own yet. Afterwards it must touch a building or a road of `faction`.
pub fn can_place_road(
    board: &Board,
    from: Coord,
    to: Coord,
    faction: Faction,
    initial: bool,
) -> Result<(), GameError> {
    let road = board.get_edge(from, to).ok_or(GameError::InvalidCoordinate)?;

    if board.is_water_corner(from) || board.is_water_corner(to) {
        return Err(GameError::WaterPlacement);
    }
    if road.owner().is_some() {
        return Err(GameError::OccupiedSpot);
    }

    let owns_building = |corner: Coord| {
        board
            .get_corner(corner)
            .is_some_and(|b| b.owner() == Some(faction))
    };

    let connected = if initial {
        [from, to]
            .into_iter()
            .any(|end| owns_building(end) && !board.has_road_at(end, faction))
    } else {
        [from, to]
            .into_iter()
            .any(|end| owns_building(end) || board.has_road_at(end, faction))
    };

    if connected {
        Ok(())
    } else {
        Err(GameError::AdjacencyViolation)
    }
}

/// Can the thief be moved onto `field`?
pub fn can_place_thief(board: &Board, field: Coord) -> Result<(), GameError> {
    let field = board.field_at(field).ok_or(GameError::InvalidCoordinate)?;
    if field.is_water() {
        return Err(GameError::WaterPlacement);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::EdgeBuilding;
    use pretty_assertions::assert_eq;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn settle(board: &mut Board, at: Coord, faction: Faction) {
        board.set_corner(at, CornerBuilding::Settlement(faction)).unwrap();
    }

    fn road(board: &mut Board, from: Coord, to: Coord, faction: Faction) {
        board.set_edge(from, to, EdgeBuilding::Road(faction)).unwrap();
    }

    #[test]
    fn test_settlement_coordinates() {
        let board = Board::standard();
        assert_eq!(
            can_place_settlement(&board, c(6, 7), Faction::Red, true),
            Err(GameError::InvalidCoordinate)
        );
        assert_eq!(
            can_place_settlement(&board, c(3, 1), Faction::Red, true),
            Err(GameError::WaterPlacement)
        );
        assert_eq!(can_place_settlement(&board, c(11, 9), Faction::Red, true), Ok(()));
        assert_eq!(can_place_settlement(&board, c(5, 7), Faction::Red, true), Ok(()));
    }

    #[test]
    fn test_settlement_distance_rule() {
        let mut board = Board::standard();
        settle(&mut board, c(7, 3), Faction::Red);

        assert_eq!(
            can_place_settlement(&board, c(7, 3), Faction::Blue, true),
            Err(GameError::OccupiedSpot)
        );
        assert_eq!(
            can_place_settlement(&board, c(6, 4), Faction::Blue, true),
            Err(GameError::AdjacencyViolation)
        );
        assert_eq!(can_place_settlement(&board, c(6, 6), Faction::Blue, true), Ok(()));
    }

    #[test]
    fn test_settlement_needs_own_road_after_setup() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);
        road(&mut board, c(5, 7), c(6, 6), Faction::Red);

        // (6,6) neighbours the settlement, so go one further
        assert_eq!(
            can_place_settlement(&board, c(7, 7), Faction::Red, false),
            Err(GameError::AdjacencyViolation)
        );
        road(&mut board, c(6, 6), c(7, 7), Faction::Red);
        assert_eq!(can_place_settlement(&board, c(7, 7), Faction::Red, false), Ok(()));
        assert_eq!(
            can_place_settlement(&board, c(7, 7), Faction::Blue, false),
            Err(GameError::AdjacencyViolation)
        );
        // The distance rule still applies next to the own settlement
        assert_eq!(
            can_place_settlement(&board, c(6, 6), Faction::Red, false),
            Err(GameError::AdjacencyViolation)
        );
    }

    #[test]
    fn test_city_rules() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);

        assert_eq!(can_place_city(&board, c(5, 7), Faction::Red), Ok(()));
        assert_eq!(can_place_city(&board, c(5, 7), Faction::Blue), Err(GameError::NotOwner));
        assert_eq!(
            can_place_city(&board, c(11, 9), Faction::Red),
            Err(GameError::NoSettlementToUpgrade)
        );
        assert_eq!(
            can_place_city(&board, c(6, 7), Faction::Red),
            Err(GameError::InvalidCoordinate)
        );

        board.set_corner(c(5, 7), CornerBuilding::City(Faction::Red)).unwrap();
        assert_eq!(can_place_city(&board, c(5, 7), Faction::Red), Err(GameError::OccupiedSpot));
    }

    #[test]
    fn test_road_coordinates() {
        let mut board = Board::standard();
        settle(&mut board, c(7, 3), Faction::Red);

        assert_eq!(
            can_place_road(&board, c(1, 13), c(3, 13), Faction::Red, false),
            Err(GameError::InvalidCoordinate)
        );
        assert_eq!(
            can_place_road(&board, c(7, 3), c(7, 1), Faction::Red, false),
            Err(GameError::WaterPlacement)
        );
        assert_eq!(can_place_road(&board, c(7, 3), c(6, 4), Faction::Red, false), Ok(()));
    }

    #[test]
    fn test_initial_road_must_touch_unroaded_settlement() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);

        assert_eq!(can_place_road(&board, c(5, 7), c(6, 6), Faction::Red, true), Ok(()));
        assert_eq!(
            can_place_road(&board, c(6, 6), c(7, 7), Faction::Red, true),
            Err(GameError::AdjacencyViolation)
        );

        road(&mut board, c(5, 7), c(6, 6), Faction::Red);
        // The settlement already has its road
        assert_eq!(
            can_place_road(&board, c(5, 7), c(4, 6), Faction::Red, true),
            Err(GameError::AdjacencyViolation)
        );
        assert_eq!(
            can_place_road(&board, c(5, 7), c(6, 6), Faction::Red, true),
            Err(GameError::OccupiedSpot)
        );
    }

    #[test]
    fn test_road_extends_network() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);
        road(&mut board, c(5, 7), c(6, 6), Faction::Red);

        assert_eq!(can_place_road(&board, c(6, 6), c(7, 7), Faction::Red, false), Ok(()));
        assert_eq!(can_place_road(&board, c(5, 7), c(4, 6), Faction::Red, false), Ok(()));
        assert_eq!(
            can_place_road(&board, c(6, 6), c(7, 7), Faction::Blue, false),
            Err(GameError::AdjacencyViolation)
        );
        assert_eq!(
            can_place_road(&board, c(8, 6), c(8, 4), Faction::Red, false),
            Err(GameError::AdjacencyViolation)
        );
    }

    #[test]
    fn test_road_continues_through_enemy_settlement() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);
        road(&mut board, c(5, 7), c(6, 6), Faction::Red);
        settle(&mut board, c(7, 7), Faction::Blue);

        assert_eq!(can_place_road(&board, c(6, 6), c(7, 7), Faction::Red, false), Ok(()));
        road(&mut board, c(6, 6), c(7, 7), Faction::Red);
        assert_eq!(can_place_road(&board, c(7, 7), c(8, 6), Faction::Red, false), Ok(()));
    }

    #[test]
    fn test_thief_placement() {
        let board = Board::standard();
        assert_eq!(can_place_thief(&board, c(6, 4)), Err(GameError::InvalidCoordinate));
        assert_eq!(can_place_thief(&board, c(3, 5)), Err(GameError::WaterPlacement));
        assert_eq!(can_place_thief(&board, c(5, 11)), Ok(()));
        assert_eq!(can_place_thief(&board, c(7, 11)), Ok(()));
    }

    #[test]
    fn test_validation_has_no_side_effects() {
        let mut board = Board::standard();
        settle(&mut board, c(5, 7), Faction::Red);

        let before: Vec<_> = board.corners().collect();
        for _ in 0..3 {
            let _ = can_place_settlement(&board, c(11, 9), Faction::Red, false);
            let _ = can_place_city(&board, c(5, 7), Faction::Red);
            let _ = can_place_road(&board, c(5, 7), c(6, 6), Faction::Red, true);
            let _ = can_place_thief(&board, c(5, 11));
        }
        let after: Vec<_> = board.corners().collect();
        assert_eq!(before, after);
        assert_eq!(board.get_edge(c(5, 7), c(6, 6)), Some(EdgeBuilding::Empty));
    }
}
