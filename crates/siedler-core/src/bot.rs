//! Automated players.
//!
//! Two difficulty levels:
//! - Easy: Random valid moves
//! - Medium: Basic heuristics (best-yield spots, cities first, trade toward
//!   a missing cost, expand roads toward free corners)

use crate::actions::GameAction;
use crate::board::Resource;
use crate::game::GameState;
use crate::hex::Coord;
use crate::player::{Faction, ResourceHand, StructureKind};
use crate::validate;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// A bot player that can decide on actions
pub struct Bot {
    pub faction: Faction,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(faction: Faction, difficulty: BotDifficulty) -> Self {
        Self {
            faction,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(faction: Faction, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            faction,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose an action from the valid actions
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        let valid_actions = game.valid_actions(self.faction);
        if valid_actions.is_empty() {
            return None;
        }

        // The discard placeholder needs real cards in every difficulty
        if valid_actions
            .iter()
            .any(|a| matches!(a, GameAction::DiscardCards(_)))
        {
            return Some(GameAction::DiscardCards(bot_discard(game, self.faction)));
        }

        match self.difficulty {
            BotDifficulty::Easy => self.choose_easy(&valid_actions),
            BotDifficulty::Medium => self.choose_medium(game, &valid_actions),
        }
    }

    /// Easy: Just pick a random valid action
    fn choose_easy(&mut self, actions: &[GameAction]) -> Option<GameAction> {
        actions.choose(&mut self.rng).cloned()
    }

    /// Medium: Use basic heuristics
    fn choose_medium(&mut self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        if actions.contains(&GameAction::RollDice) {
            return Some(GameAction::RollDice);
        }

        // Setup
        let settlement_spots = filter(actions, |a| matches!(a, GameAction::PlaceInitialSettlement(_)));
        if !settlement_spots.is_empty() {
            return self.rank_settlement_spots(game, &settlement_spots).cloned();
        }

        let road_spots = filter(actions, |a| matches!(a, GameAction::PlaceInitialRoad(..)));
        if !road_spots.is_empty() {
            return self.rank_road_spots(game, &road_spots).cloned();
        }

        // Thief
        let thief_spots = filter(actions, |a| matches!(a, GameAction::PlaceThief(_)));
        if !thief_spots.is_empty() {
            return self.rank_thief_spots(game, &thief_spots).cloned();
        }

        let steal_actions = filter(actions, |a| matches!(a, GameAction::StealFrom(_)));
        if !steal_actions.is_empty() {
            return self.choose_steal_target(game, &steal_actions);
        }

        // Cities are the cheapest point per card
        let city_actions = filter(actions, |a| matches!(a, GameAction::BuildCity(_)));
        if !city_actions.is_empty() {
            return self.rank_settlement_spots(game, &city_actions).cloned();
        }

        let build_settlement_actions = filter(actions, |a| matches!(a, GameAction::BuildSettlement(_)));
        if !build_settlement_actions.is_empty() {
            return self.rank_settlement_spots(game, &build_settlement_actions).cloned();
        }

        if let Some(trade) = self.choose_trade(game, actions) {
            return Some(trade);
        }

        // Roads when they open up a new spot, otherwise only now and then
        let road_build_actions = filter(actions, |a| matches!(a, GameAction::BuildRoad(..)));
        if !road_build_actions.is_empty() {
            let best = self.best_road(game, &road_build_actions);
            if let Some((action, score)) = best {
                if score > 0 || self.rng.gen_bool(0.3) {
                    return Some(action.clone());
                }
            }
        }

        if actions.contains(&GameAction::EndTurn) {
            return Some(GameAction::EndTurn);
        }

        actions.choose(&mut self.rng).cloned()
    }

    /// Rank settlement and city spots by field value, picking among the top 3
    fn rank_settlement_spots<'a>(
        &mut self,
        game: &GameState,
        actions: &[&'a GameAction],
    ) -> Option<&'a GameAction> {
        let mut scored: Vec<_> = actions
            .iter()
            .map(|action| {
                let score = match action {
                    GameAction::PlaceInitialSettlement(at)
                    | GameAction::BuildSettlement(at)
                    | GameAction::BuildCity(at) => self.score_corner(game, *at),
                    _ => 0,
                };
                (*action, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let top = scored.iter().take(3).collect::<Vec<_>>();
        top.choose(&mut self.rng).map(|(a, _)| *a)
    }

    /// Score a corner by the dice odds and variety of the fields around it
    fn score_corner(&self, game: &GameState, corner: Coord) -> i32 {
        let fields = game.board.fields_of_corner(corner);
        let mut score: i32 = fields.iter().filter_map(|f| f.dice).map(dice_weight).sum();

        let mut resources: Vec<Resource> = fields.iter().filter_map(|f| f.resource()).collect();
        resources.sort();
        resources.dedup();
        score += resources.len() as i32;

        score
    }

    fn rank_road_spots<'a>(
        &mut self,
        game: &GameState,
        actions: &[&'a GameAction],
    ) -> Option<&'a GameAction> {
        self.best_road(game, actions).map(|(action, _)| action)
    }

    /// Best road by the free settlement spots it reaches; ties broken at random
    fn best_road<'a>(
        &mut self,
        game: &GameState,
        actions: &[&'a GameAction],
    ) -> Option<(&'a GameAction, i32)> {
        let mut scored: Vec<_> = actions
            .iter()
            .map(|action| {
                let score = match action {
                    GameAction::PlaceInitialRoad(from, to) | GameAction::BuildRoad(from, to) => {
                        self.score_road(game, *from, *to)
                    }
                    _ => 0,
                };
                (*action, score)
            })
            .collect();

        scored.shuffle(&mut self.rng);
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.first().copied()
    }

    fn score_road(&self, game: &GameState, from: Coord, to: Coord) -> i32 {
        [from, to]
            .into_iter()
            .filter(|&end| validate::can_place_settlement(&game.board, end, self.faction, true).is_ok())
            .map(|end| self.score_corner(game, end))
            .sum()
    }

    /// Put the thief where it hurts opponents most and never on ourselves
    fn rank_thief_spots<'a>(
        &mut self,
        game: &GameState,
        actions: &[&'a GameAction],
    ) -> Option<&'a GameAction> {
        let mut scored: Vec<_> = actions
            .iter()
            .map(|action| {
                let score = match action {
                    GameAction::PlaceThief(field) => self.score_thief_spot(game, *field),
                    _ => 0,
                };
                (*action, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.first().map(|(a, _)| *a)
    }

    fn score_thief_spot(&self, game: &GameState, field: Coord) -> i32 {
        let Some(target) = game.board.field_at(field) else {
            return -100;
        };

        let mut score = target.dice.map(dice_weight).unwrap_or(0) * 2;

        for faction in game.board.factions_at_field(field) {
            if faction == self.faction {
                score -= 20;
            } else {
                score += 5;
            }
        }

        score
    }

    /// Steal from the opponent holding the most cards
    fn choose_steal_target(&mut self, game: &GameState, actions: &[&GameAction]) -> Option<GameAction> {
        actions
            .iter()
            .filter_map(|action| match action {
                GameAction::StealFrom(victim) => game
                    .get_player(*victim)
                    .map(|p| (*victim, p.card_count())),
                _ => None,
            })
            .max_by_key(|(_, cards)| *cards)
            .map(|(victim, _)| GameAction::StealFrom(victim))
    }

    /// Trade a surplus toward the first resource missing for a city or settlement
    fn choose_trade(&self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        let player = game.get_player(self.faction)?;
        let hand = &player.resources;

        for kind in [StructureKind::City, StructureKind::Settlement] {
            if game.is_building_limit_reached(self.faction, kind) {
                continue;
            }
            let cost = game.rules().cost(kind);
            let missing = Resource::ALL
                .into_iter()
                .find(|&r| hand.get(r) < cost.get(r));
            let Some(want) = missing else {
                continue;
            };

            // Only give away cards the target cost doesn't need
            let trade = actions.iter().find(|a| match a {
                GameAction::TradeWithBank { offer, want: w } => {
                    *w == want && hand.get(*offer) >= cost.get(*offer) + 4
                }
                _ => false,
            });
            if let Some(trade) = trade {
                return Some(trade.clone());
            }
        }

        None
    }
}

fn filter(actions: &[GameAction], pred: impl Fn(&GameAction) -> bool) -> Vec<&GameAction> {
    actions.iter().filter(|a| pred(a)).collect()
}

/// Relative chance of a dice number coming up (pips)
fn dice_weight(dice: u8) -> i32 {
    match dice {
        6 | 8 => 5,
        5 | 9 => 4,
        4 | 10 => 3,
        3 | 11 => 2,
        2 | 12 => 1,
        _ => 0,
    }
}

/// Pick the cards a bot gives up after a 7.
///
/// Empty when the hand is under the discard threshold; otherwise half the
/// hand, always from whatever resource it holds most of.
pub fn bot_discard(game: &GameState, faction: Faction) -> ResourceHand {
    let Some(player) = game.get_player(faction) else {
        return ResourceHand::new();
    };

    let total = player.card_count();
    if total < game.rules().discard_threshold {
        return ResourceHand::new();
    }

    let mut discard = ResourceHand::new();
    let mut remaining = player.resources.clone();

    for _ in 0..total / 2 {
        let most = Resource::ALL
            .into_iter()
            .max_by_key(|&r| remaining.get(r))
            .filter(|&r| remaining.get(r) > 0);
        let Some(resource) = most else {
            break;
        };
        remaining.try_remove(resource, 1);
        discard.add(resource, 1);
    }

    discard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiscardMode, GameConfig};
    use crate::game::GamePhase;
    use pretty_assertions::assert_eq;

    fn seeded(players: u8) -> GameState {
        GameState::new(GameConfig::new(players).with_seed(5)).unwrap()
    }

    fn complete_setup(game: &mut GameState, bots: &mut [Bot]) {
        while matches!(game.phase, GamePhase::Setup { .. }) {
            let faction = game.current_player;
            let action = bots[faction.index()].choose_action(game).unwrap();
            game.apply_action(faction, action).unwrap();
        }
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(Faction::Red, BotDifficulty::Easy);
        assert_eq!(bot.faction, Faction::Red);
        assert_eq!(bot.difficulty, BotDifficulty::Easy);
    }

    #[test]
    fn test_easy_bot_chooses_action() {
        let game = seeded(2);
        let mut bot = Bot::with_seed(game.current_player, BotDifficulty::Easy, 1);

        let action = bot.choose_action(&game);
        assert!(matches!(action, Some(GameAction::PlaceInitialSettlement(_))));

        let mut idle = Bot::with_seed(Faction::Blue, BotDifficulty::Easy, 1);
        assert_eq!(idle.choose_action(&game), None);
    }

    #[test]
    fn test_bots_complete_setup() {
        let mut game = seeded(3);
        let mut bots: Vec<Bot> = (0..3)
            .map(|i| Bot::with_seed(Faction::ALL[i], BotDifficulty::Medium, i as u64))
            .collect();

        complete_setup(&mut game, &mut bots);

        assert_eq!(game.phase, GamePhase::PreRoll);
        for player in &game.players {
            assert_eq!(player.structure_count(StructureKind::Settlement), 2);
            assert_eq!(player.road_count(), 2);
            assert_eq!(player.points(), 2);
        }
    }

    #[test]
    fn test_medium_bot_prioritizes_roll() {
        let mut game = seeded(2);
        let mut bots = [
            Bot::with_seed(Faction::Red, BotDifficulty::Medium, 1),
            Bot::with_seed(Faction::Blue, BotDifficulty::Medium, 2),
        ];
        complete_setup(&mut game, &mut bots);

        let action = bots[0].choose_action(&game);
        assert_eq!(action, Some(GameAction::RollDice));
    }

    #[test]
    fn test_medium_bot_avoids_own_fields_with_thief() {
        let mut game = seeded(2);
        game.place_initial_settlement(Coord::new(5, 7), false).unwrap();
        game.phase = GamePhase::ThiefPlacementRequired;

        let mut bot = Bot::with_seed(Faction::Red, BotDifficulty::Medium, 3);
        let Some(GameAction::PlaceThief(field)) = bot.choose_action(&game) else {
            panic!("expected a thief placement");
        };
        assert!(!game.board.factions_at_field(field).contains(&Faction::Red));
    }

    #[test]
    fn test_medium_bot_trades_toward_city() {
        let mut game = seeded(2);
        game.place_initial_settlement(Coord::new(5, 7), false).unwrap();
        game.phase = GamePhase::MainPhase;
        game.players[0].resources = ResourceHand::with_amounts(0, 0, 3, 1, 5);

        let mut bot = Bot::with_seed(Faction::Red, BotDifficulty::Medium, 4);
        assert_eq!(
            bot.choose_action(&game),
            Some(GameAction::TradeWithBank {
                offer: Resource::Wool,
                want: Resource::Grain
            })
        );
    }

    #[test]
    fn test_discard_logic() {
        let mut game = seeded(2);
        assert_eq!(bot_discard(&game, Faction::Red).total(), 0);

        game.players[0].resources = ResourceHand::with_amounts(5, 1, 1, 1, 1);
        let discard = bot_discard(&game, Faction::Red);
        assert_eq!(discard, ResourceHand::with_amounts(4, 0, 0, 0, 0));

        // Below the threshold nothing goes
        game.players[1].resources = ResourceHand::with_amounts(2, 2, 2, 0, 0);
        assert!(bot_discard(&game, Faction::Blue).is_empty());
    }

    #[test]
    fn test_bot_answers_discard_request() {
        let config = GameConfig::new(2)
            .with_seed(9)
            .with_discard_mode(DiscardMode::PlayerChoice);
        let mut game = GameState::new(config).unwrap();
        game.phase = GamePhase::PreRoll;
        game.players[1].resources = ResourceHand::with_amounts(3, 3, 3, 0, 0);
        game.throw_dice(Faction::Red, 7).unwrap();

        let mut bot = Bot::with_seed(Faction::Blue, BotDifficulty::Easy, 2);
        let action = bot.choose_action(&game).unwrap();
        game.apply_action(Faction::Blue, action).unwrap();

        assert_eq!(game.players[1].card_count(), 5);
        assert_eq!(game.phase, GamePhase::ThiefPlacementRequired);
    }
}
