//! Plays one seeded match between bots.

use crate::config::SimConfig;
use serde::Serialize;
use siedler_core::{
    Bot, ConfigError, Faction, GameError, GameEvent, GamePhase, GameState, ResourceHand,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid game configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{faction} has no move in phase {phase:?}")]
    Stuck { faction: Faction, phase: GamePhase },

    #[error("Move by {faction} was rejected: {source}")]
    Rejected {
        faction: Faction,
        #[source]
        source: GameError,
    },
}

/// Outcome of a match, printed as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub winner: Option<Faction>,
    pub turns: u32,
    pub actions: u64,
    pub points: Vec<(Faction, u32)>,
    /// Occupied corners as "marker@(x, y)"
    pub buildings: Vec<String>,
    pub bank: ResourceHand,
}

/// Run a match to a winner or the turn cap
pub fn run_match(config: &SimConfig) -> Result<MatchSummary, RunnerError> {
    let mut game = GameState::new(config.game_config())?;
    let mut bots: Vec<Bot> = game
        .players
        .iter()
        .map(|p| {
            let seed = config.seed.wrapping_add(p.faction.index() as u64 + 1);
            Bot::with_seed(p.faction, config.bot, seed)
        })
        .collect();

    let mut actions = 0u64;
    while !game.is_finished() && game.turn_number <= config.max_turns {
        let faction = next_actor(&game);
        let action = bots[faction.index()]
            .choose_action(&game)
            .ok_or_else(|| RunnerError::Stuck {
                faction,
                phase: game.phase.clone(),
            })?;

        let events = game
            .apply_action(faction, action)
            .map_err(|source| RunnerError::Rejected { faction, source })?;
        actions += 1;

        for event in &events {
            log_event(event);
        }
    }

    if !game.is_finished() {
        warn!(turns = config.max_turns, "turn cap reached without a winner");
    }

    Ok(summarize(&game, config.seed, actions))
}

/// Who has to move: a pending discarder, otherwise the current player
fn next_actor(game: &GameState) -> Faction {
    match &game.phase {
        GamePhase::DiscardRequired { players_remaining } => players_remaining
            .first()
            .copied()
            .unwrap_or(game.current_player),
        _ => game.current_player,
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::SetupCompleted => info!("setup completed"),
        GameEvent::GameWon { player, points } => info!(%player, points, "game won"),
        GameEvent::PayoutWithheld { resource, owed, available } => {
            warn!(?resource, owed, available, "payout withheld")
        }
        other => debug!(?other, "event"),
    }
}

fn summarize(game: &GameState, seed: u64, actions: u64) -> MatchSummary {
    let buildings = game
        .board
        .corners()
        .filter_map(|(at, building)| building.marker().map(|m| format!("{m}@{at}")))
        .collect();

    MatchSummary {
        seed,
        winner: match game.phase {
            GamePhase::Finished { winner } => Some(winner),
            _ => None,
        },
        turns: game.turn_number,
        actions,
        points: game.players.iter().map(|p| (p.faction, p.points())).collect(),
        buildings,
        bank: game.bank.supply().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use siedler_core::{BotDifficulty, DiscardMode};

    fn quick(seed: u64) -> SimConfig {
        SimConfig {
            players: 2,
            win_points: 4,
            seed,
            max_turns: 2000,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_match_finds_a_winner() {
        let summary = run_match(&quick(3)).unwrap();

        let winner = summary.winner.unwrap();
        let (_, points) = summary
            .points
            .iter()
            .find(|(f, _)| *f == winner)
            .copied()
            .unwrap();
        assert!(points >= 4);
        assert!(summary.buildings.len() >= 4);
    }

    #[test]
    fn test_same_seed_same_match() {
        assert_eq!(run_match(&quick(11)).unwrap(), run_match(&quick(11)).unwrap());
    }

    #[test]
    fn test_player_choice_discards_are_answered() {
        let config = SimConfig {
            discard_mode: DiscardMode::PlayerChoice,
            bot: BotDifficulty::Easy,
            max_turns: 60,
            ..quick(5)
        };
        let summary = run_match(&config).unwrap();
        assert!(summary.turns >= 1);
    }

    #[test]
    fn test_turn_cap_stops_match() {
        let config = SimConfig {
            max_turns: 1,
            win_points: 10,
            ..quick(2)
        };
        let summary = run_match(&config).unwrap();
        assert_eq!(summary.winner, None);
        assert_eq!(summary.turns, 2);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let config = SimConfig {
            players: 7,
            ..SimConfig::default()
        };
        assert!(matches!(
            run_match(&config),
            Err(RunnerError::Config(ConfigError::InvalidPlayerCount(7)))
        ));
    }
}
