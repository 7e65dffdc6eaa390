//! Simulator settings.
use siedler_core::{BotDifficulty, DiscardMode, GameConfig};
use std::env;

/// Settings for one simulated match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub players: u8,
    pub win_points: u32,
    pub seed: u64,
    pub discard_mode: DiscardMode,
    /// Stop after this many turns even without a winner
    pub max_turns: u32,
    pub bot: BotDifficulty,
}

impl SimConfig {
    /// Construct simulator configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SIEDLER_PLAYERS` - Number of players, 2 to 4 (default: 3)
    /// - `SIEDLER_WIN_POINTS` - Points needed to win (default: 10)
    /// - `SIEDLER_SEED` - Seed for dice and bots (default: 0)
    /// - `SIEDLER_DISCARD` - `random` or `choice` (default: random)
    /// - `SIEDLER_MAX_TURNS` - Turn cap (default: 1000)
    /// - `SIEDLER_BOT` - `easy` or `medium` (default: medium)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(players) = read_env::<u8>("SIEDLER_PLAYERS") {
            config.players = players;
        }
        if let Some(points) = read_env::<u32>("SIEDLER_WIN_POINTS") {
            config.win_points = points;
        }
        if let Some(seed) = read_env::<u64>("SIEDLER_SEED") {
            config.seed = seed;
        }
        if let Some(mode) = read_env::<String>("SIEDLER_DISCARD").and_then(|s| parse_discard_mode(&s)) {
            config.discard_mode = mode;
        }
        if let Some(turns) = read_env::<u32>("SIEDLER_MAX_TURNS") {
            config.max_turns = turns.max(1);
        }
        if let Some(bot) = read_env::<String>("SIEDLER_BOT").and_then(|s| parse_bot(&s)) {
            config.bot = bot;
        }

        config
    }

    /// Engine configuration for this match. Validation happens when the game
    /// is created.
    pub fn game_config(&self) -> GameConfig {
        GameConfig::new(self.players)
            .with_win_points(self.win_points)
            .with_seed(self.seed)
            .with_discard_mode(self.discard_mode)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            players: 3,
            win_points: siedler_core::config::DEFAULT_WIN_POINTS,
            seed: 0,
            discard_mode: DiscardMode::Random,
            max_turns: 1000,
            bot: BotDifficulty::Medium,
        }
    }
}

fn parse_discard_mode(value: &str) -> Option<DiscardMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "random" => Some(DiscardMode::Random),
        "choice" | "player" => Some(DiscardMode::PlayerChoice),
        _ => None,
    }
}

fn parse_bot(value: &str) -> Option<BotDifficulty> {
    match value.trim().to_ascii_lowercase().as_str() {
        "easy" => Some(BotDifficulty::Easy),
        "medium" => Some(BotDifficulty::Medium),
        _ => None,
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_discard_mode() {
        assert_eq!(parse_discard_mode("random"), Some(DiscardMode::Random));
        assert_eq!(parse_discard_mode(" Choice "), Some(DiscardMode::PlayerChoice));
        assert_eq!(parse_discard_mode("never"), None);
    }

    #[test]
    fn test_parse_bot() {
        assert_eq!(parse_bot("EASY"), Some(BotDifficulty::Easy));
        assert_eq!(parse_bot("medium"), Some(BotDifficulty::Medium));
        assert_eq!(parse_bot("hard"), None);
    }

    #[test]
    fn test_game_config_carries_settings() {
        let sim = SimConfig {
            players: 4,
            win_points: 6,
            seed: 99,
            discard_mode: DiscardMode::PlayerChoice,
            ..SimConfig::default()
        };
        let config = sim.game_config();

        assert_eq!(config.player_count, 4);
        assert_eq!(config.rules.win_points, 6);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.discard_mode, DiscardMode::PlayerChoice);
        assert_eq!(config.validate(), Ok(()));
    }
}
