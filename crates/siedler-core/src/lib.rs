//! Siedler - a board and game-state engine for a hex-based settlement game
//!
//! This crate provides the core game logic, including:
//! - A shifted integer coordinate system for fields, corners and edges
//! - Board representation with adjacency queries and production
//! - Player state, the bank, and resource management
//! - Placement validation and a game state machine with full rule enforcement
//!
//! # Architecture
//!
//! The engine has no I/O. Callers build a [`GameConfig`], create a
//! [`GameState`] from it, and drive the game with [`GameAction`]s; every
//! accepted action returns the [`GameEvent`]s it produced.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for fields, corners and edges
//! - [`config`]: Rule tables, board layout and game configuration
//! - [`board`]: Game board representation
//! - [`player`]: Player state and resources
//! - [`bank`]: The finite card supply
//! - [`validate`]: Placement rules
//! - [`game`]: Game state machine
//! - [`bot`]: Automated players

pub mod actions;
pub mod bank;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod hex;
pub mod player;
pub mod validate;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use bank::Bank;
pub use board::{Board, CornerBuilding, EdgeBuilding, Field, Land, Resource};
pub use bot::{bot_discard, Bot, BotDifficulty};
pub use config::{BoardLayout, ConfigError, DiscardMode, GameConfig, Rules};
pub use game::{GameError, GamePhase, GameSnapshot, GameState, SetupPlacing};
pub use hex::{Coord, EdgeCoord};
pub use player::{Faction, Player, ResourceHand, StructureKind};
