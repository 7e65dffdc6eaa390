//! Core game state machine.
//!
//! `GameState` owns the board, the bank and the players. It works on two
//! levels:
//! - primitive operations (`build_road`, `place_thief`, `pay_out_dice`, ...)
//!   that act for the current player without looking at the phase
//! - `apply_action`, which checks turn and phase, calls the primitives and
//!   moves the game to its next phase
//!
//! Every failing call returns an error and leaves the state untouched.

use crate::actions::{GameAction, GameEvent};
use crate::bank::{Bank, TRADE_OFFER_AMOUNT};
use crate::board::{Board, CornerBuilding, EdgeBuilding, Resource};
use crate::config::{ConfigError, DiscardMode, GameConfig, Rules};
use crate::hex::{Coord, EdgeCoord};
use crate::player::{Faction, Player, ResourceHand, StructureKind};
use crate::validate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial placement phase
    Setup {
        /// Which round of setup (1 or 2)
        round: u8,
        /// What we're currently placing
        placing: SetupPlacing,
    },

    /// Before rolling dice at start of turn
    PreRoll,

    /// Players must discard half their cards (rolled 7, player-choice mode)
    DiscardRequired {
        /// Players who still need to discard
        players_remaining: Vec<Faction>,
    },

    /// After rolling 7, the current player must move the thief
    ThiefPlacementRequired,

    /// After moving the thief, choose a player to steal from
    ThiefSteal {
        /// Where the thief was moved to
        field: Coord,
        /// Players that can be stolen from
        victims: Vec<Faction>,
    },

    /// Main phase - can build, trade, end turn
    MainPhase,

    /// Game is over
    Finished { winner: Faction },
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not a corner, edge or field of this board")]
    InvalidCoordinate,

    #[error("That spot is already occupied")]
    OccupiedSpot,

    #[error("Cannot place that in the water")]
    WaterPlacement,

    #[error("Not connected, or too close to another building")]
    AdjacencyViolation,

    #[error("Cannot afford this")]
    InsufficientResources,

    #[error("No pieces of that kind remaining")]
    StructureLimitReached,

    #[error("The bank has none of that resource left")]
    BankOutOfResource,

    #[error("Victim has no cards to steal")]
    NoCardsToSteal,

    #[error("No settlement there to upgrade")]
    NoSettlementToUpgrade,

    #[error("That building belongs to another player")]
    NotOwner,

    #[error("Cannot steal from that player")]
    InvalidVictim,

    #[error("Dice total {0} is out of range")]
    InvalidDiceValue(u8),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid discard")]
    InvalidDiscard,

    #[error("Invalid trade")]
    InvalidTrade,

    #[error("Game is over")]
    GameOver,
}

impl GameError {
    /// Stable reason code for presentation layers
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidCoordinate => "INVALID_COORDINATE",
            GameError::OccupiedSpot => "OCCUPIED_SPOT",
            GameError::WaterPlacement => "WATER_PLACEMENT",
            GameError::AdjacencyViolation => "ADJACENCY_VIOLATION",
            GameError::InsufficientResources => "INSUFFICIENT_RESOURCES",
            GameError::StructureLimitReached => "STRUCTURE_LIMIT_REACHED",
            GameError::BankOutOfResource => "BANK_OUT_OF_RESOURCE",
            GameError::NoCardsToSteal => "NO_CARDS_TO_STEAL",
            GameError::NoSettlementToUpgrade => "NO_SETTLEMENT_TO_UPGRADE",
            GameError::NotOwner => "NOT_OWNER",
            GameError::InvalidVictim => "INVALID_VICTIM",
            GameError::InvalidDiceValue(_) => "INVALID_DICE_VALUE",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::InvalidPhase => "INVALID_PHASE",
            GameError::InvalidDiscard => "INVALID_DISCARD",
            GameError::InvalidTrade => "INVALID_TRADE",
            GameError::GameOver => "GAME_OVER",
        }
    }
}

/// Serializable view of a game for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub current_player: Faction,
    pub turn_number: u32,
    pub players: Vec<Player>,
    pub bank: ResourceHand,
    pub thief: Coord,
    pub buildings: Vec<(Coord, CornerBuilding)>,
    pub roads: Vec<(EdgeCoord, Faction)>,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// The game board
    pub board: Board,
    /// Resource cards not in anyone's hand
    pub bank: Bank,
    /// All players, indexed by faction
    pub players: Vec<Player>,
    /// Whose turn it is
    pub current_player: Faction,
    /// Current game phase
    pub phase: GamePhase,
    /// Turn number (0 during setup, starts at 1)
    pub turn_number: u32,
    /// Last dice roll
    pub dice_roll: Option<(u8, u8)>,
    rules: Rules,
    discard_mode: DiscardMode,
    /// Settlement-and-road pairs placed so far during setup
    setup_placements: usize,
    rng: StdRng,
}

impl GameState {
    /// Create a new game from a validated configuration
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let board = Board::new(&config.layout)?;
        let players = Faction::ALL
            .iter()
            .take(config.player_count as usize)
            .map(|&faction| Player::new(faction))
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            board,
            bank: Bank::new(config.rules.bank_supply.clone()),
            players,
            current_player: Faction::Red,
            phase: GamePhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement,
            },
            turn_number: 0,
            dice_roll: None,
            rules: config.rules,
            discard_mode: config.discard_mode,
            setup_placements: 0,
            rng,
        })
    }

    /// Standard board and rules with a given win threshold
    pub fn standard(player_count: u8, win_points: u32) -> Result<Self, ConfigError> {
        Self::new(GameConfig::new(player_count).with_win_points(win_points))
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by faction
    pub fn get_player(&self, faction: Faction) -> Option<&Player> {
        self.players.get(faction.index())
    }

    fn get_player_mut(&mut self, faction: Faction) -> Option<&mut Player> {
        self.players.get_mut(faction.index())
    }

    /// The player whose turn it is
    pub fn current(&self) -> &Player {
        &self.players[self.current_player.index()]
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn discard_mode(&self) -> DiscardMode {
        self.discard_mode
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// First player in play order who has reached the win threshold
    pub fn winner(&self) -> Option<Faction> {
        self.players
            .iter()
            .find(|p| p.points() >= self.rules.win_points)
            .map(|p| p.faction)
    }

    /// Whether `faction` has used up its stock of `kind`
    pub fn is_building_limit_reached(&self, faction: Faction, kind: StructureKind) -> bool {
        self.get_player(faction)
            .map_or(true, |p| self.rules.is_limit_reached(kind, p.structure_count(kind)))
    }

    // ==================== Turn Order ====================

    /// Pass the turn to the next faction in play order
    pub fn switch_to_next_player(&mut self) {
        let next = (self.current_player.index() + 1) % self.player_count();
        if let Some(faction) = Faction::for_index(next) {
            self.current_player = faction;
        }
    }

    /// Pass the turn back to the previous faction in play order
    pub fn switch_to_previous_player(&mut self) {
        let count = self.player_count();
        let previous = (self.current_player.index() + count - 1) % count;
        if let Some(faction) = Faction::for_index(previous) {
            self.current_player = faction;
        }
    }

    // ==================== Setup Placement ====================

    /// Place a free settlement for the current player.
    ///
    /// With `payout` the player receives one card per producing field around
    /// the corner, taken from the bank.
    pub fn place_initial_settlement(
        &mut self,
        at: Coord,
        payout: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.current_player;
        validate::can_place_settlement(&self.board, at, faction, true)?;
        self.ensure_stock(faction, StructureKind::Settlement)?;

        self.board.set_corner(at, CornerBuilding::Settlement(faction))?;
        let player = &mut self.players[faction.index()];
        player.add_structure(StructureKind::Settlement);
        player.add_points(1);

        let mut events = vec![GameEvent::SettlementBuilt {
            player: faction,
            location: at,
        }];

        if payout {
            let lands = self.board.fields_of_corner(at);
            let cards = self.bank.distribute_initial(&lands);
            self.players[faction.index()].resources.add_hand(&cards);
            if !cards.is_empty() {
                events.push(GameEvent::ResourcesDistributed {
                    distributions: distribution_of(faction, &cards),
                });
            }
        }

        events.extend(self.check_win_condition());
        Ok(events)
    }

    /// Place a free road next to the current player's newest settlement
    pub fn place_initial_road(&mut self, from: Coord, to: Coord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.current_player;
        validate::can_place_road(&self.board, from, to, faction, true)?;
        self.ensure_stock(faction, StructureKind::Road)?;

        self.board.set_edge(from, to, EdgeBuilding::Road(faction))?;
        self.players[faction.index()].add_structure(StructureKind::Road);

        Ok(vec![GameEvent::RoadBuilt {
            player: faction,
            location: EdgeCoord::new(from, to),
        }])
    }

    // ==================== Building ====================

    /// Build a settlement for the current player, paying its cost to the bank
    pub fn build_settlement(&mut self, at: Coord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.current_player;
        validate::can_place_settlement(&self.board, at, faction, false)?;
        self.ensure_stock(faction, StructureKind::Settlement)?;
        self.ensure_affordable(faction, StructureKind::Settlement)?;

        self.board.set_corner(at, CornerBuilding::Settlement(faction))?;
        self.charge(faction, StructureKind::Settlement)?;
        let player = &mut self.players[faction.index()];
        player.add_structure(StructureKind::Settlement);
        player.add_points(1);

        let mut events = vec![GameEvent::SettlementBuilt {
            player: faction,
            location: at,
        }];
        events.extend(self.check_win_condition());
        Ok(events)
    }

    /// Upgrade one of the current player's settlements to a city
    pub fn build_city(&mut self, at: Coord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.current_player;
        validate::can_place_city(&self.board, at, faction)?;
        self.ensure_stock(faction, StructureKind::City)?;
        self.ensure_affordable(faction, StructureKind::City)?;

        self.board.set_corner(at, CornerBuilding::City(faction))?;
        self.charge(faction, StructureKind::City)?;
        let player = &mut self.players[faction.index()];
        if !player.remove_structure(StructureKind::Settlement) {
            warn!(%faction, %at, "city built without a counted settlement");
        }
        player.add_structure(StructureKind::City);
        player.add_points(1);

        let mut events = vec![GameEvent::CityBuilt {
            player: faction,
            location: at,
        }];
        events.extend(self.check_win_condition());
        Ok(events)
    }

    /// Build a road for the current player
    pub fn build_road(&mut self, from: Coord, to: Coord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.current_player;
        validate::can_place_road(&self.board, from, to, faction, false)?;
        self.ensure_stock(faction, StructureKind::Road)?;
        self.ensure_affordable(faction, StructureKind::Road)?;

        self.board.set_edge(from, to, EdgeBuilding::Road(faction))?;
        self.charge(faction, StructureKind::Road)?;
        self.players[faction.index()].add_structure(StructureKind::Road);

        Ok(vec![GameEvent::RoadBuilt {
            player: faction,
            location: EdgeCoord::new(from, to),
        }])
    }

    // ==================== Trading ====================

    /// Trade four `offer` cards with the bank for one `want`
    pub fn trade_with_bank(&mut self, offer: Resource, want: Resource) -> Result<Vec<GameEvent>, GameError> {
        if offer == want {
            return Err(GameError::InvalidTrade);
        }

        let faction = self.current_player;
        let player = &mut self.players[faction.index()];
        player
            .remove_resources(offer, TRADE_OFFER_AMOUNT)
            .then_some(())
            .ok_or(GameError::InsufficientResources)?;

        if !self.bank.trade_four_to_one(offer, want) {
            // Hand the offer back untouched
            self.players[faction.index()].add_resources(offer, TRADE_OFFER_AMOUNT);
            return Err(GameError::BankOutOfResource);
        }
        self.players[faction.index()].add_resources(want, 1);

        Ok(vec![GameEvent::BankTradeCompleted {
            player: faction,
            gave: offer,
            gave_count: TRADE_OFFER_AMOUNT,
            received: want,
        }])
    }

    // ==================== Dice and Thief ====================

    /// Pay every settlement and city around the fields triggered by `total`.
    ///
    /// If the bank cannot cover the total owed of a resource, nobody gets
    /// that resource this roll.
    pub fn pay_out_dice(&mut self, total: u8) -> Vec<GameEvent> {
        let owed = self.board.production_for_dice(total);
        let mut events = Vec::new();
        let mut distributions = Vec::new();

        for resource in Resource::ALL {
            let demand: u32 = owed.values().map(|hand| hand.get(resource)).sum();
            if demand == 0 {
                continue;
            }

            if !self.bank.withdraw(resource, demand) {
                let available = self.bank.stock(resource);
                warn!(?resource, demand, available, "bank cannot cover payout");
                events.push(GameEvent::PayoutWithheld {
                    resource,
                    owed: demand,
                    available,
                });
                continue;
            }

            for (&faction, hand) in &owed {
                let amount = hand.get(resource);
                if amount > 0 {
                    self.players[faction.index()].add_resources(resource, amount);
                    distributions.push((faction, resource, amount));
                }
            }
        }

        if !distributions.is_empty() {
            events.insert(0, GameEvent::ResourcesDistributed { distributions });
        }
        events
    }

    /// Players holding at least the discard threshold
    pub fn players_over_discard_limit(&self) -> Vec<Faction> {
        self.players
            .iter()
            .filter(|p| p.card_count() >= self.rules.discard_threshold)
            .map(|p| p.faction)
            .collect()
    }

    /// Every player over the threshold loses half their cards, picked at random
    pub fn discard_half_randomly(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for faction in self.players_over_discard_limit() {
            let player = &mut self.players[faction.index()];
            let count = player.card_count() / 2;
            let cards = player.resources.take_random(count, &mut self.rng);
            self.bank.deposit(&cards);
            events.push(GameEvent::CardsDiscarded {
                player: faction,
                cards,
            });
        }

        events
    }

    /// A chosen discard: exactly half the hand (rounded down), cards held
    pub fn discard(&mut self, faction: Faction, cards: &ResourceHand) -> Result<Vec<GameEvent>, GameError> {
        let threshold = self.rules.discard_threshold;
        let player = self.get_player_mut(faction).ok_or(GameError::InvalidDiscard)?;
        let held = player.card_count();
        if held < threshold || cards.total() != held / 2 {
            return Err(GameError::InvalidDiscard);
        }
        if !player.resources.try_subtract(cards) {
            return Err(GameError::InvalidDiscard);
        }
        self.bank.deposit(cards);

        Ok(vec![GameEvent::CardsDiscarded {
            player: faction,
            cards: cards.clone(),
        }])
    }

    /// Move the thief to a land field
    pub fn place_thief(&mut self, field: Coord) -> Result<Vec<GameEvent>, GameError> {
        validate::can_place_thief(&self.board, field)?;
        let from = self.board.thief_position();
        self.board.set_thief_position(field)?;

        Ok(vec![GameEvent::ThiefMoved {
            player: self.current_player,
            from,
            to: field,
        }])
    }

    /// Other factions with a building next to `field`
    pub fn steal_candidates(&self, field: Coord) -> Vec<Faction> {
        self.board
            .factions_at_field(field)
            .into_iter()
            .filter(|&f| f != self.current_player)
            .collect()
    }

    /// Move one random card from `victim` to the current player
    pub fn steal_from(&mut self, victim: Faction) -> Result<Resource, GameError> {
        let thief = self.current_player;
        if victim == thief {
            return Err(GameError::InvalidVictim);
        }
        let victim_player = self.players.get_mut(victim.index()).ok_or(GameError::InvalidVictim)?;
        let resource = victim_player
            .resources
            .steal_random(&mut self.rng)
            .ok_or(GameError::NoCardsToSteal)?;
        self.players[thief.index()].add_resources(resource, 1);
        Ok(resource)
    }

    // ==================== Actions ====================

    /// Get all currently valid actions for a player.
    ///
    /// Discards cannot be enumerated; a player who must discard gets a single
    /// empty `DiscardCards` placeholder and has to fill in the cards.
    pub fn valid_actions(&self, player: Faction) -> Vec<GameAction> {
        let mut actions = Vec::new();

        if let GamePhase::DiscardRequired { players_remaining } = &self.phase {
            if players_remaining.contains(&player) {
                actions.push(GameAction::DiscardCards(ResourceHand::new()));
            }
            return actions;
        }

        if player != self.current_player {
            return actions;
        }

        match &self.phase {
            GamePhase::Finished { .. } | GamePhase::DiscardRequired { .. } => {}

            GamePhase::Setup { placing, .. } => match placing {
                SetupPlacing::Settlement => {
                    if !self.is_building_limit_reached(player, StructureKind::Settlement) {
                        actions.extend(
                            self.settlement_spots(player, true)
                                .into_iter()
                                .map(GameAction::PlaceInitialSettlement),
                        );
                    }
                }
                SetupPlacing::Road => {
                    actions.extend(
                        self.road_spots(player, true)
                            .into_iter()
                            .map(|[from, to]| GameAction::PlaceInitialRoad(from, to)),
                    );
                }
            },

            GamePhase::PreRoll => actions.push(GameAction::RollDice),

            GamePhase::ThiefPlacementRequired => {
                for field in self.board.fields() {
                    if validate::can_place_thief(&self.board, field.coord).is_ok() {
                        actions.push(GameAction::PlaceThief(field.coord));
                    }
                }
            }

            GamePhase::ThiefSteal { victims, .. } => {
                actions.extend(victims.iter().map(|&v| GameAction::StealFrom(v)));
            }

            GamePhase::MainPhase => {
                actions.push(GameAction::EndTurn);

                if self.can_build(player, StructureKind::Road) {
                    actions.extend(
                        self.road_spots(player, false)
                            .into_iter()
                            .map(|[from, to]| GameAction::BuildRoad(from, to)),
                    );
                }
                if self.can_build(player, StructureKind::Settlement) {
                    actions.extend(
                        self.settlement_spots(player, false)
                            .into_iter()
                            .map(GameAction::BuildSettlement),
                    );
                }
                if self.can_build(player, StructureKind::City) {
                    for (corner, building) in self.board.corners() {
                        if building == CornerBuilding::Settlement(player) {
                            actions.push(GameAction::BuildCity(corner));
                        }
                    }
                }

                let hand = &self.current().resources;
                for offer in Resource::ALL {
                    if hand.get(offer) < TRADE_OFFER_AMOUNT {
                        continue;
                    }
                    for want in Resource::ALL {
                        if want != offer && self.bank.stock(want) > 0 {
                            actions.push(GameAction::TradeWithBank { offer, want });
                        }
                    }
                }
            }
        }

        actions
    }

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: Faction,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        let result = self.dispatch(player, &action);
        if let Err(err) = &result {
            debug!(%player, ?action, code = err.code(), "action rejected");
        }
        result
    }

    /// Resolve a dice total chosen by the caller instead of rolled.
    ///
    /// Follows the same turn and phase rules as `GameAction::RollDice`.
    pub fn throw_dice(&mut self, player: Faction, total: u8) -> Result<Vec<GameEvent>, GameError> {
        if !(2..=12).contains(&total) {
            return Err(GameError::InvalidDiceValue(total));
        }
        self.ensure_not_finished()?;
        self.expect_phase(player, &GamePhase::PreRoll)?;
        let first = total.saturating_sub(1).min(6);
        Ok(self.resolve_roll(player, (first, total - first)))
    }

    fn dispatch(&mut self, player: Faction, action: &GameAction) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_finished()?;

        let events = match action {
            // ==================== Setup Phase ====================
            GameAction::PlaceInitialSettlement(at) => {
                self.expect_turn(player)?;
                let GamePhase::Setup {
                    round,
                    placing: SetupPlacing::Settlement,
                } = self.phase
                else {
                    return Err(GameError::InvalidPhase);
                };

                // Only the second settlement pays out
                let events = self.place_initial_settlement(*at, round == 2)?;
                if !self.is_finished() {
                    self.phase = GamePhase::Setup {
                        round,
                        placing: SetupPlacing::Road,
                    };
                }
                events
            }

            GameAction::PlaceInitialRoad(from, to) => {
                self.expect_turn(player)?;
                if !matches!(
                    self.phase,
                    GamePhase::Setup {
                        placing: SetupPlacing::Road,
                        ..
                    }
                ) {
                    return Err(GameError::InvalidPhase);
                }

                let mut events = self.place_initial_road(*from, *to)?;
                events.extend(self.advance_setup_phase());
                events
            }

            // ==================== Dice Rolling ====================
            GameAction::RollDice => {
                self.expect_phase(player, &GamePhase::PreRoll)?;
                let roll = (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6));
                self.resolve_roll(player, roll)
            }

            // ==================== Discard ====================
            GameAction::DiscardCards(cards) => {
                let GamePhase::DiscardRequired { players_remaining } = &self.phase else {
                    return Err(GameError::InvalidPhase);
                };
                if !players_remaining.contains(&player) {
                    return Err(GameError::NotYourTurn);
                }

                let events = self.discard(player, cards)?;

                if let GamePhase::DiscardRequired { players_remaining } = &mut self.phase {
                    players_remaining.retain(|&p| p != player);
                    if players_remaining.is_empty() {
                        self.phase = GamePhase::ThiefPlacementRequired;
                    }
                }
                events
            }

            // ==================== Thief ====================
            GameAction::PlaceThief(field) => {
                self.expect_phase(player, &GamePhase::ThiefPlacementRequired)?;
                let mut events = self.place_thief(*field)?;

                // One candidate is robbed right away, several need a choice
                let victims = self.steal_candidates(*field);
                if victims.len() > 1 {
                    self.phase = GamePhase::ThiefSteal {
                        field: *field,
                        victims,
                    };
                } else {
                    if let Some(&victim) = victims.first() {
                        events.push(self.steal_event(victim));
                    }
                    self.phase = GamePhase::MainPhase;
                }
                events
            }

            GameAction::StealFrom(victim) => {
                self.expect_turn(player)?;
                let GamePhase::ThiefSteal { victims, .. } = &self.phase else {
                    return Err(GameError::InvalidPhase);
                };
                if !victims.contains(victim) {
                    return Err(GameError::InvalidVictim);
                }

                let event = self.steal_event(*victim);
                self.phase = GamePhase::MainPhase;
                vec![event]
            }

            // ==================== Building ====================
            GameAction::BuildRoad(from, to) => {
                self.expect_phase(player, &GamePhase::MainPhase)?;
                self.build_road(*from, *to)?
            }

            GameAction::BuildSettlement(at) => {
                self.expect_phase(player, &GamePhase::MainPhase)?;
                self.build_settlement(*at)?
            }

            GameAction::BuildCity(at) => {
                self.expect_phase(player, &GamePhase::MainPhase)?;
                self.build_city(*at)?
            }

            // ==================== Trading ====================
            GameAction::TradeWithBank { offer, want } => {
                self.expect_phase(player, &GamePhase::MainPhase)?;
                self.trade_with_bank(*offer, *want)?
            }

            // ==================== Turn Management ====================
            GameAction::EndTurn => {
                self.expect_phase(player, &GamePhase::MainPhase)?;

                self.switch_to_next_player();
                self.turn_number += 1;
                self.dice_roll = None;
                self.phase = GamePhase::PreRoll;

                vec![GameEvent::TurnEnded {
                    player,
                    next_player: self.current_player,
                }]
            }
        };

        Ok(events)
    }

    /// Serializable view of the whole game
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase.clone(),
            current_player: self.current_player,
            turn_number: self.turn_number,
            players: self.players.clone(),
            bank: self.bank.supply().clone(),
            thief: self.board.thief_position(),
            buildings: self
                .board
                .corners()
                .filter(|(_, building)| !building.is_empty())
                .collect(),
            roads: self
                .board
                .edges()
                .filter_map(|(edge, road)| road.owner().map(|owner| (edge, owner)))
                .collect(),
        }
    }

    // ==================== Helper Methods ====================

    fn ensure_not_finished(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn expect_turn(&self, player: Faction) -> Result<(), GameError> {
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn expect_phase(&self, player: Faction, phase: &GamePhase) -> Result<(), GameError> {
        self.expect_turn(player)?;
        if &self.phase != phase {
            return Err(GameError::InvalidPhase);
        }
        Ok(())
    }

    fn ensure_stock(&self, faction: Faction, kind: StructureKind) -> Result<(), GameError> {
        if self.is_building_limit_reached(faction, kind) {
            return Err(GameError::StructureLimitReached);
        }
        Ok(())
    }

    fn ensure_affordable(&self, faction: Faction, kind: StructureKind) -> Result<(), GameError> {
        let player = self.get_player(faction).ok_or(GameError::NotYourTurn)?;
        if !player.resources.can_afford(self.rules.cost(kind)) {
            return Err(GameError::InsufficientResources);
        }
        Ok(())
    }

    fn can_build(&self, faction: Faction, kind: StructureKind) -> bool {
        self.ensure_stock(faction, kind).is_ok() && self.ensure_affordable(faction, kind).is_ok()
    }

    /// Take a building cost out of a hand and give it to the bank
    fn charge(&mut self, faction: Faction, kind: StructureKind) -> Result<(), GameError> {
        let cost = self.rules.cost(kind).clone();
        let player = self.get_player_mut(faction).ok_or(GameError::NotYourTurn)?;
        if !player.pay_cost(&cost) {
            return Err(GameError::InsufficientResources);
        }
        self.bank.deposit(&cost);
        Ok(())
    }

    fn settlement_spots(&self, faction: Faction, initial: bool) -> Vec<Coord> {
        self.board
            .corners()
            .map(|(corner, _)| corner)
            .filter(|&corner| validate::can_place_settlement(&self.board, corner, faction, initial).is_ok())
            .collect()
    }

    fn road_spots(&self, faction: Faction, initial: bool) -> Vec<[Coord; 2]> {
        self.board
            .edges()
            .map(|(edge, _)| edge.endpoints())
            .filter(|[from, to]| {
                validate::can_place_road(&self.board, *from, *to, faction, initial).is_ok()
            })
            .collect()
    }

    fn resolve_roll(&mut self, player: Faction, roll: (u8, u8)) -> Vec<GameEvent> {
        let total = roll.0 + roll.1;
        self.dice_roll = Some(roll);
        let mut events = vec![GameEvent::DiceRolled {
            player,
            roll,
            total,
        }];

        if total != 7 {
            events.extend(self.pay_out_dice(total));
            self.phase = GamePhase::MainPhase;
            return events;
        }

        match self.discard_mode {
            DiscardMode::Random => {
                events.extend(self.discard_half_randomly());
                self.phase = GamePhase::ThiefPlacementRequired;
            }
            DiscardMode::PlayerChoice => {
                let must_discard = self.players_over_discard_limit();
                self.phase = if must_discard.is_empty() {
                    GamePhase::ThiefPlacementRequired
                } else {
                    GamePhase::DiscardRequired {
                        players_remaining: must_discard,
                    }
                };
            }
        }
        events
    }

    fn steal_event(&mut self, victim: Faction) -> GameEvent {
        let thief = self.current_player;
        let resource = match self.steal_from(victim) {
            Ok(resource) => Some(resource),
            Err(err) => {
                debug!(%thief, %victim, code = err.code(), "nothing stolen");
                None
            }
        };
        GameEvent::ResourceStolen {
            thief,
            victim,
            resource,
        }
    }

    fn advance_setup_phase(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let GamePhase::Setup { .. } = self.phase else {
            return events;
        };

        // Snake order: 0,1,2,2,1,0
        self.setup_placements += 1;
        let player_count = self.player_count();

        if self.setup_placements >= player_count * 2 {
            self.phase = GamePhase::PreRoll;
            self.turn_number = 1;
            info!(first = %self.current_player, "setup complete");
            events.push(GameEvent::SetupCompleted);
        } else if self.setup_placements == player_count {
            // Last player places again, starting round 2
            self.phase = GamePhase::Setup {
                round: 2,
                placing: SetupPlacing::Settlement,
            };
        } else if self.setup_placements < player_count {
            self.switch_to_next_player();
            self.phase = GamePhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement,
            };
        } else {
            self.switch_to_previous_player();
            self.phase = GamePhase::Setup {
                round: 2,
                placing: SetupPlacing::Settlement,
            };
        }

        events
    }

    fn check_win_condition(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(winner) = self.winner() {
            let points = self.get_player(winner).map_or(0, |p| p.points());
            info!(%winner, points, "game won");
            self.phase = GamePhase::Finished { winner };
            events.push(GameEvent::GameWon {
                player: winner,
                points,
            });
        }

        events
    }
}

fn distribution_of(faction: Faction, cards: &ResourceHand) -> Vec<(Faction, Resource, u32)> {
    Resource::ALL
        .iter()
        .filter(|&&r| cards.get(r) > 0)
        .map(|&r| (faction, r, cards.get(r)))
        .collect()
}
