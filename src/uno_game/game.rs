use super::card::{new_deck, shuffle, Card, CardId, Color};
use super::player::{Player, PlayerId};
use super::rules::{can_play, RuleSet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;
pub const HAND_SIZE: usize = 7;

/// Why an action was rejected. A rejected action never changes the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    GameFull,
    AlreadyStarted,
    DuplicatePlayer,
    NotEnoughPlayers,
    NotStarted,
    GameAlreadyOver,
    NotYourTurn,
    CardNotInHand,
    InvalidMove,
    ColorRequired,
    InvalidColor,
    EmptyDeck,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::GameFull => write!(f, "Game is full"),
            GameError::AlreadyStarted => write!(f, "Game has already started"),
            GameError::DuplicatePlayer => write!(f, "Player has already joined"),
            GameError::NotEnoughPlayers => write!(f, "At least {} players are needed", MIN_PLAYERS),
            GameError::NotStarted => write!(f, "Game has not started"),
            GameError::GameAlreadyOver => write!(f, "Game is already over"),
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::CardNotInHand => write!(f, "Card not in hand"),
            GameError::InvalidMove => write!(f, "Invalid move"),
            GameError::ColorRequired => write!(f, "Color required for Wild card"),
            GameError::InvalidColor => write!(f, "Invalid color"),
            GameError::EmptyDeck => write!(f, "Deck is empty"),
        }
    }
}

impl std::error::Error for GameError {}

/// Represents the direction of play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Everything a caller can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Join {
        player_id: PlayerId,
        player_name: String,
    },
    Start,
    Play {
        player_id: PlayerId,
        card_id: CardId,
        #[serde(default)]
        selected_color: Option<Color>,
    },
    Draw {
        player_id: PlayerId,
    },
    NextTurn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub players: Vec<Player>,
    pub current_turn: usize,
    pub direction: Direction,
    /// Draw pile, front is the next card drawn.
    pub deck: VecDeque<Card>,
    /// Last element is the top card.
    pub discard_pile: Vec<Card>,
    pub started: bool,
    pub winner: Option<PlayerId>,
    /// Reserved for stacking draw penalties; reset on every play and never read.
    pub pending_draws: usize,
    pub wild_color: Option<Color>,
    pub rules: RuleSet,
}

impl GameState {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_rules(id, RuleSet::default())
    }

    pub fn with_rules(id: impl Into<String>, rules: RuleSet) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
            current_turn: 0,
            direction: Direction::Clockwise,
            deck: VecDeque::new(),
            discard_pile: Vec::new(),
            started: false,
            winner: None,
            pending_draws: 0,
            wild_color: None,
            rules,
        }
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Total cards across the draw pile, the discard pile and every hand.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// Applies `action`, returning the next state. A rejected action yields an
    /// unchanged copy of `self`.
    pub fn apply<R: Rng + ?Sized>(&self, action: &Action, rng: &mut R) -> GameState {
        self.try_apply(action, rng).unwrap_or_else(|_| self.clone())
    }

    /// Like [`GameState::apply`] but reports why an action was rejected.
    pub fn try_apply<R: Rng + ?Sized>(
        &self,
        action: &Action,
        rng: &mut R,
    ) -> Result<GameState, GameError> {
        let mut next = self.clone();
        match action {
            Action::Join {
                player_id,
                player_name,
            } => next.join(player_id, player_name)?,
            Action::Start => next.start(rng)?,
            Action::Play {
                player_id,
                card_id,
                selected_color,
            } => next.play_card(player_id, *card_id, *selected_color)?,
            Action::Draw { player_id } => next.draw_card(player_id, rng)?,
            Action::NextTurn => next.next_turn()?,
        }
        Ok(next)
    }

    fn join(&mut self, player_id: &str, player_name: &str) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }
        if self.player(player_id).is_some() {
            return Err(GameError::DuplicatePlayer);
        }

        let is_host = self.players.is_empty();
        self.players.push(Player::new(player_id, player_name, is_host));
        Ok(())
    }

    fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        let mut deck: VecDeque<Card> = new_deck(rng).into();

        // Deal 7 cards to each player, in join order
        for player in self.players.iter_mut() {
            for _ in 0..HAND_SIZE {
                let card = deck.pop_front().ok_or(GameError::EmptyDeck)?;
                player.add_card(card);
            }
        }

        // The first non-wild card opens the discard pile; skipped wilds stay put
        let first = deck
            .iter()
            .position(|card| !card.is_wild())
            .ok_or(GameError::EmptyDeck)?;
        let top_card = deck.remove(first).ok_or(GameError::EmptyDeck)?;

        self.deck = deck;
        self.discard_pile = vec![top_card];
        self.started = true;
        self.current_turn = 0;
        self.direction = Direction::Clockwise;
        self.wild_color = None;
        self.pending_draws = 0;
        Ok(())
    }

    /// Index of `player_id` if it is their turn in a running game.
    fn turn_of(&self, player_id: &str) -> Result<usize, GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        match self.current_player() {
            Some(player) if player.id == player_id => Ok(self.current_turn),
            _ => Err(GameError::NotYourTurn),
        }
    }

    fn play_card(
        &mut self,
        player_id: &str,
        card_id: CardId,
        selected_color: Option<Color>,
    ) -> Result<(), GameError> {
        let index = self.turn_of(player_id)?;

        let card = self.players[index]
            .find_card(card_id)
            .ok_or(GameError::CardNotInHand)?;
        let top_card = self.top_card().ok_or(GameError::NotStarted)?;
        if !can_play(card, top_card, self.wild_color) {
            return Err(GameError::InvalidMove);
        }

        let wild_color = if card.is_wild() {
            match selected_color {
                None => return Err(GameError::ColorRequired),
                Some(Color::Wild) => return Err(GameError::InvalidColor),
                color => color,
            }
        } else {
            None
        };

        let card = self.players[index].remove_card(card_id)?;
        let card_type = card.card_type;
        self.discard_pile.push(card);
        self.wild_color = wild_color;
        self.pending_draws = 0;

        if self.players[index].has_won() {
            self.winner = Some(self.players[index].id.clone());
            return Ok(());
        }

        self.resolve_effect(card_type);
        Ok(())
    }

    fn draw_card<R: Rng + ?Sized>(
        &mut self,
        player_id: &str,
        rng: &mut R,
    ) -> Result<(), GameError> {
        let index = self.turn_of(player_id)?;

        if self.deck.is_empty() {
            self.recycle_discard_pile(rng);
        }

        let card = self.deck.pop_front().ok_or(GameError::EmptyDeck)?;
        self.players[index].add_card(card);
        Ok(())
    }

    /// Shuffles everything under the top card back into the draw pile.
    fn recycle_discard_pile<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(top_card) = self.discard_pile.pop() else {
            return;
        };
        let mut recycled = std::mem::take(&mut self.discard_pile);
        shuffle(&mut recycled, rng);
        self.deck = recycled.into();
        self.discard_pile.push(top_card);
    }

    fn next_turn(&mut self) -> Result<(), GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        self.advance_turn();
        Ok(())
    }

    /// Updates the current turn based on the direction of play.
    pub(super) fn advance_turn(&mut self) {
        let num_players = self.players.len();
        if num_players == 0 {
            return;
        }
        self.current_turn = match self.direction {
            Direction::Clockwise => (self.current_turn + 1) % num_players,
            Direction::CounterClockwise => (self.current_turn + num_players - 1) % num_players,
        };
    }

    /// Reverses the direction of play.
    pub(super) fn reverse_direction(&mut self) {
        self.direction = self.direction.reverse();
    }
}
