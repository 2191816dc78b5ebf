use super::card::CardType;
use super::game::{Action, GameState};
use super::player::PlayerId;
use super::session::{GameStore, SessionError, SessionManager};
use super::ui::ConsoleUI;
use log::info;
use std::io;

/// Hot-seat terminal game: every seat shares one console.
pub struct GameController<S: GameStore> {
    manager: SessionManager<S>,
    ui: ConsoleUI,
    game_id: String,
}

#[derive(Debug)]
pub enum ControllerError {
    NoPlayers,
    Io(io::Error),
    Session(SessionError),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::NoPlayers => write!(f, "No player names given"),
            ControllerError::Io(e) => write!(f, "Console error: {}", e),
            ControllerError::Session(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::NoPlayers => None,
            ControllerError::Io(e) => Some(e),
            ControllerError::Session(e) => Some(e),
        }
    }
}

impl From<io::Error> for ControllerError {
    fn from(e: io::Error) -> Self {
        ControllerError::Io(e)
    }
}

impl From<SessionError> for ControllerError {
    fn from(e: SessionError) -> Self {
        ControllerError::Session(e)
    }
}

impl<S: GameStore> GameController<S> {
    /// Seats `player_names` in order (the first one hosts) and deals.
    pub fn new(
        manager: SessionManager<S>,
        ui: ConsoleUI,
        player_names: &[String],
    ) -> Result<Self, ControllerError> {
        let (host, guests) = player_names
            .split_first()
            .ok_or(ControllerError::NoPlayers)?;

        let (game, _) = manager.create_game(host)?;
        for name in guests {
            manager.join_game(&game.id, name)?;
        }
        manager.dispatch(&game.id, &Action::Start)?;
        info!("Started game {} with {} players", game.id, player_names.len());

        Ok(Self {
            manager,
            ui,
            game_id: game.id,
        })
    }

    pub fn game(&self) -> Option<GameState> {
        self.manager.get_game(&self.game_id)
    }

    pub fn manager(&self) -> &SessionManager<S> {
        &self.manager
    }

    /// Runs until someone wins (returning their id) or the player quits.
    pub fn run(&mut self) -> Result<Option<PlayerId>, ControllerError> {
        self.ui.show_message("Welcome to Uno!")?;

        loop {
            let game = self
                .game()
                .ok_or_else(|| SessionError::GameNotFound(self.game_id.clone()))?;

            if let Some(winner) = &game.winner {
                let name = game.player(winner).map_or(winner.as_str(), |p| p.name.as_str());
                self.ui.show_message(&format!("\nPlayer {} has won the game!", name))?;
                return Ok(Some(winner.clone()));
            }

            let Some(player) = game.current_player() else {
                return Ok(None);
            };
            self.ui.display_game_state(&game)?;
            self.ui.display_player_hand(&game, &player.name, &player.hand)?;

            let action = match self.ui.get_player_action()?.as_str() {
                "1" => {
                    let index = match self.ui.get_card_index()? {
                        Ok(index) => index,
                        Err(message) => {
                            self.ui.show_message(&message)?;
                            continue;
                        }
                    };
                    let Some(card) = player.hand.get(index) else {
                        self.ui.show_message("Error: Card not in hand")?;
                        continue;
                    };
                    let selected_color = if card.is_wild() {
                        Some(self.ui.choose_color()?)
                    } else {
                        None
                    };
                    Action::Play {
                        player_id: player.id.clone(),
                        card_id: card.id,
                        selected_color,
                    }
                }
                "2" => Action::Draw {
                    player_id: player.id.clone(),
                },
                "3" => Action::NextTurn,
                "q" => return Ok(None),
                _ => {
                    self.ui.show_message("Invalid choice. Please enter 1, 2, 3, or q.")?;
                    continue;
                }
            };

            match self.manager.dispatch(&self.game_id, &action) {
                Ok(next) => self.after_action(&next, &action)?,
                Err(SessionError::Rejected(e)) => {
                    self.ui.show_message(&format!("Error: {}", e))?;
                    self.ui.show_message("Please try again.")?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reports the action and passes the turn after a play whose card leaves
    /// that to the caller.
    fn after_action(&mut self, after: &GameState, action: &Action) -> Result<(), ControllerError> {
        match action {
            Action::Play { player_id, .. } => {
                let Some(card) = after.top_card() else {
                    return Ok(());
                };
                let name = name_of(after, player_id);
                self.ui.show_message(&format!("{} played {}", name, card))?;
                if after.winner.is_none() && caller_passes_turn(after, card.card_type) {
                    self.manager.dispatch(&self.game_id, &Action::NextTurn)?;
                }
            }
            Action::Draw { player_id } => {
                let drawn = after
                    .player(player_id)
                    .and_then(|p| p.hand.last())
                    .map(|card| card.to_string())
                    .unwrap_or_default();
                self.ui.show_message(&format!("You drew {}.", drawn))?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Skip, DrawTwo and WildDrawFour move the turn themselves, as does Reverse
/// between two players.
fn caller_passes_turn(game: &GameState, card_type: CardType) -> bool {
    match card_type {
        CardType::Number(_) | CardType::Wild => true,
        CardType::Reverse => game.players.len() > 2,
        CardType::Skip | CardType::DrawTwo | CardType::WildDrawFour => false,
    }
}

fn name_of<'a>(game: &'a GameState, player_id: &'a str) -> &'a str {
    game.player(player_id).map_or(player_id, |p| p.name.as_str())
}
