pub mod card;
pub mod controller;
mod effects;
pub mod game;
pub mod player;
pub mod replay;
pub mod rules;
pub mod session;
pub mod ui;

pub use card::{Card, CardId, CardType, Color};
pub use game::{Action, Direction, GameError, GameState};
pub use player::{Player, PlayerId};
pub use rules::{can_play, RuleSet, SkipRule};
pub use session::{GameStore, MemoryStore, SessionError, SessionManager};
