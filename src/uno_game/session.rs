use super::game::{Action, GameError, GameState};
use super::player::PlayerId;
use super::rules::RuleSet;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const GAME_ID_LEN: usize = 6;
const GAME_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub game: GameState,
    pub last_updated: DateTime<Utc>,
}

impl GameSession {
    pub fn new(id: String, game: GameState) -> Self {
        Self {
            id,
            game,
            last_updated: Utc::now(),
        }
    }
}

/// Key-value storage for games, keyed by game id.
///
/// Implementations need not serialize callers; [`SessionManager`] holds a
/// per-game lock around every read-modify-write.
pub trait GameStore: Send + Sync {
    fn get(&self, id: &str) -> Option<GameState>;
    fn put(&self, id: &str, game: GameState);
    fn list(&self) -> Vec<String>;
    fn delete(&self, id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, GameSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: &str) -> Option<GameSession> {
        self.sessions().get(id).cloned()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GameStore for MemoryStore {
    fn get(&self, id: &str) -> Option<GameState> {
        self.sessions().get(id).map(|session| session.game.clone())
    }

    fn put(&self, id: &str, game: GameState) {
        self.sessions()
            .insert(id.to_string(), GameSession::new(id.to_string(), game));
    }

    fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn delete(&self, id: &str) -> bool {
        self.sessions().remove(id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    GameNotFound(String),
    Rejected(GameError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::GameNotFound(id) => write!(f, "Game not found: {}", id),
            SessionError::Rejected(e) => write!(f, "Action rejected: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Rejected(e) => Some(e),
            SessionError::GameNotFound(_) => None,
        }
    }
}

impl From<GameError> for SessionError {
    fn from(e: GameError) -> Self {
        SessionError::Rejected(e)
    }
}

/// A short uppercase code players can read out to each other.
pub fn generate_game_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GAME_ID_LEN)
        .map(|_| GAME_ID_ALPHABET[rng.random_range(0..GAME_ID_ALPHABET.len())] as char)
        .collect()
}

pub fn generate_player_id() -> PlayerId {
    format!("player-{}", uuid::Uuid::new_v4())
}

/// Owns the store and the random source, and funnels every action for a game
/// through one writer at a time.
pub struct SessionManager<S: GameStore> {
    store: S,
    rules: RuleSet,
    rng: Mutex<StdRng>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: GameStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    pub fn seeded(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, rng: StdRng) -> Self {
        Self {
            store,
            rules: RuleSet::default(),
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Rules applied to games created from now on.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a game under a fresh id and joins `host_name` as its host.
    pub fn create_game(&self, host_name: &str) -> Result<(GameState, PlayerId), SessionError> {
        let id = loop {
            let id = generate_game_id(&mut *self.rng());
            let lock = self.game_lock(&id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            if self.store.get(&id).is_none() {
                self.store.put(&id, GameState::with_rules(id.clone(), self.rules));
                break id;
            }
        };
        info!("Created new game: {}", id);
        self.join_game(&id, host_name)
    }

    /// Joins an existing game under a freshly generated player id.
    pub fn join_game(
        &self,
        game_id: &str,
        player_name: &str,
    ) -> Result<(GameState, PlayerId), SessionError> {
        let player_id = generate_player_id();
        let game = self.dispatch(
            game_id,
            &Action::Join {
                player_id: player_id.clone(),
                player_name: player_name.to_string(),
            },
        )?;
        info!("{} joined game {} as {}", player_name, game_id, player_id);
        Ok((game, player_id))
    }

    /// Applies `action` to the stored game and stores the result.
    ///
    /// A rejected action leaves the stored game untouched.
    pub fn dispatch(&self, game_id: &str, action: &Action) -> Result<GameState, SessionError> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let game = self
            .store
            .get(game_id)
            .ok_or_else(|| SessionError::GameNotFound(game_id.to_string()))?;

        let next = game
            .try_apply(action, &mut *self.rng())
            .inspect_err(|e| warn!("Rejected {:?} in game {}: {}", action, game_id, e))?;

        debug!("Applied {:?} in game {}", action, game_id);
        if let Some(winner) = &next.winner {
            info!("Game {} won by {}", game_id, winner);
        }
        self.store.put(game_id, next.clone());
        Ok(next)
    }

    pub fn get_game(&self, game_id: &str) -> Option<GameState> {
        self.store.get(game_id)
    }

    pub fn list_games(&self) -> Vec<String> {
        self.store.list()
    }

    /// Deletes under the game's lock, so an in-flight dispatch cannot put the
    /// game back afterwards.
    pub fn delete_game(&self, game_id: &str) -> bool {
        let lock = self.game_lock(game_id);
        let deleted = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.delete(game_id)
        };

        // The entry goes only when nobody else holds it, so later callers
        // never get a second lock for the same key.
        let mut locks = self.locks();
        if Arc::strong_count(&lock) == 2 {
            locks.remove(game_id);
        }
        drop(locks);

        if deleted {
            info!("Deleted game: {}", game_id);
        }
        deleted
    }

    fn game_lock(&self, game_id: &str) -> Arc<Mutex<()>> {
        self.locks()
            .entry(game_id.to_string())
            .or_default()
            .clone()
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uno_game::rules::SkipRule;
    use std::thread;

    fn manager() -> SessionManager<MemoryStore> {
        SessionManager::seeded(MemoryStore::new(), 5)
    }

    #[test]
    fn test_generate_game_id_format() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let id = generate_game_id(&mut rng);
            assert_eq!(id.len(), GAME_ID_LEN);
            assert!(id
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_player_id_is_unique() {
        let a = generate_player_id();
        let b = generate_player_id();
        assert!(a.starts_with("player-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_create_game_joins_host() {
        let manager = manager();
        let (game, host_id) = manager.create_game("Alice").unwrap();

        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].id, host_id);
        assert!(game.players[0].is_host);
        assert_eq!(manager.get_game(&game.id), Some(game.clone()));
        assert_eq!(manager.list_games(), vec![game.id.clone()]);
        assert!(manager.store().session(&game.id).is_some());
    }

    #[test]
    fn test_join_and_play_through_manager() {
        let manager = manager();
        let (game, host_id) = manager.create_game("Alice").unwrap();
        let (joined, bob_id) = manager.join_game(&game.id, "Bob").unwrap();
        assert_eq!(joined.players.len(), 2);
        assert!(!joined.players[1].is_host);

        let started = manager.dispatch(&game.id, &Action::Start).unwrap();
        assert!(started.started);

        // Bob cannot draw out of turn and the stored game is unchanged
        let result = manager.dispatch(
            &game.id,
            &Action::Draw {
                player_id: bob_id.clone(),
            },
        );
        assert_eq!(result, Err(SessionError::Rejected(GameError::NotYourTurn)));
        assert_eq!(manager.get_game(&game.id), Some(started.clone()));

        let drawn = manager
            .dispatch(&game.id, &Action::Draw { player_id: host_id })
            .unwrap();
        assert_eq!(drawn.players[0].hand.len(), 8);
    }

    #[test]
    fn test_games_are_kept_apart() {
        let manager = manager();
        let (first, _) = manager.create_game("Alice").unwrap();
        let (second, _) = manager.create_game("Carol").unwrap();
        assert_ne!(first.id, second.id);

        manager.join_game(&first.id, "Bob").unwrap();
        assert_eq!(manager.get_game(&first.id).unwrap().players.len(), 2);
        assert_eq!(manager.get_game(&second.id).unwrap().players.len(), 1);
    }

    #[test]
    fn test_unknown_game() {
        let manager = manager();
        assert_eq!(
            manager.join_game("NOPE00", "Bob").map(|(g, _)| g),
            Err(SessionError::GameNotFound("NOPE00".to_string()))
        );
        assert!(!manager.delete_game("NOPE00"));
    }

    #[test]
    fn test_delete_game() {
        let manager = manager();
        let (game, _) = manager.create_game("Alice").unwrap();
        assert!(manager.delete_game(&game.id));
        assert!(manager.get_game(&game.id).is_none());
        assert!(manager.list_games().is_empty());
    }

    #[test]
    fn test_delete_keeps_lock_that_is_still_shared() {
        let manager = manager();
        let (game, _) = manager.create_game("Alice").unwrap();

        let held = manager.game_lock(&game.id);
        assert!(manager.delete_game(&game.id));
        assert!(Arc::ptr_eq(&held, &manager.game_lock(&game.id)));

        drop(held);
        assert!(!manager.delete_game(&game.id));
        assert!(!manager.locks().contains_key(&game.id));
    }

    #[test]
    fn test_deleted_game_stays_deleted_under_concurrent_dispatch() {
        for seed in 0..20 {
            let manager = SessionManager::seeded(MemoryStore::new(), seed);
            let (game, _) = manager.create_game("Host").unwrap();

            thread::scope(|scope| {
                for i in 0..8 {
                    let manager = &manager;
                    let id = game.id.clone();
                    scope.spawn(move || {
                        let _ = manager.join_game(&id, &format!("Guest {}", i));
                    });
                }
                let manager = &manager;
                let id = game.id.clone();
                scope.spawn(move || assert!(manager.delete_game(&id)));
            });

            assert!(manager.get_game(&game.id).is_none());
            assert!(manager.list_games().is_empty());
        }
    }

    #[test]
    fn test_rules_apply_to_new_games() {
        let manager = manager().with_rules(RuleSet {
            skip: SkipRule::SkipNext,
        });
        let (game, _) = manager.create_game("Alice").unwrap();
        assert_eq!(game.rules.skip, SkipRule::SkipNext);
    }

    #[test]
    fn test_concurrent_joins_are_serialized() {
        let manager = manager();
        let (game, _) = manager.create_game("Host").unwrap();

        thread::scope(|scope| {
            for i in 0..12 {
                let manager = &manager;
                let id = game.id.clone();
                scope.spawn(move || {
                    let _ = manager.join_game(&id, &format!("Guest {}", i));
                });
            }
        });

        let stored = manager.get_game(&game.id).unwrap();
        assert_eq!(stored.players.len(), 10);
        assert_eq!(stored.players.iter().filter(|p| p.is_host).count(), 1);
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::Rejected(GameError::NotYourTurn);
        assert_eq!(err.to_string(), "Action rejected: Not your turn");
        assert!(std::error::Error::source(&err).is_some());
        let err: SessionError = GameError::EmptyDeck.into();
        assert_eq!(err, SessionError::Rejected(GameError::EmptyDeck));
    }
}
