//! Registry of live games
//!
//! Lookups take the shared lock; create and delete take it exclusively.
//! Each game carries its own state lock, so holding a game `Arc` never
//! blocks other games.

use crate::core::GameId;
use crate::game::{EngineLogger, Game, GameSettings};
use crate::loader::CardRegistry;
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub struct GameRepository {
    games: RwLock<FxHashMap<GameId, Arc<Game>>>,
    registry: Arc<dyn CardRegistry>,
    next_id: AtomicU64,
    capture_logs: bool,
}

impl GameRepository {
    pub fn new(registry: Arc<dyn CardRegistry>) -> Self {
        GameRepository {
            games: RwLock::new(FxHashMap::default()),
            registry,
            next_id: AtomicU64::new(1),
            capture_logs: false,
        }
    }

    /// Games created from here on keep their log lines in memory
    pub fn with_log_capture(mut self) -> Self {
        self.capture_logs = true;
        self
    }

    pub fn registry(&self) -> &Arc<dyn CardRegistry> {
        &self.registry
    }

    /// Create a game in the lobby with a fresh id
    pub fn create(&self, settings: GameSettings) -> Arc<Game> {
        let id = GameId::new(format!(
            "game-{}",
            self.next_id.fetch_add(1, Ordering::Relaxed)
        ));
        let mut logger = EngineLogger::with_verbosity(settings.verbosity);
        if self.capture_logs {
            logger.enable_capture();
        }
        let game = Game::new(id.clone(), settings, Arc::clone(&self.registry), logger);
        game.logger().minimal(&format!("created game {id}"));

        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&game));
        game
    }

    pub fn get(&self, id: &GameId) -> Result<Arc<Game>> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("game", id))
    }

    /// Ids of every live game, sorted
    pub fn list(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn delete(&self, id: &GameId) -> Result<()> {
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::not_found("game", id))
    }

    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;
    use crate::loader::InMemoryCardRegistry;
    use std::thread;

    fn repo() -> GameRepository {
        GameRepository::new(Arc::new(InMemoryCardRegistry::default()))
    }

    #[test]
    fn test_create_get_delete() {
        let repo = repo();
        let game = repo.create(GameSettings::default());
        assert_eq!(game.read(|s| s.status()), GameStatus::Lobby);

        let fetched = repo.get(game.id()).unwrap();
        assert!(Arc::ptr_eq(&game, &fetched));
        assert_eq!(repo.list(), vec![game.id().clone()]);

        repo.delete(game.id()).unwrap();
        assert!(repo.is_empty());
        assert!(matches!(
            repo.get(game.id()),
            Err(EngineError::NotFound { kind: "game", .. })
        ));
        assert!(repo.delete(game.id()).is_err());
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        let repo = Arc::new(repo());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for _ in 0..10 {
                        repo.create(GameSettings::default());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.len(), 40);
        assert_eq!(repo.list().len(), 40);
    }
}
