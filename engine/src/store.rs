//! Session store contract.
//!
//! All durable state lives behind this trait: the player-to-game binding
//! table and the per-game session records. The store is the single source of
//! truth; the engine holds nothing across requests, so horizontally scaled
//! instances stay correct as long as the two atomic primitives hold:
//!
//! - [`SessionStore::bind_if_absent`] is a conditional set-if-absent.
//! - [`SessionStore::save`] writes a record only if the stored version equals
//!   `record.version - 1` (or the key is absent and `record.version` is 1).

use anyhow::Result;
use parkle_types::{GameId, SessionRecord};
use std::future::Future;

pub trait SessionStore {
    /// Bind `player` to `game_id` iff no binding exists. Returns whether the
    /// binding was written.
    fn bind_if_absent(&self, player: &str, game_id: &str) -> impl Future<Output = Result<bool>>;

    /// The game the player is currently bound to, if any.
    fn binding(&self, player: &str) -> impl Future<Output = Result<Option<GameId>>>;

    /// Remove the player's binding, if present.
    fn unbind(&self, player: &str) -> impl Future<Output = Result<()>>;

    /// Load a session record.
    fn load(&self, game_id: &str) -> impl Future<Output = Result<Option<SessionRecord>>>;

    /// Conditionally write a session record. Returns false (and writes
    /// nothing) when the version precondition fails.
    fn save(&self, game_id: &str, record: &SessionRecord) -> impl Future<Output = Result<bool>>;

    /// Remove a session record.
    fn remove(&self, game_id: &str) -> impl Future<Output = Result<()>>;
}

#[cfg(any(test, feature = "mocks"))]
pub use memory::Memory;

#[cfg(any(test, feature = "mocks"))]
mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Inner {
        bindings: HashMap<String, GameId>,
        sessions: HashMap<GameId, SessionRecord>,
    }

    /// In-memory store for tests and local embedding. A single mutex makes
    /// each primitive atomic, mirroring what the keyed store guarantees.
    #[derive(Default)]
    pub struct Memory {
        inner: Mutex<Inner>,
    }

    impl SessionStore for Memory {
        async fn bind_if_absent(&self, player: &str, game_id: &str) -> Result<bool> {
            let mut inner = self.inner.lock().await;
            if inner.bindings.contains_key(player) {
                return Ok(false);
            }
            inner
                .bindings
                .insert(player.to_string(), game_id.to_string());
            Ok(true)
        }

        async fn binding(&self, player: &str) -> Result<Option<GameId>> {
            let inner = self.inner.lock().await;
            Ok(inner.bindings.get(player).cloned())
        }

        async fn unbind(&self, player: &str) -> Result<()> {
            let mut inner = self.inner.lock().await;
            inner.bindings.remove(player);
            Ok(())
        }

        async fn load(&self, game_id: &str) -> Result<Option<SessionRecord>> {
            let inner = self.inner.lock().await;
            Ok(inner.sessions.get(game_id).cloned())
        }

        async fn save(&self, game_id: &str, record: &SessionRecord) -> Result<bool> {
            let mut inner = self.inner.lock().await;
            let stored = inner.sessions.get(game_id).map(|r| r.version).unwrap_or(0);
            if record.version != stored + 1 {
                return Ok(false);
            }
            inner.sessions.insert(game_id.to_string(), record.clone());
            Ok(true)
        }

        async fn remove(&self, game_id: &str) -> Result<()> {
            let mut inner = self.inner.lock().await;
            inner.sessions.remove(game_id);
            Ok(())
        }
    }

}
