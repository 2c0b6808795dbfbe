use anyhow::{Context, Result};
use parkle_engine::SessionStore;
use parkle_types::{GameId, SessionRecord};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::Mutex;

use crate::RedisStoreConfig;

/// Applies a record write only when its version is exactly one past the
/// stored version (absent counts as zero). Runs server-side so the check
/// and the write cannot interleave with another client.
const SAVE_SCRIPT: &str = r#"
local stored = tonumber(redis.call('GET', KEYS[2]) or '0')
if stored + 1 == tonumber(ARGV[2]) then
    redis.call('SET', KEYS[1], ARGV[1])
    redis.call('SET', KEYS[2], ARGV[2])
    return 1
end
return 0
"#;

/// [`SessionStore`] over Redis. Connects lazily on first use and shares a
/// multiplexed connection manager across calls.
pub struct RedisSessionStore {
    client: redis::Client,
    connection: Mutex<Option<ConnectionManager>>,
    save_script: redis::Script,
    key_prefix: String,
}

impl RedisSessionStore {
    pub fn new(config: RedisStoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .with_context(|| format!("invalid redis url {}", config.url))?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            save_script: redis::Script::new(SAVE_SCRIPT),
            key_prefix: config.key_prefix,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let mut guard = self.connection.lock().await;
        if let Some(manager) = guard.as_ref() {
            return Ok(manager.clone());
        }
        let manager = self
            .client
            .get_connection_manager()
            .await
            .context("failed to connect to redis")?;
        tracing::debug!("redis connection established");
        // The manager is a cheap handle over one multiplexed connection and
        // reconnects on its own, so callers get a clone and drop the lock.
        *guard = Some(manager.clone());
        Ok(manager)
    }

    fn player_key(&self, player: &str) -> String {
        format!("{}player:{}", self.key_prefix, player)
    }

    fn game_key(&self, game_id: &str) -> String {
        format!("{}game:{}", self.key_prefix, game_id)
    }

    fn version_key(&self, game_id: &str) -> String {
        format!("{}game:{}:version", self.key_prefix, game_id)
    }
}

impl SessionStore for RedisSessionStore {
    async fn bind_if_absent(&self, player: &str, game_id: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let bound: bool = conn
            .set_nx(self.player_key(player), game_id)
            .await
            .with_context(|| format!("failed to bind player {player}"))?;
        Ok(bound)
    }

    async fn binding(&self, player: &str) -> Result<Option<GameId>> {
        let mut conn = self.connection().await?;
        let bound: Option<String> = conn
            .get(self.player_key(player))
            .await
            .with_context(|| format!("failed to read binding for player {player}"))?;
        Ok(bound)
    }

    async fn unbind(&self, player: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(self.player_key(player))
            .await
            .with_context(|| format!("failed to unbind player {player}"))?;
        Ok(())
    }

    async fn load(&self, game_id: &str) -> Result<Option<SessionRecord>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(self.game_key(game_id))
            .await
            .with_context(|| format!("failed to load game {game_id}"))?;
        raw.map(|raw| {
            serde_json::from_str(&raw)
                .with_context(|| format!("corrupt session record for game {game_id}"))
        })
        .transpose()
    }

    async fn save(&self, game_id: &str, record: &SessionRecord) -> Result<bool> {
        let payload = serde_json::to_string(record)
            .with_context(|| format!("failed to encode session record for game {game_id}"))?;
        let mut conn = self.connection().await?;
        let applied: i64 = self
            .save_script
            .key(self.game_key(game_id))
            .key(self.version_key(game_id))
            .arg(payload)
            .arg(record.version)
            .invoke_async(&mut conn)
            .await
            .with_context(|| format!("failed to save game {game_id}"))?;
        Ok(applied == 1)
    }

    async fn remove(&self, game_id: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(vec![self.game_key(game_id), self.version_key(game_id)])
            .await
            .with_context(|| format!("failed to remove game {game_id}"))?;
        Ok(())
    }
}
