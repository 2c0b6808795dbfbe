const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_KEY_PREFIX: &str = "parkle:";

/// Connection settings for [`crate::RedisSessionStore`].
#[derive(Clone, Debug)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    pub url: String,
    /// Prefix applied to every key so multiple deployments can share an
    /// instance.
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}
