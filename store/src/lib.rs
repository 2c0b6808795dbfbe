//! Redis backing for the session store.
//!
//! Implements [`parkle_engine::SessionStore`] on top of a shared Redis
//! instance: player bindings via `SET NX`, session records as JSON values
//! with a version counter checked server-side so concurrent writers cannot
//! interleave partial updates.

mod backend;
mod config;

pub use backend::RedisSessionStore;
pub use config::RedisStoreConfig;
