//! Parkle rules and session engine.
//!
//! Two components, built bottom-up:
//! - [`scoring`]: pure functions that classify and value a kept dice set,
//!   including the recursive decomposition rules for mixed sets.
//! - [`session`]: the turn state machine. It owns the game lifecycle
//!   (join/create, roll, keep, bank or continue, game over) and coordinates
//!   every cross-request mutation through the atomic primitives of an
//!   injected [`store::SessionStore`].
//!
//! ## Concurrency requirements
//! - No in-process locking spans requests; the store's set-if-absent and
//!   version-conditional write are the only coordination mechanism.
//! - Every operation is a single bounded store round trip and is
//!   all-or-nothing: a lost version race surfaces as
//!   [`session::SessionError::StoreConflict`] with no partial mutation.
//! - Dice randomness is injected per call, so callers can seed it for
//!   deterministic tests.

pub mod scoring;
pub mod session;
pub mod store;

pub use scoring::{has_remaining_potential, is_scoring_set, score, ScoreError};
pub use session::{
    EngineConfig, KeepOutcome, SessionEngine, SessionError, TurnDecision,
};
pub use store::SessionStore;

#[cfg(any(test, feature = "mocks"))]
pub use store::Memory;
