//! Parkle domain types.
//!
//! Defines the dice multiset representations, scoring categories, payout
//! constants, and session/turn state shared by the engine and the store
//! backends.

pub mod category;
pub mod constants;
pub mod dice;
pub mod session;

pub use category::Category;
pub use constants::*;
pub use dice::{parse_dice, to_flat, to_nested, validate_range, DiceRangeError};
pub use session::{GameId, PlayerId, SessionRecord, TurnPhase};
