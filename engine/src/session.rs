//! Turn state machine.
//!
//! Each operation is one read-modify-conditional-write against the injected
//! store. There is no in-process locking: `join_or_create` relies on the
//! store's set-if-absent, and every record mutation bumps the version and is
//! written conditionally, so a lost race surfaces as
//! [`SessionError::StoreConflict`] with nothing applied.

use crate::scoring::{self, ScoreError};
use crate::store::SessionStore;
use parkle_types::{
    dice::to_nested, GameId, SessionRecord, TurnPhase, DEFAULT_WIN_THRESHOLD, DICE_PER_TURN,
    MAX_FACE, MIN_FACE,
};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("player {player} is already in game {game_id}")]
    AlreadyInGame { player: String, game_id: GameId },
    #[error("player {player} is not the current player (current is {current})")]
    NotCurrentPlayer { player: String, current: String },
    #[error("cannot roll {n} dice, expected between 1 and {DICE_PER_TURN}")]
    InvalidCount { n: usize },
    #[error("kept dice {kept:?} are not part of the pending roll {pending:?}")]
    InvalidKeptSet { kept: Vec<u8>, pending: Vec<u8> },
    #[error("no dice in play for game {game_id}")]
    NoDiceInPlay { game_id: GameId },
    #[error("game {game_id} is already over")]
    GameOver { game_id: GameId },
    #[error("unknown game {game_id}")]
    UnknownGame { game_id: GameId },
    #[error("conflicting write to game {game_id}, retry the action")]
    StoreConflict { game_id: GameId },
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Engine tunables.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Banked score that ends the game once a turn rotation completes.
    pub win_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            win_threshold: DEFAULT_WIN_THRESHOLD,
        }
    }
}

/// Player choice after keeping dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnDecision {
    Bank,
    Continue,
}

/// Result of an accepted keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepOutcome {
    /// Points the submitted set was worth.
    pub set_points: u64,
    /// Turn-local total so far, including this set.
    pub running_points: u64,
}

/// The session lifecycle: join/create, roll, keep, bank or continue.
pub struct SessionEngine<S: SessionStore> {
    store: S,
    config: EngineConfig,
}

impl<S: SessionStore> SessionEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bind the player to `existing` (joining) or to a fresh session
    /// (creating), atomically against the store's binding table.
    ///
    /// A pre-existing binding is the caller's defect and surfaces as
    /// [`SessionError::AlreadyInGame`] carrying the bound game id. Losing the
    /// set-if-absent to a concurrent duplicate of this request instead
    /// resolves to whatever game the winner bound, so both calls agree.
    pub async fn join_or_create<R: Rng>(
        &self,
        rng: &mut R,
        player: &str,
        existing: Option<&str>,
    ) -> Result<GameId, SessionError> {
        if let Some(bound) = self.store.binding(player).await? {
            return Err(SessionError::AlreadyInGame {
                player: player.to_string(),
                game_id: bound,
            });
        }

        let game_id: GameId = match existing {
            Some(game) => game.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };

        if !self.store.bind_if_absent(player, &game_id).await? {
            return match self.store.binding(player).await? {
                Some(bound) => Ok(bound),
                // Binding vanished between the failed set and the re-read;
                // the caller retries the whole action.
                None => Err(SessionError::StoreConflict { game_id }),
            };
        }

        if existing.is_none() {
            let mut record = SessionRecord::new(player);
            record.pending_roll = roll_dice(rng, DICE_PER_TURN);
            record.phase = TurnPhase::AwaitingKeep;
            if !self.store.save(&game_id, &record).await? {
                self.store.unbind(player).await?;
                return Err(SessionError::StoreConflict { game_id });
            }
            tracing::info!(game = %game_id, player, "session created");
        } else {
            let Some(mut record) = self.store.load(&game_id).await? else {
                self.store.unbind(player).await?;
                return Err(SessionError::UnknownGame { game_id });
            };
            if record.phase == TurnPhase::GameOver {
                self.store.unbind(player).await?;
                return Err(SessionError::GameOver { game_id });
            }
            record.add_player(player);
            record.version += 1;
            if !self.store.save(&game_id, &record).await? {
                self.store.unbind(player).await?;
                return Err(SessionError::StoreConflict { game_id });
            }
            tracing::info!(game = %game_id, player, "player joined session");
        }

        Ok(game_id)
    }

    /// The game the player is currently bound to, if any. Pure read.
    pub async fn lookup_session(&self, player: &str) -> Result<Option<GameId>, SessionError> {
        Ok(self.store.binding(player).await?)
    }

    /// Whether `player` holds the turn, at this instant only. Callers that
    /// go on to mutate must expect [`SessionError::StoreConflict`] anyway.
    pub async fn is_current_player(
        &self,
        game_id: &str,
        player: &str,
    ) -> Result<bool, SessionError> {
        Ok(self
            .store
            .load(game_id)
            .await?
            .is_some_and(|record| record.current_player == player))
    }

    /// Roll `n` dice for the current player and persist them as the pending
    /// roll. The phase is not gated: rolling over a `Busted` marker is what
    /// starts the next player's turn.
    pub async fn roll<R: Rng>(
        &self,
        rng: &mut R,
        game_id: &str,
        player: &str,
        n: usize,
    ) -> Result<Vec<u8>, SessionError> {
        if n < 1 || n > DICE_PER_TURN {
            return Err(SessionError::InvalidCount { n });
        }
        let mut record = self.load_active(game_id).await?;
        ensure_current(&record, player)?;

        let dice = roll_dice(rng, n);
        record.pending_roll = dice.clone();
        record.phase = TurnPhase::AwaitingKeep;
        record.version += 1;
        self.save_or_conflict(game_id, &record).await?;
        tracing::debug!(game = %game_id, player, dice = ?dice, "rolled");
        Ok(dice)
    }

    /// Set aside a scoring sub-multiset of the pending roll. On any failure
    /// no state changes.
    pub async fn submit_kept_set(
        &self,
        game_id: &str,
        player: &str,
        kept: &[u8],
    ) -> Result<KeepOutcome, SessionError> {
        let mut record = self.load_active(game_id).await?;
        ensure_current(&record, player)?;
        if !is_sub_multiset(kept, &record.pending_roll) {
            return Err(SessionError::InvalidKeptSet {
                kept: kept.to_vec(),
                pending: record.pending_roll.clone(),
            });
        }

        let set_points = scoring::score(kept)?;
        remove_kept(&mut record.pending_roll, kept);
        record.running_points += set_points;
        record.version += 1;
        self.save_or_conflict(game_id, &record).await?;
        tracing::debug!(
            game = %game_id,
            player,
            kept = ?kept,
            set_points,
            running_points = record.running_points,
            "kept set accepted"
        );
        Ok(KeepOutcome {
            set_points,
            running_points: record.running_points,
        })
    }

    /// Bank the turn's running points, or re-roll the remaining dice.
    ///
    /// A continue re-rolls the pending die count; when the re-roll has no
    /// scoring potential the turn auto-busts: running points are discarded
    /// and the turn advances. Returns the updated record as a snapshot.
    pub async fn decide<R: Rng>(
        &self,
        rng: &mut R,
        game_id: &str,
        player: &str,
        decision: TurnDecision,
    ) -> Result<SessionRecord, SessionError> {
        let mut record = self.load_active(game_id).await?;
        ensure_current(&record, player)?;

        match decision {
            TurnDecision::Bank => {
                let banked = record.running_points;
                settle_bank(&mut record, self.config.win_threshold);
                record.version += 1;
                self.save_or_conflict(game_id, &record).await?;
                tracing::info!(game = %game_id, player, banked, "turn banked");
            }
            TurnDecision::Continue => {
                if record.pending_roll.is_empty() {
                    return Err(SessionError::NoDiceInPlay {
                        game_id: game_id.to_string(),
                    });
                }
                let reroll = roll_dice(rng, record.pending_roll.len());
                let busted = settle_continue(&mut record, reroll, self.config.win_threshold);
                record.version += 1;
                self.save_or_conflict(game_id, &record).await?;
                if busted {
                    tracing::info!(game = %game_id, player, "turn busted");
                }
            }
        }

        if record.phase == TurnPhase::GameOver {
            self.clear_bindings(&record).await?;
            tracing::info!(game = %game_id, "game over");
        }
        Ok(record)
    }

    /// Whether the session has reached its terminal state. Re-derives the
    /// win condition at a rotation boundary and performs the transition
    /// idempotently, including clearing every participant's binding.
    pub async fn check_game_over(&self, game_id: &str) -> Result<bool, SessionError> {
        let Some(mut record) = self.store.load(game_id).await? else {
            return Err(SessionError::UnknownGame {
                game_id: game_id.to_string(),
            });
        };
        if record.phase == TurnPhase::GameOver {
            self.clear_bindings(&record).await?;
            return Ok(true);
        }

        let at_rotation_boundary = matches!(
            record.phase,
            TurnPhase::AwaitingRoll | TurnPhase::Busted
        ) && record
            .scores
            .first()
            .is_some_and(|(first, _)| record.current_player == *first);
        if at_rotation_boundary && record.highest_score() >= self.config.win_threshold {
            record.phase = TurnPhase::GameOver;
            record.pending_roll.clear();
            record.version += 1;
            self.save_or_conflict(game_id, &record).await?;
            self.clear_bindings(&record).await?;
            tracing::info!(game = %game_id, "game over");
            return Ok(true);
        }
        Ok(false)
    }

    async fn load_active(&self, game_id: &str) -> Result<SessionRecord, SessionError> {
        let Some(record) = self.store.load(game_id).await? else {
            return Err(SessionError::UnknownGame {
                game_id: game_id.to_string(),
            });
        };
        if record.phase == TurnPhase::GameOver {
            return Err(SessionError::GameOver {
                game_id: game_id.to_string(),
            });
        }
        Ok(record)
    }

    async fn save_or_conflict(
        &self,
        game_id: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionError> {
        if !self.store.save(game_id, record).await? {
            return Err(SessionError::StoreConflict {
                game_id: game_id.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_bindings(&self, record: &SessionRecord) -> Result<(), SessionError> {
        for (player, _) in &record.scores {
            self.store.unbind(player).await?;
        }
        Ok(())
    }
}

fn ensure_current(record: &SessionRecord, player: &str) -> Result<(), SessionError> {
    if record.current_player != player {
        return Err(SessionError::NotCurrentPlayer {
            player: player.to_string(),
            current: record.current_player.clone(),
        });
    }
    Ok(())
}

fn roll_dice<R: Rng>(rng: &mut R, n: usize) -> Vec<u8> {
    (0..n).map(|_| rng.gen_range(MIN_FACE..=MAX_FACE)).collect()
}

fn is_sub_multiset(kept: &[u8], pending: &[u8]) -> bool {
    let mut counts = [0isize; 7];
    for &die in pending {
        if let Some(slot) = counts.get_mut(die as usize) {
            *slot += 1;
        }
    }
    for &die in kept {
        match counts.get_mut(die as usize) {
            Some(slot) => {
                *slot -= 1;
                if *slot < 0 {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

/// Remove one pending die per kept die, preserving the order of the rest.
fn remove_kept(pending: &mut Vec<u8>, kept: &[u8]) {
    for &die in kept {
        if let Some(position) = pending.iter().position(|&d| d == die) {
            pending.remove(position);
        }
    }
}

/// Commit the running points and rotate the turn. The game ends when the
/// rotation wraps and a banked score has reached the threshold, so every
/// player gets an equal number of turns.
fn settle_bank(record: &mut SessionRecord, win_threshold: u64) {
    record.bank_running_points();
    record.pending_roll.clear();
    let wrapped = record.advance_turn();
    record.phase = if wrapped && record.highest_score() >= win_threshold {
        TurnPhase::GameOver
    } else {
        TurnPhase::AwaitingRoll
    };
}

/// Apply a continue re-roll. Returns true when the turn busted: the re-roll
/// offered no scoring potential, the running points are forfeited, and the
/// turn advances. The dead dice stay visible on the record.
fn settle_continue(record: &mut SessionRecord, reroll: Vec<u8>, win_threshold: u64) -> bool {
    let busted = !scoring::has_remaining_potential(&to_nested(&reroll));
    record.pending_roll = reroll;
    if !busted {
        record.phase = TurnPhase::AwaitingKeep;
        return false;
    }
    record.running_points = 0;
    let wrapped = record.advance_turn();
    record.phase = if wrapped && record.highest_score() >= win_threshold {
        TurnPhase::GameOver
    } else {
        TurnPhase::Busted
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sub_multiset() {
        assert!(is_sub_multiset(&[1, 1], &[1, 1, 5, 6]));
        assert!(is_sub_multiset(&[], &[1, 2]));
        assert!(is_sub_multiset(&[5, 1], &[1, 5]));

        assert!(!is_sub_multiset(&[1, 1, 1], &[1, 1, 5]));
        assert!(!is_sub_multiset(&[2], &[1, 1]));
        assert!(!is_sub_multiset(&[1], &[]));
    }

    #[test]
    fn test_remove_kept() {
        let mut pending = vec![1, 3, 1, 5, 3, 6];
        remove_kept(&mut pending, &[1, 1, 5]);
        assert_eq!(pending, vec![3, 3, 6]);
    }

    #[test]
    fn test_settle_bank_rotates_and_commits() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.running_points = 650;
        record.pending_roll = vec![2, 3];

        settle_bank(&mut record, 10_000);
        assert_eq!(record.score_of("alice"), Some(650));
        assert_eq!(record.running_points, 0);
        assert!(record.pending_roll.is_empty());
        assert_eq!(record.current_player, "bob");
        assert_eq!(record.phase, TurnPhase::AwaitingRoll);
    }

    #[test]
    fn test_settle_bank_ends_game_on_wrapped_rotation() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.scores[0].1 = 9_900;
        record.current_player = "bob".to_string();
        record.running_points = 0;

        // Bob banks nothing; the rotation wraps and alice has won.
        settle_bank(&mut record, 10_000);
        assert_eq!(record.phase, TurnPhase::AwaitingRoll);

        record.scores[0].1 = 10_200;
        record.current_player = "bob".to_string();
        settle_bank(&mut record, 10_000);
        assert_eq!(record.phase, TurnPhase::GameOver);
    }

    #[test]
    fn test_settle_continue_keeps_live_reroll() {
        let mut record = SessionRecord::new("alice");
        record.running_points = 300;

        let busted = settle_continue(&mut record, vec![2, 3, 5], 10_000);
        assert!(!busted);
        assert_eq!(record.pending_roll, vec![2, 3, 5]);
        assert_eq!(record.running_points, 300);
        assert_eq!(record.phase, TurnPhase::AwaitingKeep);
        assert_eq!(record.current_player, "alice");
    }

    #[test]
    fn test_settle_continue_busts_dead_reroll() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.running_points = 300;

        // No 1s or 5s, no triple, fewer than three pairs.
        let busted = settle_continue(&mut record, vec![2, 2, 3], 10_000);
        assert!(busted);
        assert_eq!(record.running_points, 0);
        assert_eq!(record.current_player, "bob");
        assert_eq!(record.phase, TurnPhase::Busted);
        // The dead dice stay visible on the snapshot.
        assert_eq!(record.pending_roll, vec![2, 2, 3]);
    }
}
