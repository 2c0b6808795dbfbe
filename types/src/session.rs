//! Session and turn state.
//!
//! A [`SessionRecord`] is the full persisted state of one game. It is the
//! unit of optimistic concurrency: every mutation bumps `version` and is
//! written conditionally on the stored version.

use serde::{Deserialize, Serialize};

/// Opaque, pre-validated player identifier.
pub type PlayerId = String;

/// Generated game identifier token.
pub type GameId = String;

/// Where the active turn currently stands.
///
/// `Busted` is transient: the turn has already advanced, and the next roll
/// replaces it with `AwaitingKeep`. `GameOver` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingRoll,
    AwaitingKeep,
    Busted,
    GameOver,
}

/// Persisted per-session state.
///
/// `scores` doubles as the membership list; entry order is join order, which
/// is also the turn rotation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub current_player: PlayerId,
    pub pending_roll: Vec<u8>,
    pub scores: Vec<(PlayerId, u64)>,
    pub running_points: u64,
    pub phase: TurnPhase,
    pub version: u64,
}

impl SessionRecord {
    /// Fresh session with the creator as the only member and current player.
    pub fn new(creator: &str) -> Self {
        Self {
            current_player: creator.to_string(),
            pending_roll: Vec::new(),
            scores: vec![(creator.to_string(), 0)],
            running_points: 0,
            phase: TurnPhase::AwaitingRoll,
            version: 1,
        }
    }

    pub fn is_member(&self, player: &str) -> bool {
        self.scores.iter().any(|(p, _)| p == player)
    }

    /// Add a player with a zero score. No-op if already a member.
    pub fn add_player(&mut self, player: &str) {
        if !self.is_member(player) {
            self.scores.push((player.to_string(), 0));
        }
    }

    pub fn score_of(&self, player: &str) -> Option<u64> {
        self.scores
            .iter()
            .find(|(p, _)| p == player)
            .map(|&(_, score)| score)
    }

    /// Commit the turn's running points to the current player's banked score.
    pub fn bank_running_points(&mut self) {
        if let Some(entry) = self
            .scores
            .iter_mut()
            .find(|(p, _)| p == &self.current_player)
        {
            entry.1 += self.running_points;
        }
        self.running_points = 0;
    }

    /// Rotate `current_player` to the next member in join order.
    ///
    /// Returns true if the rotation wrapped back to the first joiner, i.e.
    /// every member has now had an equal number of turns.
    pub fn advance_turn(&mut self) -> bool {
        let position = self
            .scores
            .iter()
            .position(|(p, _)| p == &self.current_player)
            .unwrap_or(0);
        let next = (position + 1) % self.scores.len();
        self.current_player = self.scores[next].0.clone();
        next == 0
    }

    pub fn highest_score(&self) -> u64 {
        self.scores.iter().map(|&(_, score)| score).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = SessionRecord::new("alice");
        assert_eq!(record.current_player, "alice");
        assert_eq!(record.scores, vec![("alice".to_string(), 0)]);
        assert_eq!(record.phase, TurnPhase::AwaitingRoll);
        assert_eq!(record.version, 1);
        assert!(record.pending_roll.is_empty());
    }

    #[test]
    fn test_membership_and_scores() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.add_player("bob");
        assert_eq!(record.scores.len(), 2);
        assert!(record.is_member("bob"));
        assert_eq!(record.score_of("bob"), Some(0));
        assert_eq!(record.score_of("carol"), None);
    }

    #[test]
    fn test_banking_running_points() {
        let mut record = SessionRecord::new("alice");
        record.running_points = 450;
        record.bank_running_points();
        assert_eq!(record.score_of("alice"), Some(450));
        assert_eq!(record.running_points, 0);
    }

    #[test]
    fn test_rotation_is_join_order() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.add_player("carol");

        assert!(!record.advance_turn());
        assert_eq!(record.current_player, "bob");
        assert!(!record.advance_turn());
        assert_eq!(record.current_player, "carol");
        // Wrap back to the first joiner completes the rotation.
        assert!(record.advance_turn());
        assert_eq!(record.current_player, "alice");
    }

    #[test]
    fn test_record_json_roundtrip() {
        let mut record = SessionRecord::new("alice");
        record.add_player("bob");
        record.pending_roll = vec![1, 3, 3, 5, 6, 6];
        record.phase = TurnPhase::AwaitingKeep;
        record.version = 7;

        let encoded = serde_json::to_string(&record).unwrap();
        assert!(encoded.contains("\"awaiting_keep\""));

        let decoded: SessionRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(record, decoded);
    }
}
