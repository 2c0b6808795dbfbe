//! Game constants. Payout values are fixed by the rules and must match the
//! scoring tests exactly.

/// Lowest die face.
pub const MIN_FACE: u8 = 1;

/// Highest die face.
pub const MAX_FACE: u8 = 6;

/// Dice rolled at the start of every turn.
pub const DICE_PER_TURN: usize = 6;

/// Six of a kind.
pub const SIX_OF_A_KIND_POINTS: u64 = 3000;

/// Two distinct triplets in one 6-die set.
pub const TWO_TRIPLETS_POINTS: u64 = 2500;

/// Five of a kind.
pub const FIVE_OF_A_KIND_POINTS: u64 = 2000;

/// Straight 1-6.
pub const STRAIGHT_POINTS: u64 = 1500;

/// Three distinct pairs.
pub const THREE_PAIR_POINTS: u64 = 1500;

/// Four of a kind plus a pair.
pub const FOUR_PLUS_PAIR_POINTS: u64 = 1500;

/// Four of a kind.
pub const FOUR_OF_A_KIND_POINTS: u64 = 1000;

/// Three ones score 300, not the 100 the face-value rule would give.
pub const TRIPLE_ONES_POINTS: u64 = 300;

/// A lone 1.
pub const SINGLE_ONE_POINTS: u64 = 100;

/// A lone 5.
pub const SINGLE_FIVE_POINTS: u64 = 50;

/// Default banked score a player must reach to end the game.
pub const DEFAULT_WIN_THRESHOLD: u64 = 10_000;
