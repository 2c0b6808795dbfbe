//! Dice multiset representations.
//!
//! A dice set is carried in two interchangeable forms:
//! - flat: a sequence of face values, e.g. `[3, 5, 5, 6, 6, 6]`
//! - nested: `(face, count)` pairs sorted ascending by face with zero
//!   counts omitted, e.g. `[(3, 1), (5, 2), (6, 3)]`
//!
//! Only the count per face is meaningful, but flat order is preserved where
//! it is given: the scorer's fallback decomposition splits sets by position.

use crate::constants::{DICE_PER_TURN, MAX_FACE, MIN_FACE};
use thiserror::Error;

/// A dice set that is structurally outside the rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceRangeError {
    #[error("dice set is empty, expected between 1 and {DICE_PER_TURN} dice")]
    Empty,
    #[error("dice set has {len} dice, expected no more than {DICE_PER_TURN}")]
    TooMany { len: usize },
    #[error("die face {face} must be between {MIN_FACE} and {MAX_FACE}")]
    FaceOutOfRange { face: u8 },
    #[error("unparseable die value {token:?}")]
    InvalidToken { token: String },
}

/// Count occurrences per face, ascending, omitting faces that do not occur.
pub fn to_nested(flat: &[u8]) -> Vec<(u8, u8)> {
    let mut nested = Vec::new();
    for face in MIN_FACE..=MAX_FACE {
        let count = flat.iter().filter(|&&d| d == face).count() as u8;
        if count > 0 {
            nested.push((face, count));
        }
    }
    nested
}

/// Expand `(face, count)` pairs back into a flat set.
pub fn to_flat(nested: &[(u8, u8)]) -> Vec<u8> {
    let mut flat = Vec::new();
    for &(face, count) in nested {
        for _ in 0..count {
            flat.push(face);
        }
    }
    flat
}

/// Validate set length (1 to 6) and that every face is a D6 value.
pub fn validate_range(dice: &[u8]) -> Result<(), DiceRangeError> {
    if dice.is_empty() {
        return Err(DiceRangeError::Empty);
    }
    if dice.len() > DICE_PER_TURN {
        return Err(DiceRangeError::TooMany { len: dice.len() });
    }
    for &face in dice {
        if !(MIN_FACE..=MAX_FACE).contains(&face) {
            return Err(DiceRangeError::FaceOutOfRange { face });
        }
    }
    Ok(())
}

/// Parse boundary dice input: a comma-separated list (`"1,2,3"`) or a bare
/// single face (`"5"`), validated against the D6 range.
pub fn parse_dice(input: &str) -> Result<Vec<u8>, DiceRangeError> {
    let mut dice = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let face: u8 = token.parse().map_err(|_| DiceRangeError::InvalidToken {
            token: token.to_string(),
        })?;
        dice.push(face);
    }
    validate_range(&dice)?;
    Ok(dice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_nested_known_sets() {
        let nested = to_nested(&[3, 5, 5, 6, 6, 6]);
        assert_eq!(nested, vec![(3, 1), (5, 2), (6, 3)]);

        let nested = to_nested(&[1, 2, 2, 2, 2, 2]);
        assert_eq!(nested, vec![(1, 1), (2, 5)]);

        assert!(to_nested(&[]).is_empty());
    }

    #[test]
    fn test_to_flat_known_sets() {
        // Nested input need not be sorted; expansion follows the given order.
        let flat = to_flat(&[(2, 4), (1, 1), (3, 1)]);
        assert_eq!(flat.len(), 6);

        let mut sorted = flat;
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 2, 2, 2, 3]);
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(validate_range(&[5]).is_ok());

        assert_eq!(validate_range(&[]), Err(DiceRangeError::Empty));
        assert_eq!(
            validate_range(&[1, 1, 1, 1, 1, 1, 1]),
            Err(DiceRangeError::TooMany { len: 7 })
        );
        assert_eq!(
            validate_range(&[2, 3, 4, 5, 6, 7]),
            Err(DiceRangeError::FaceOutOfRange { face: 7 })
        );
        assert_eq!(
            validate_range(&[0, 1]),
            Err(DiceRangeError::FaceOutOfRange { face: 0 })
        );
    }

    #[test]
    fn test_parse_dice() {
        assert_eq!(parse_dice("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_dice(" 1, 1 ,5").unwrap(), vec![1, 1, 5]);
        // Scalar shorthand for a one-element set.
        assert_eq!(parse_dice("5").unwrap(), vec![5]);

        assert_eq!(parse_dice(""), Err(DiceRangeError::Empty));
        assert_eq!(
            parse_dice("1,7"),
            Err(DiceRangeError::FaceOutOfRange { face: 7 })
        );
        assert_eq!(
            parse_dice("1,x"),
            Err(DiceRangeError::InvalidToken {
                token: "x".to_string()
            })
        );
    }

    proptest! {
        #[test]
        fn prop_nested_roundtrip(flat in proptest::collection::vec(1u8..=6, 0..=6)) {
            let roundtripped = to_flat(&to_nested(&flat));
            prop_assert_eq!(roundtripped.len(), flat.len());

            let mut expected = flat.clone();
            expected.sort_unstable();
            let mut actual = roundtripped;
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_valid_sets_pass_range_check(flat in proptest::collection::vec(1u8..=6, 1..=6)) {
            prop_assert!(validate_range(&flat).is_ok());
        }
    }
}
