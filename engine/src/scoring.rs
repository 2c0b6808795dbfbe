//! Kept-set scoring.
//!
//! A kept set of 1-6 dice is valued by first checking the whole-set
//! categories for its length, then decomposing into smaller sets and summing.
//! The category checks are strictly ordered; several categories can overlap
//! structurally for degenerate inputs, and the first match wins.
//!
//! Decomposition runs over an explicit work stack instead of recursing
//! per-length, but visits exactly the same sub-sets in the same way: each
//! popped set either scores as a whole or pushes its fragments, and any
//! fragment that cannot score fails the entire evaluation.
//!
//! The fallback split for an unmatched set is positional (first half / second
//! half of the submitted order), not canonical. A set like `[1, 2, 3, 4, 5, 6]`
//! matches the straight before ever reaching the split, but the split itself
//! is order-dependent and is kept that way deliberately.

use parkle_types::{
    dice::{to_nested, validate_range, DiceRangeError},
    Category, FIVE_OF_A_KIND_POINTS, FOUR_OF_A_KIND_POINTS, FOUR_PLUS_PAIR_POINTS,
    SINGLE_FIVE_POINTS, SINGLE_ONE_POINTS, SIX_OF_A_KIND_POINTS, STRAIGHT_POINTS,
    THREE_PAIR_POINTS, TRIPLE_ONES_POINTS, TWO_TRIPLETS_POINTS,
};
use thiserror::Error;

/// A kept set that cannot be scored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error(transparent)]
    Range(#[from] DiceRangeError),
    #[error("dice set {dice:?} contains non-scoring values")]
    NonScoring { dice: Vec<u8> },
}

/// Points for a triplet of `face`. Three ones are special-cased.
fn triplet_points(face: u8) -> u64 {
    if face == 1 {
        TRIPLE_ONES_POINTS
    } else {
        u64::from(face) * 100
    }
}

/// Points for a single die, if it scores at all.
fn single_points(face: u8) -> Option<u64> {
    match face {
        1 => Some(SINGLE_ONE_POINTS),
        5 => Some(SINGLE_FIVE_POINTS),
        _ => None,
    }
}

/// The face with exactly `count` occurrences, if any.
fn face_with_count(nested: &[(u8, u8)], count: u8) -> Option<u8> {
    nested
        .iter()
        .find(|&&(_, c)| c == count)
        .map(|&(face, _)| face)
}

/// Flatten every face in `nested` except `excluded`, ascending.
fn remainder_without(nested: &[(u8, u8)], excluded: u8) -> Vec<u8> {
    let mut rest = Vec::new();
    for &(face, count) in nested {
        if face == excluded {
            continue;
        }
        for _ in 0..count {
            rest.push(face);
        }
    }
    rest
}

/// Score a validated kept set of 1-6 dice.
///
/// Returns the total point value, or [`ScoreError::NonScoring`] naming the
/// fragment that has no value. Range defects are rejected up front.
pub fn score(kept: &[u8]) -> Result<u64, ScoreError> {
    validate_range(kept)?;

    let mut total: u64 = 0;
    let mut pending: Vec<Vec<u8>> = vec![kept.to_vec()];
    while let Some(set) = pending.pop() {
        total += score_one(&set, &mut pending)?;
    }
    Ok(total)
}

/// True iff the set would score; used to pre-validate a keep action without
/// propagating the computed value.
pub fn is_scoring_set(kept: &[u8]) -> bool {
    score(kept).is_ok()
}

/// Value one set as a whole, or push its fragments for later evaluation.
fn score_one(set: &[u8], pending: &mut Vec<Vec<u8>>) -> Result<u64, ScoreError> {
    let nested = to_nested(set);

    match Category::of(&nested) {
        Category::SixOfAKind => return Ok(SIX_OF_A_KIND_POINTS),
        Category::TwoTriplets => return Ok(TWO_TRIPLETS_POINTS),
        Category::Straight1To6 => return Ok(STRAIGHT_POINTS),
        Category::ThreePair => return Ok(THREE_PAIR_POINTS),
        Category::FourOfAKindPlusPair => return Ok(FOUR_PLUS_PAIR_POINTS),
        Category::FiveOfAKind => return Ok(FIVE_OF_A_KIND_POINTS),
        Category::FourOfAKind => return Ok(FOUR_OF_A_KIND_POINTS),
        Category::ThreeOfAKind => return Ok(triplet_points(nested[0].0)),
        Category::SingleOneOrFive | Category::NonScoring => {}
    }

    match set.len() {
        6 => {
            // No whole-set category: peel off the largest n-of-a-kind, or
            // fall back to a positional half split.
            if let Some(face) = face_with_count(&nested, 5) {
                pending.push(vec![face; 5]);
                pending.push(remainder_without(&nested, face));
            } else if let Some(face) = face_with_count(&nested, 4) {
                pending.push(vec![face; 4]);
                pending.push(remainder_without(&nested, face));
            } else if let Some(face) = face_with_count(&nested, 3) {
                pending.push(vec![face; 3]);
                pending.push(remainder_without(&nested, face));
            } else {
                pending.push(set[..3].to_vec());
                pending.push(set[3..].to_vec());
            }
            Ok(0)
        }
        5 => {
            if let Some(face) = face_with_count(&nested, 4) {
                pending.push(vec![face; 4]);
                pending.push(remainder_without(&nested, face));
            } else if let Some(face) = face_with_count(&nested, 3) {
                pending.push(vec![face; 3]);
                pending.push(remainder_without(&nested, face));
            } else {
                pending.push(set[..3].to_vec());
                pending.push(set[3..].to_vec());
            }
            Ok(0)
        }
        4 => {
            if let Some(face) = face_with_count(&nested, 3) {
                pending.push(vec![face; 3]);
                pending.push(remainder_without(&nested, face));
            } else {
                pending.push(set[..2].to_vec());
                pending.push(set[2..].to_vec());
            }
            Ok(0)
        }
        3 | 2 => {
            // Not a triplet: every die must score on its own.
            for &die in set {
                pending.push(vec![die]);
            }
            Ok(0)
        }
        1 => single_points(set[0]).ok_or_else(|| ScoreError::NonScoring {
            dice: set.to_vec(),
        }),
        _ => Err(ScoreError::NonScoring {
            dice: set.to_vec(),
        }),
    }
}

/// Whether the remaining (unkept) dice can still produce any score: a 1 or 5
/// present, any face with three or more occurrences, or three distinct pairs.
///
/// Used after a re-roll to decide between a legal continuation and a bust.
pub fn has_remaining_potential(nested: &[(u8, u8)]) -> bool {
    let mut pairs = 0;
    for &(face, count) in nested {
        if face == 1 || face == 5 {
            return true;
        }
        if count >= 3 {
            return true;
        }
        if count == 2 {
            pairs += 1;
        }
        if pairs == 3 {
            return true;
        }
    }
    false
}
