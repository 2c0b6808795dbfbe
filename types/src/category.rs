//! Whole-set scoring categories.
//!
//! A category is determined purely from the set length, the unique-face
//! count, and the per-face counts. Sets that do not match a whole-set
//! category classify as [`Category::NonScoring`]; the engine may still score
//! them by decomposition.

/// Classification of a kept dice set taken as a whole.
///
/// The order of the length-6 checks in [`Category::of`] matters: the checks
/// are strictly ordered and must match the scoring precedence (six of a
/// kind, two triplets, straight, three pair, four plus pair).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    SixOfAKind,
    TwoTriplets,
    Straight1To6,
    ThreePair,
    FourOfAKindPlusPair,
    FiveOfAKind,
    FourOfAKind,
    ThreeOfAKind,
    SingleOneOrFive,
    NonScoring,
}

impl Category {
    /// Classify a nested dice set.
    pub fn of(nested: &[(u8, u8)]) -> Self {
        let len: u8 = nested.iter().map(|&(_, count)| count).sum();
        let unique = nested.len();
        match len {
            6 => {
                if unique == 1 {
                    Self::SixOfAKind
                } else if unique == 2 && nested.iter().all(|&(_, count)| count == 3) {
                    Self::TwoTriplets
                } else if unique == 6 {
                    Self::Straight1To6
                } else if unique == 3 && nested.iter().all(|&(_, count)| count == 2) {
                    Self::ThreePair
                } else if unique == 2 && nested.iter().any(|&(_, count)| count == 4) {
                    Self::FourOfAKindPlusPair
                } else {
                    Self::NonScoring
                }
            }
            5 if unique == 1 => Self::FiveOfAKind,
            4 if unique == 1 => Self::FourOfAKind,
            3 if unique == 1 => Self::ThreeOfAKind,
            1 if matches!(nested[0].0, 1 | 5) => Self::SingleOneOrFive,
            _ => Self::NonScoring,
        }
    }
}
