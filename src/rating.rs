use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// A single rating sample.
pub type Score = i64;

/// The lowest score accepted alongside a comment.
pub const MIN_SCORE: Score = 1;

/// The highest score accepted alongside a comment.
pub const MAX_SCORE: Score = 5;

/// The score a new toilet gets for a dimension its submitter left out.
///
/// This lies outside `MIN_SCORE..=MAX_SCORE`. Clients averaging a
/// series see it as a real sample.
pub const MISSING_SCORE: Score = 0;

/// One of the fixed axes a toilet is rated on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dimension {
    Cleanliness,
    Accessibility,
    Crowd,
}

impl Dimension {
    /// Every dimension, in the order ratings are applied and serialized.
    pub const ALL: [Dimension; 3] = [
        Dimension::Cleanliness,
        Dimension::Accessibility,
        Dimension::Crowd,
    ];

    /// The key used for this dimension in JSON payloads.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Cleanliness => "cleanliness",
            Dimension::Accessibility => "accessibility",
            Dimension::Crowd => "crowd",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up the initial score for `dimension` in a creation payload.
pub fn initial_score(ratings: &HashMap<String, Score>, dimension: Dimension) -> Score {
    ratings
        .get(dimension.name())
        .copied()
        .unwrap_or(MISSING_SCORE)
}

/// Returns the score for `dimension` from a comment's loosely-typed
/// ratings, or `None` if it is absent, not an integer, or out of range.
pub fn accepted_score(ratings: &HashMap<String, Value>, dimension: Dimension) -> Option<Score> {
    ratings.get(dimension.name()).and_then(accept)
}

/// Accepts JSON integers in `MIN_SCORE..=MAX_SCORE`. Booleans, floats
/// (even `3.0`), strings and everything else are refused.
pub fn accept(value: &Value) -> Option<Score> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score)),
        _ => None,
    }
}
