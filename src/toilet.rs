use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::rating::{self, Dimension, Score};

/// A single toilet in the store.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Toilet {
    /// The ID of the toilet, assigned by the store.
    pub(crate) id: String,

    pub(crate) name: String,

    /// The latitude. Not range-checked.
    pub(crate) lat: f64,

    /// The longitude. Not range-checked.
    pub(crate) lng: f64,

    pub(crate) address: String,

    pub(crate) summary: String,

    /// Comments in the order they were added.
    pub(crate) comments: Vec<Comment>,

    pub(crate) ratings: Ratings,

    /// The creation time as reported by the submitter.
    #[serde(rename = "createdAt")]
    pub(crate) created_at: String,
}

impl Toilet {
    /// Builds a toilet from a submission under a freshly generated ID.
    /// Any ID the submitter sent was already dropped during parsing.
    pub fn from_submission(submission: NewToilet) -> Self {
        let NewToilet {
            name,
            lat,
            lng,
            address,
            summary,
            comments,
            ratings,
            created_at,
        } = submission;

        Toilet {
            id: Uuid::new_v4().to_string(),
            name,
            lat,
            lng,
            address,
            summary,
            comments,
            ratings: Ratings::initial(&ratings),
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Appends the comment and every acceptable score it carries.
    /// Returns the dimensions that received a score.
    pub(crate) fn apply(&mut self, comment: Comment, ratings: &HashMap<String, Value>) -> Vec<Dimension> {
        self.comments.push(comment);

        let mut rated = vec![];

        for &dimension in Dimension::ALL.iter() {
            if let Some(score) = rating::accepted_score(ratings, dimension) {
                self.ratings.series_mut(dimension).push(score);
                rated.push(dimension);
            }
        }

        rated
    }
}

/// A comment left on a toilet.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Comment {
    pub(crate) text: String,

    /// Free-form; never parsed.
    pub(crate) timestamp: String,
}

impl Comment {
    pub fn new(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Comment {
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// The rating series of a toilet, one per dimension.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Ratings {
    pub(crate) cleanliness: Vec<Score>,
    pub(crate) accessibility: Vec<Score>,
    pub(crate) crowd: Vec<Score>,
}

impl Ratings {
    /// One sample per dimension, taken from `ratings` or defaulted.
    pub fn initial(ratings: &HashMap<String, Score>) -> Self {
        let mut initial = Ratings::default();

        for &dimension in Dimension::ALL.iter() {
            initial
                .series_mut(dimension)
                .push(rating::initial_score(ratings, dimension));
        }

        initial
    }

    pub fn series(&self, dimension: Dimension) -> &[Score] {
        match dimension {
            Dimension::Cleanliness => &self.cleanliness,
            Dimension::Accessibility => &self.accessibility,
            Dimension::Crowd => &self.crowd,
        }
    }

    fn series_mut(&mut self, dimension: Dimension) -> &mut Vec<Score> {
        match dimension {
            Dimension::Cleanliness => &mut self.cleanliness,
            Dimension::Accessibility => &mut self.accessibility,
            Dimension::Crowd => &mut self.crowd,
        }
    }
}

/// The body of a request to add a toilet.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewToilet {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub summary: String,
    pub comments: Vec<Comment>,

    /// Dimension name to initial score. Unknown names are ignored.
    pub ratings: HashMap<String, Score>,

    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// The body of a request to comment on a toilet. Every field is
/// optional; `ratings` values may be any JSON.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CommentSubmission {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub ratings: Option<HashMap<String, Value>>,
}
