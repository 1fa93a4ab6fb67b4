use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::rating::Dimension;
use crate::toilet::{CommentSubmission, NewToilet, Toilet};

/// The record store. Implementations must serialize mutations so that
/// every operation is atomic relative to the others.
pub trait Db {
    /// Every toilet, in creation order.
    fn list(&self) -> BoxFuture<Result<Vec<Toilet>, BackendError>>;

    /// Stores a new toilet under a fresh ID and returns it.
    fn create(&self, submission: NewToilet) -> BoxFuture<Result<Toilet, BackendError>>;

    /// Adds a comment, and any valid scores it carries, to the toilet
    /// with the given ID. Returns the dimensions that were scored.
    fn add_comment(
        &self,
        id: &str,
        submission: CommentSubmission,
    ) -> BoxFuture<Result<Vec<Dimension>, BackendError>>;
}

pub use self::memory::*;

mod memory {
    use std::sync::RwLock;

    use futures::future::{BoxFuture, FutureExt};

    use crate::errors::BackendError;
    use crate::rating::Dimension;
    use crate::timestamp;
    use crate::toilet::{Comment, CommentSubmission, NewToilet, Toilet};

    /// A store that keeps its toilets in process memory. Everything is
    /// lost when the process exits.
    #[derive(Debug, Default)]
    pub struct MemoryDb {
        toilets: RwLock<Vec<Toilet>>,
    }

    impl MemoryDb {
        pub fn new() -> Self {
            MemoryDb::default()
        }

        fn list_now(&self) -> Result<Vec<Toilet>, BackendError> {
            let toilets = self
                .toilets
                .read()
                .map_err(|_| BackendError::StorePoisoned)?;

            Ok(toilets.clone())
        }

        fn create_now(&self, submission: NewToilet) -> Result<Toilet, BackendError> {
            let toilet = Toilet::from_submission(submission);

            let mut toilets = self
                .toilets
                .write()
                .map_err(|_| BackendError::StorePoisoned)?;
            toilets.push(toilet.clone());

            Ok(toilet)
        }

        fn add_comment_now(
            &self,
            id: &str,
            submission: CommentSubmission,
        ) -> Result<Vec<Dimension>, BackendError> {
            let mut toilets = self
                .toilets
                .write()
                .map_err(|_| BackendError::StorePoisoned)?;

            let toilet = toilets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| BackendError::NonExistentId(id.to_owned()))?;

            let CommentSubmission {
                text,
                timestamp,
                ratings,
            } = submission;

            let comment = Comment::new(
                text.unwrap_or_default(),
                timestamp.unwrap_or_else(timestamp::now),
            );

            Ok(toilet.apply(comment, &ratings.unwrap_or_default()))
        }
    }

    // none of these operations await while holding the lock
    impl super::Db for MemoryDb {
        fn list(&self) -> BoxFuture<Result<Vec<Toilet>, BackendError>> {
            let result = self.list_now();

            async move { result }.boxed()
        }

        fn create(&self, submission: NewToilet) -> BoxFuture<Result<Toilet, BackendError>> {
            let result = self.create_now(submission);

            async move { result }.boxed()
        }

        fn add_comment(
            &self,
            id: &str,
            submission: CommentSubmission,
        ) -> BoxFuture<Result<Vec<Dimension>, BackendError>> {
            let result = self.add_comment_now(id, submission);

            async move { result }.boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use futures::executor::block_on;
    use proptest::prelude::*;
    use serde_json::json;

    use super::{Db, MemoryDb};
    use crate::errors::BackendError;
    use crate::rating::Dimension;
    use crate::toilet::{CommentSubmission, NewToilet, Toilet};

    fn new_toilet(name: &str, ratings: serde_json::Value) -> NewToilet {
        serde_json::from_value(json!({
            "name": name,
            "lat": 1.0,
            "lng": 2.0,
            "address": "X",
            "summary": "Y",
            "comments": [],
            "ratings": ratings,
            "createdAt": "2024-01-01T00:00:00"
        }))
        .expect("parse new toilet")
    }

    fn comment(body: serde_json::Value) -> CommentSubmission {
        serde_json::from_value(body).expect("parse comment")
    }

    fn totals(toilets: &[Toilet]) -> (usize, usize, usize) {
        (
            toilets.len(),
            toilets.iter().map(|t| t.comments().len()).sum(),
            toilets
                .iter()
                .flat_map(|t| Dimension::ALL.iter().map(move |&d| t.ratings().series(d).len()))
                .sum(),
        )
    }

    #[test]
    fn empty_store_lists_nothing() {
        let db = MemoryDb::new();

        assert!(block_on(db.list()).unwrap().is_empty());
    }

    #[test]
    fn listing_preserves_creation_order() {
        let db = MemoryDb::new();

        let created: Vec<Toilet> = ["R1", "R2", "R3"]
            .iter()
            .map(|name| block_on(db.create(new_toilet(name, json!({})))).unwrap())
            .collect();

        assert_eq!(block_on(db.list()).unwrap(), created);
    }

    #[test]
    fn missing_dimensions_start_at_zero() {
        let db = MemoryDb::new();

        let toilet = block_on(db.create(new_toilet("A", json!({ "cleanliness": 4 })))).unwrap();

        assert_eq!(toilet.ratings().series(Dimension::Cleanliness), &[4]);
        assert_eq!(toilet.ratings().series(Dimension::Accessibility), &[0]);
        assert_eq!(toilet.ratings().series(Dimension::Crowd), &[0]);
    }

    #[test]
    fn invalid_scores_are_dropped_per_dimension() {
        let db = MemoryDb::new();
        let toilet = block_on(db.create(new_toilet("A", json!({ "cleanliness": 2 })))).unwrap();

        let rated = block_on(db.add_comment(
            toilet.id(),
            comment(json!({
                "text": "ok",
                "ratings": { "cleanliness": 5, "crowd": 7, "accessibility": "bad" }
            })),
        ))
        .unwrap();

        assert_eq!(rated, vec![Dimension::Cleanliness]);

        let toilets = block_on(db.list()).unwrap();
        let ratings = toilets[0].ratings();
        assert_eq!(ratings.series(Dimension::Cleanliness), &[2, 5]);
        assert_eq!(ratings.series(Dimension::Accessibility), &[0]);
        assert_eq!(ratings.series(Dimension::Crowd), &[0]);
    }

    #[test]
    fn comment_fields_default() {
        let db = MemoryDb::new();
        let toilet = block_on(db.create(new_toilet("A", json!({})))).unwrap();

        block_on(db.add_comment(toilet.id(), comment(json!({})))).unwrap();
        block_on(db.add_comment(
            toilet.id(),
            comment(json!({ "text": "hi", "timestamp": "whenever" })),
        ))
        .unwrap();

        let toilets = block_on(db.list()).unwrap();
        let comments = toilets[0].comments();
        assert_eq!(comments[0].text(), "");
        assert!(comments[0].timestamp().starts_with("20"));
        assert_eq!(comments[1].text(), "hi");
        assert_eq!(comments[1].timestamp(), "whenever");
    }

    #[test]
    fn unknown_ids_change_nothing() {
        let db = MemoryDb::new();
        let toilet = block_on(db.create(new_toilet("A", json!({ "crowd": 1 })))).unwrap();
        block_on(db.add_comment(toilet.id(), comment(json!({ "ratings": { "crowd": 2 } })))).unwrap();

        let before = totals(&block_on(db.list()).unwrap());

        let result = block_on(db.add_comment(
            "never-issued",
            comment(json!({ "text": "lost", "ratings": { "crowd": 3 } })),
        ));

        match result {
            Err(BackendError::NonExistentId(id)) => assert_eq!(id, "never-issued"),
            other => panic!("expected NonExistentId, got {:?}", other),
        }
        assert_eq!(totals(&block_on(db.list()).unwrap()), before);
    }

    #[test]
    fn listed_toilets_are_copies() {
        let db = MemoryDb::new();
        block_on(db.create(new_toilet("A", json!({})))).unwrap();

        let mut listed = block_on(db.list()).unwrap();
        listed[0].comments.clear();
        listed[0].name = "changed".to_owned();
        listed.clear();

        let toilets = block_on(db.list()).unwrap();
        assert_eq!(toilets.len(), 1);
        assert_eq!(toilets[0].name(), "A");
    }

    #[test]
    fn concurrent_writers_are_serialized() {
        const WRITERS: usize = 8;
        const CREATES_PER_WRITER: usize = 50;

        let db = Arc::new(MemoryDb::new());
        let shared = block_on(db.create(new_toilet("shared", json!({})))).unwrap();

        let writers: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let db = db.clone();
                let shared_id = shared.id().to_owned();

                thread::spawn(move || {
                    for i in 0..CREATES_PER_WRITER {
                        let name = format!("{}-{}", writer, i);
                        let toilet = block_on(db.create(new_toilet(&name, json!({})))).unwrap();

                        block_on(db.add_comment(toilet.id(), comment(json!({ "text": name }))))
                            .unwrap();
                        block_on(db.add_comment(
                            &shared_id,
                            comment(json!({ "ratings": { "crowd": 3 } })),
                        ))
                        .unwrap();
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().expect("join writer thread");
        }

        let toilets = block_on(db.list()).unwrap();
        let ids: HashSet<&str> = toilets.iter().map(|t| t.id()).collect();

        assert_eq!(toilets.len(), 1 + WRITERS * CREATES_PER_WRITER);
        assert_eq!(ids.len(), toilets.len());
        assert_eq!(toilets[0].id(), shared.id());
        assert_eq!(toilets[0].comments().len(), WRITERS * CREATES_PER_WRITER);
        assert_eq!(
            toilets[0].ratings().series(Dimension::Crowd).len(),
            1 + WRITERS * CREATES_PER_WRITER
        );

        for toilet in &toilets[1..] {
            assert_eq!(toilet.comments().len(), 1);
            assert_eq!(toilet.comments()[0].text(), toilet.name());
        }
    }

    proptest! {
        #[test]
        fn ids_are_unique(count in 1usize..64) {
            let db = MemoryDb::new();

            for i in 0..count {
                block_on(db.create(new_toilet(&i.to_string(), json!({})))).unwrap();
            }

            let toilets = block_on(db.list()).unwrap();
            let ids: HashSet<&str> = toilets.iter().map(|t| t.id()).collect();

            prop_assert_eq!(ids.len(), count);
        }

        #[test]
        fn comments_and_series_only_grow(
            targets in proptest::collection::vec((0usize..3, 0i64..8), 0..40)
        ) {
            let db = MemoryDb::new();
            let ids: Vec<String> = (0..3)
                .map(|i| block_on(db.create(new_toilet(&i.to_string(), json!({})))).unwrap().id().to_owned())
                .collect();

            let mut expected_comments = [0usize; 3];
            let mut previous = block_on(db.list()).unwrap();

            for (target, score) in targets {
                block_on(db.add_comment(
                    &ids[target],
                    comment(json!({ "ratings": { "cleanliness": score, "crowd": score } })),
                ))
                .unwrap();
                expected_comments[target] += 1;

                let current = block_on(db.list()).unwrap();

                for (before, after) in previous.iter().zip(current.iter()) {
                    for &dimension in Dimension::ALL.iter() {
                        let before = before.ratings().series(dimension);
                        let after = after.ratings().series(dimension);

                        prop_assert!(after.len() >= before.len());
                        prop_assert_eq!(&after[..before.len()], before);
                    }
                }

                previous = current;
            }

            for (toilet, expected) in previous.iter().zip(expected_comments.iter()) {
                prop_assert_eq!(toilet.comments().len(), *expected);
            }
        }
    }
}
