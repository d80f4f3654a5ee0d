//! Visitor reviews with threaded replies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use kinoteka_core::{DomainError, DomainResult, Entity, FieldErrors, MovieId, ReviewId};

use crate::email::Email;
use crate::fields::{required_text, MAX_CHAR_FIELD, MAX_REVIEW_TEXT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub email: Email,
    pub name: String,
    pub text: String,
    /// Parent review for replies; cleared when the parent is deleted.
    pub parent: Option<ReviewId>,
    pub movie: MovieId,
}

impl Review {
    pub fn new(id: ReviewId, new: NewReview) -> Self {
        Self {
            id,
            email: new.email,
            name: new.name,
            text: new.text,
            parent: new.parent,
            movie: new.movie,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn to_new(&self) -> NewReview {
        NewReview {
            email: self.email.clone(),
            name: self.name.clone(),
            text: self.text.clone(),
            parent: self.parent,
            movie: self.movie,
        }
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> ReviewId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub email: Email,
    pub name: String,
    pub text: String,
    pub parent: Option<ReviewId>,
    pub movie: MovieId,
}

/// Public review submission; the movie comes from the route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub parent: Option<ReviewId>,
    pub name: String,
    pub email: String,
    pub text: String,
}

impl ReviewForm {
    pub fn validate(self, movie: MovieId) -> DomainResult<NewReview> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_CHAR_FIELD);
        let email = errors.check("email", Email::parse(&self.email));
        let text = required_text(&mut errors, "text", &self.text, MAX_REVIEW_TEXT);

        let (Some(email), true) = (email, errors.is_empty()) else {
            return Err(DomainError::Validation(errors));
        };
        Ok(NewReview {
            email,
            name,
            text,
            parent: self.parent,
            movie,
        })
    }
}

/// Admin edit of a review. Submitter name and e-mail stay read-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewEdit {
    pub text: String,
    #[serde(default)]
    pub parent: Option<ReviewId>,
    pub movie: MovieId,
}

impl ReviewEdit {
    pub fn apply(self, existing: &Review) -> DomainResult<NewReview> {
        let mut errors = FieldErrors::new();
        let text = required_text(&mut errors, "text", &self.text, MAX_REVIEW_TEXT);
        if self.parent == Some(existing.id) {
            errors.add("parent", "a review cannot reply to itself");
        }
        errors.into_result()?;
        Ok(NewReview {
            email: existing.email.clone(),
            name: existing.name.clone(),
            text,
            parent: self.parent,
            movie: self.movie,
        })
    }
}

/// Replies nest at most this many levels below a root review. Deeper replies
/// are listed alongside the last reply that still fits.
pub const MAX_REPLY_DEPTH: usize = 8;

/// A review with its replies attached, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewThread {
    #[serde(flatten)]
    pub review: Review,
    pub replies: Vec<ReviewThread>,
}

impl ReviewThread {
    /// Attach `replies` (any depth) under `roots`, nesting no deeper than
    /// [`MAX_REPLY_DEPTH`]. Replies whose chain never reaches a root are
    /// dropped.
    pub fn build(roots: Vec<Review>, replies: Vec<Review>) -> Vec<ReviewThread> {
        let mut children: HashMap<ReviewId, Vec<Review>> = HashMap::new();
        for reply in replies {
            if let Some(parent) = reply.parent {
                children.entry(parent).or_default().push(reply);
            }
        }

        // Pre-order walk recording the review each node is shown under.
        let mut placed: Vec<(Review, Option<ReviewId>)> = Vec::new();
        let mut pending: Vec<(Review, Option<ReviewId>, usize)> =
            roots.into_iter().rev().map(|root| (root, None, 0)).collect();
        while let Some((review, host, depth)) = pending.pop() {
            if let Some(kids) = children.remove(&review.id) {
                let (kid_host, kid_depth) = if depth < MAX_REPLY_DEPTH {
                    (Some(review.id), depth + 1)
                } else {
                    (host, depth)
                };
                pending.extend(kids.into_iter().rev().map(|kid| (kid, kid_host, kid_depth)));
            }
            placed.push((review, host));
        }

        // Reverse pre-order sees every descendant before its host.
        let mut attached: HashMap<ReviewId, Vec<ReviewThread>> = HashMap::new();
        let mut threads = Vec::new();
        for (review, host) in placed.into_iter().rev() {
            let mut replies = attached.remove(&review.id).unwrap_or_default();
            replies.sort_by_key(|t| t.review.id);
            let thread = ReviewThread { review, replies };
            match host {
                Some(host) => attached.entry(host).or_default().push(thread),
                None => threads.push(thread),
            }
        }
        threads.reverse();
        threads
    }

    /// Number of reviews in this thread, the root included.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(thread) = stack.pop() {
            total += 1;
            stack.extend(&thread.replies);
        }
        total
    }

    /// Levels of replies below this review; zero when there are none.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((thread, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(thread.replies.iter().map(|r| (r, level + 1)));
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form(text: &str) -> ReviewForm {
        ReviewForm {
            parent: None,
            name: "Olena".into(),
            email: "olena@example.com".into(),
            text: text.into(),
        }
    }

    fn review(id: i64, parent: Option<i64>) -> Review {
        Review {
            id: ReviewId::new(id),
            email: Email::parse("a@example.com").unwrap(),
            name: "a".into(),
            text: "t".into(),
            parent: parent.map(ReviewId::new),
            movie: MovieId::new(1),
        }
    }

    #[test]
    fn accepts_text_at_the_bound() {
        let new = form(&"a".repeat(MAX_REVIEW_TEXT)).validate(MovieId::new(1)).unwrap();
        assert_eq!(new.text.chars().count(), MAX_REVIEW_TEXT);
    }

    #[test]
    fn rejects_text_over_the_bound() {
        let err = form(&"a".repeat(MAX_REVIEW_TEXT + 1))
            .validate(MovieId::new(1))
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains("text"));
    }

    #[test]
    fn rejects_malformed_email() {
        let err = ReviewForm {
            email: "not-an-email".into(),
            ..form("Great movie")
        }
        .validate(MovieId::new(1))
        .unwrap_err();
        assert!(err.field_errors().unwrap().contains("email"));
    }

    #[test]
    fn edit_keeps_name_and_email() {
        let existing = review(4, None);
        let new = ReviewEdit {
            text: "edited".into(),
            parent: None,
            movie: MovieId::new(2),
        }
        .apply(&existing)
        .unwrap();
        assert_eq!(new.name, existing.name);
        assert_eq!(new.email, existing.email);
        assert_eq!(new.text, "edited");
        assert_eq!(new.movie, MovieId::new(2));
    }

    #[test]
    fn edit_cannot_parent_itself() {
        let existing = review(4, None);
        let err = ReviewEdit {
            text: "x".into(),
            parent: Some(ReviewId::new(4)),
            movie: MovieId::new(1),
        }
        .apply(&existing)
        .unwrap_err();
        assert!(err.field_errors().unwrap().contains("parent"));
    }

    #[test]
    fn threads_nested_replies() {
        let roots = vec![review(1, None), review(2, None)];
        let replies = vec![review(5, Some(3)), review(3, Some(1)), review(4, Some(1))];

        let threads = ReviewThread::build(roots, replies);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].count(), 4);
        assert_eq!(threads[0].replies[0].review.id, ReviewId::new(3));
        assert_eq!(threads[0].replies[0].replies[0].review.id, ReviewId::new(5));
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn deep_reply_chains_are_flattened_at_the_depth_limit() {
        let chain: Vec<Review> = (2..=10_001).map(|id| review(id, Some(id - 1))).collect();

        let threads = ReviewThread::build(vec![review(1, None)], chain);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].count(), 10_001);
        assert_eq!(threads[0].depth(), MAX_REPLY_DEPTH);

        let mut host = &threads[0];
        for _ in 1..MAX_REPLY_DEPTH {
            assert_eq!(host.replies.len(), 1);
            host = &host.replies[0];
        }
        let tail = &host.replies;
        assert_eq!(tail.len(), 10_001 - MAX_REPLY_DEPTH);
        assert!(tail.windows(2).all(|w| w[0].review.id < w[1].review.id));
        assert!(tail.iter().all(|t| t.replies.is_empty()));

        let json = serde_json::to_value(&threads).unwrap();
        assert_eq!(json[0]["id"], 1);
    }

    #[test]
    fn replies_in_a_cycle_are_dropped() {
        let replies = vec![review(2, Some(3)), review(3, Some(2)), review(4, Some(1))];
        let threads = ReviewThread::build(vec![review(1, None)], replies);
        assert_eq!(threads[0].count(), 2);
    }

    proptest! {
        #[test]
        fn text_length_bound_is_exact(len in 1usize..6000) {
            let result = form(&"я".repeat(len)).validate(MovieId::new(1));
            prop_assert_eq!(result.is_ok(), len <= MAX_REVIEW_TEXT);
        }
    }
}
