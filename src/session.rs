//! Session-scoped rating collection.
//!
//! A [`Session`] owns every rating a user gives during one assessment. Ratings
//! are keyed by pillar name and question ordinal, so re-submitting a question
//! overwrites the earlier answer and unanswered questions read as zero.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;

pub const MIN_RATING: u8 = 0;
pub const MAX_RATING: u8 = 4;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("rating {0} is outside {MIN_RATING}..={MAX_RATING}")]
    OutOfRange(i64),

    #[error("unknown pillar '{0}'")]
    UnknownPillar(String),

    #[error("pillar '{pillar}' has no question {ordinal}")]
    UnknownQuestion { pillar: String, ordinal: usize },

    #[error("pillar '{pillar}' has {expected} questions but {got} ratings were given")]
    TooManyRatings {
        pillar: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to read answers: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse answers: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A 0–4 answer to one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const ZERO: Rating = Rating(MIN_RATING);
    pub const MAX: Rating = Rating(MAX_RATING);

    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_RATING).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = SessionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Rating::new)
            .ok_or(SessionError::OutOfRange(value))
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl From<Rating> for f64 {
    fn from(r: Rating) -> Self {
        f64::from(r.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a question within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingKey {
    pub pillar: String,
    pub ordinal: usize,
}

impl RatingKey {
    pub fn new(pillar: impl Into<String>, ordinal: usize) -> Self {
        Self {
            pillar: pillar.into(),
            ordinal,
        }
    }
}

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pillar, self.ordinal)
    }
}

/// Bulk answers, as read from an answers file: pillar name to ratings in
/// question order. Missing pillars and trailing questions stay at zero.
pub type Answers = HashMap<String, Vec<Rating>>;

pub fn load_answers(path: impl AsRef<Path>) -> Result<Answers, SessionError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&raw)?)
}

/// Ratings for one pillar, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PillarRatings {
    pub pillar: String,
    pub ratings: Vec<Rating>,
}

/// Ratings gathered during one assessment.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    catalog: &'a Catalog,
    ratings: HashMap<RatingKey, Rating>,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            ratings: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Record (or overwrite) the rating for one question.
    pub fn rate(&mut self, pillar: &str, ordinal: usize, rating: Rating) -> Result<(), SessionError> {
        let key = self.key_for(pillar, ordinal)?;
        self.ratings.insert(key, rating);
        Ok(())
    }

    /// Current rating for a question; unanswered questions are zero.
    pub fn rating(&self, pillar: &str, ordinal: usize) -> Result<Rating, SessionError> {
        let key = self.key_for(pillar, ordinal)?;
        Ok(self.ratings.get(&key).copied().unwrap_or_default())
    }

    pub fn answered(&self) -> usize {
        self.ratings.len()
    }

    pub fn apply_answers(&mut self, answers: &Answers) -> Result<(), SessionError> {
        // Validate everything first so a bad document leaves the session untouched.
        for (pillar, ratings) in answers {
            let expected = self
                .catalog
                .pillar(pillar)
                .ok_or_else(|| SessionError::UnknownPillar(pillar.clone()))?
                .len();
            if ratings.len() > expected {
                return Err(SessionError::TooManyRatings {
                    pillar: pillar.clone(),
                    expected,
                    got: ratings.len(),
                });
            }
        }

        for (pillar, ratings) in answers {
            for (idx, rating) in ratings.iter().enumerate() {
                self.ratings
                    .insert(RatingKey::new(pillar.as_str(), idx + 1), *rating);
            }
        }
        Ok(())
    }

    /// Ratings per pillar in catalog order, zero-filled.
    pub fn collect(&self) -> Vec<PillarRatings> {
        self.catalog
            .pillars()
            .iter()
            .map(|pillar| PillarRatings {
                pillar: pillar.name.clone(),
                ratings: pillar
                    .questions
                    .iter()
                    .map(|q| {
                        self.ratings
                            .get(&RatingKey::new(pillar.name.as_str(), q.ordinal))
                            .copied()
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect()
    }

    fn key_for(&self, pillar: &str, ordinal: usize) -> Result<RatingKey, SessionError> {
        let p = self
            .catalog
            .pillar(pillar)
            .ok_or_else(|| SessionError::UnknownPillar(pillar.to_string()))?;
        if ordinal == 0 || ordinal > p.len() {
            return Err(SessionError::UnknownQuestion {
                pillar: pillar.to_string(),
                ordinal,
            });
        }
        Ok(RatingKey::new(pillar, ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_some());
        assert!(Rating::new(4).is_some());
        assert!(Rating::new(5).is_none());
        assert!(Rating::try_from(-1i64).is_err());
    }

    #[test]
    fn rating_deserialize_rejects_out_of_range() {
        let ok: Vec<Rating> = serde_json::from_str("[0, 4]").unwrap();
        assert_eq!(ok, vec![Rating::ZERO, Rating::MAX]);
        assert!(serde_json::from_str::<Vec<Rating>>("[5]").is_err());
        assert!(serde_json::from_str::<Vec<Rating>>("[-2]").is_err());
    }

    #[test]
    fn unset_questions_default_to_zero() {
        let catalog = Catalog::builtin();
        let session = Session::new(&catalog);
        let collected = session.collect();
        assert_eq!(collected.len(), 6);
        assert!(collected
            .iter()
            .all(|p| p.ratings.iter().all(|r| *r == Rating::ZERO)));
    }

    #[test]
    fn resubmission_overwrites() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        session.rate("4. Model Layer", 2, r(1)).unwrap();
        session.rate("4. Model Layer", 2, r(3)).unwrap();
        assert_eq!(session.rating("4. Model Layer", 2).unwrap(), r(3));
        assert_eq!(session.answered(), 1);
        assert_eq!(session.collect()[3].ratings, vec![r(0), r(3), r(0), r(0), r(0)]);
    }

    #[test]
    fn rejects_unknown_pillar_and_ordinal() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(matches!(
            session.rate("7. Nope", 1, r(1)),
            Err(SessionError::UnknownPillar(_))
        ));
        assert!(matches!(
            session.rate("4. Model Layer", 0, r(1)),
            Err(SessionError::UnknownQuestion { .. })
        ));
        assert!(matches!(
            session.rate("4. Model Layer", 6, r(1)),
            Err(SessionError::UnknownQuestion { .. })
        ));
    }

    #[test]
    fn apply_answers_is_all_or_nothing() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        let mut answers = Answers::new();
        answers.insert("1. Infrastructure Layer".into(), vec![r(2)]);
        answers.insert("2. Orchestration Layer".into(), vec![r(1); 6]);

        let err = session.apply_answers(&answers).unwrap_err();
        assert!(matches!(err, SessionError::TooManyRatings { expected: 5, got: 6, .. }));
        assert_eq!(session.answered(), 0);
    }

    #[test]
    fn key_renders_like_widget_id() {
        assert_eq!(RatingKey::new("4. Model Layer", 3).to_string(), "4. Model Layer_3");
    }
}
