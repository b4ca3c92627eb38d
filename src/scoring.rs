//! Aggregation of ratings into pillar and overall scores, and the maturity
//! scale those scores are read against.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{PillarRatings, Rating, MAX_RATING};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("pillar '{0}' has no ratings")]
    EmptyPillar(String),

    #[error("no pillars to score")]
    NoPillars,
}

/// Maturity tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaturityLevel {
    #[serde(rename = "Not Started")]
    NotStarted,
    Pilot,
    Operational,
    Industrialized,
    Optimized,
}

impl MaturityLevel {
    pub const ALL: [MaturityLevel; 5] = [
        MaturityLevel::NotStarted,
        MaturityLevel::Pilot,
        MaturityLevel::Operational,
        MaturityLevel::Industrialized,
        MaturityLevel::Optimized,
    ];

    /// Classify a score on the 0–4 scale.
    ///
    /// Exactly 0.0 is `NotStarted`. Any other score is classified at the two
    /// decimals it is reported with (see [`round_score`]): up to 1.99 is
    /// `Pilot`, 2.00–2.99 `Operational`, 3.00–3.99 `Industrialized`, and 4.00
    /// `Optimized`. Inputs outside the scale are clamped and NaN reads as zero.
    pub fn from_score(score: f64) -> Self {
        let s = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, f64::from(MAX_RATING))
        };
        if s == 0.0 {
            return MaturityLevel::NotStarted;
        }

        let shown = round_score(s);
        if shown < 2.0 {
            MaturityLevel::Pilot
        } else if shown < 3.0 {
            MaturityLevel::Operational
        } else if shown < 4.0 {
            MaturityLevel::Industrialized
        } else {
            MaturityLevel::Optimized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::NotStarted => "Not Started",
            MaturityLevel::Pilot => "Pilot",
            MaturityLevel::Operational => "Operational",
            MaturityLevel::Industrialized => "Industrialized",
            MaturityLevel::Optimized => "Optimized",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A score at the two-decimal precision reports show.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Mean of a pillar's ratings, or `None` when there are none.
pub fn pillar_score(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
    Some(sum / ratings.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarScore {
    pub pillar: String,
    pub score: f64,
    pub level: MaturityLevel,
}

/// Pillar scores in catalog order plus the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scores {
    pub pillars: Vec<PillarScore>,
    pub overall: f64,
    pub overall_level: MaturityLevel,
}

impl Scores {
    /// Overall is the mean of pillar means, so every pillar weighs the same
    /// whatever its question count.
    pub fn from_ratings(ratings: &[PillarRatings]) -> Result<Self, ScoringError> {
        if ratings.is_empty() {
            return Err(ScoringError::NoPillars);
        }

        let pillars = ratings
            .iter()
            .map(|p| {
                let score = pillar_score(&p.ratings)
                    .ok_or_else(|| ScoringError::EmptyPillar(p.pillar.clone()))?;
                Ok(PillarScore {
                    pillar: p.pillar.clone(),
                    score,
                    level: MaturityLevel::from_score(score),
                })
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;

        let overall = pillars.iter().map(|p| p.score).sum::<f64>() / pillars.len() as f64;

        Ok(Self {
            pillars,
            overall,
            overall_level: MaturityLevel::from_score(overall),
        })
    }
}
