#![forbid(unsafe_code)]

//! # ai-readiness
//!
//! Six-pillar AI readiness self-assessment.
//!
//! A [`Session`] collects 0–4 ratings for the questions of a [`Catalog`].
//! [`Scores`] averages them per pillar and overall (a mean of pillar means),
//! each score is read against the five-tier [`MaturityLevel`] scale, and a
//! [`Report`] renders the result as CSV, PDF, or a terminal dashboard.
//! Optionally, [`RecommendationRequester`] sends the scores to an OpenAI
//! assistant and returns its improvement advice.

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod prompts;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod session;

pub use catalog::{Catalog, CatalogError, Pillar, Question};
pub use config::{AssistantConfig, PollPolicy};
pub use gateway::{AssistantError, AssistantGateway, OpenAiAssistants};
pub use recommend::{PollState, Recommendation, RecommendationRequester, RunPoller};
pub use report::{Artifact, ExportError, Report, ReportRow};
pub use scoring::{MaturityLevel, PillarScore, Scores, ScoringError};
pub use session::{Answers, PillarRatings, Rating, RatingKey, Session, SessionError};
