//! Question catalog: the pillars of the assessment and their questions.
//!
//! The built-in catalog is the six-layer AI readiness framework. A catalog can
//! also be loaded from JSON; every loaded catalog goes through the same
//! validation so a pillar can never end up with zero questions.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no pillars")]
    NoPillars,

    #[error("pillar '{0}' has no questions")]
    EmptyPillar(String),

    #[error("pillar name must be non-empty")]
    BlankPillarName,

    #[error("pillar '{pillar}' question {ordinal} has no text")]
    BlankQuestion { pillar: String, ordinal: usize },

    #[error("duplicate pillar '{0}'")]
    DuplicatePillar(String),
}

/// A single question. `ordinal` is 1-based within its pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub ordinal: usize,
    pub text: String,
}

/// A named group of questions, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pillar {
    pub name: String,
    pub questions: Vec<Question>,
}

impl Pillar {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub pillars: Vec<PillarSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarSpec {
    pub name: String,
    pub questions: Vec<String>,
}

/// Validated, immutable set of pillars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pillars: Vec<Pillar>,
}

impl Catalog {
    /// Build a catalog from a spec, rejecting anything that could not be scored.
    pub fn from_spec(spec: CatalogSpec) -> Result<Self, CatalogError> {
        if spec.pillars.is_empty() {
            return Err(CatalogError::NoPillars);
        }

        let mut seen = HashSet::new();
        let mut pillars = Vec::with_capacity(spec.pillars.len());
        for p in spec.pillars {
            let name = p.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::BlankPillarName);
            }
            if !seen.insert(name.clone()) {
                return Err(CatalogError::DuplicatePillar(name));
            }
            if p.questions.is_empty() {
                return Err(CatalogError::EmptyPillar(name));
            }

            let mut questions = Vec::with_capacity(p.questions.len());
            for (idx, text) in p.questions.into_iter().enumerate() {
                let ordinal = idx + 1;
                if text.trim().is_empty() {
                    return Err(CatalogError::BlankQuestion {
                        pillar: name,
                        ordinal,
                    });
                }
                questions.push(Question { ordinal, text });
            }
            pillars.push(Pillar { name, questions });
        }

        Ok(Self { pillars })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let spec: CatalogSpec = serde_json::from_str(raw)?;
        Self::from_spec(spec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    pub fn pillar(&self, name: &str) -> Option<&Pillar> {
        self.pillars.iter().find(|p| p.name == name)
    }

    pub fn question_count(&self) -> usize {
        self.pillars.iter().map(Pillar::len).sum()
    }

    /// The six-layer AI readiness framework.
    pub fn builtin() -> Self {
        let pillars = BUILTIN_PILLARS
            .iter()
            .map(|(name, questions)| Pillar {
                name: (*name).to_string(),
                questions: questions
                    .iter()
                    .enumerate()
                    .map(|(idx, text)| Question {
                        ordinal: idx + 1,
                        text: (*text).to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { pillars }
    }

    /// Spec form of this catalog, suitable for writing back to disk.
    pub fn to_spec(&self) -> CatalogSpec {
        CatalogSpec {
            pillars: self
                .pillars
                .iter()
                .map(|p| PillarSpec {
                    name: p.name.clone(),
                    questions: p.questions.iter().map(|q| q.text.clone()).collect(),
                })
                .collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_PILLARS: &[(&str, &[&str])] = &[
    (
        "1. Infrastructure Layer",
        &[
            "Do you use a modern GPU stack (e.g., Hopper, Blackwell, Quantum2, Spectrum-X, DOX) for AI workloads?",
            "Do you utilize a flexible and scalable general compute stack for AI operations?",
            "Is your infrastructure integrated with edge computing and data center environments?",
            "Do you support hyperscaler integration for hybrid or non-sovereign compute needs?",
            "Have you deployed AI workloads in a sovereign data center environment?",
        ],
    ),
    (
        "2. Orchestration Layer",
        &[
            "Do you support horizontal and vertical elasticity with auto-scaling and reservation mechanisms?",
            "Have you implemented fractional GPU isolation and account-level multi-tenancy?",
            "Is your infrastructure containerized using platforms like Kubernetes or container registry?",
            "Are you leveraging serverless frameworks for executing cloud functions or AI agent tasks?",
            "Do you use virtualization for VM/Bare Metal provisioning, operations, and support?",
        ],
    ),
    (
        "3. Data Foundation Layer",
        &[
            "Do you have a data pipeline for integrating structured and unstructured data sources?",
            "Are synthetic data generation and management services implemented in your environment?",
            "Do you use vector stores, KGs, or blob-based semantic knowledge repositories?",
            "Do you have secure, scalable RAG or search capabilities deployed?",
            "Is your AI solution backed by a data vault, catalog, or secure marketplace?",
        ],
    ),
    (
        "4. Model Layer",
        &[
            "Are you fine-tuning or pre-training foundation models using custom recipes?",
            "Do you use traditional ML/DL SDKs, libraries, and notebooks like NeMo or TensorFlow?",
            "Have you applied optimization for model performance and inference efficiency?",
            "Is model deployment managed with tools like MLOps or LLMOps (e.g., NIMs)?",
            "Are inference endpoints available for multi-purpose or API-based serving?",
        ],
    ),
    (
        "5. Agents & Applications Layer",
        &[
            "Do you develop AI applications across web, mobile, and conversational UI platforms?",
            "Do you have workflows to manage the lifecycle of AI agents?",
            "Is there a central registry or catalog of custom or reusable AI agents?",
            "Do you manage a tools repository for supporting agent development and integration?",
            "Have you adopted prebuilt agents specific to your industry domain?",
        ],
    ),
    (
        "6. Operations & Governance Layer",
        &[
            "Do you use a model switchboard to manage decisioning, routing, and policy enforcement?",
            "Are AI usage, RAI, FinOps, and risk policies enforced through centralized controls?",
            "Are infrastructure security and access managed through baseline controls?",
            "Do you use observability tools to monitor the health and performance of AI workloads?",
            "Are there systems for security, audit logging, vulnerability scanning, and access governance?",
            "Is your AI infrastructure integrated with ITSM for service intelligence?",
            "Do you have disaster recovery and high-availability strategies in place for AI systems?",
        ],
    ),
];
