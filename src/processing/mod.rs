use serde::{Deserialize, Serialize};

use crate::domain::types::InstitutionId;
use crate::processing::matcher::{ComparisonMode, ComparisonOutcome};

pub mod comparison;
pub mod embedding;
pub mod matcher;
pub mod normalizer;
pub mod ranker;

/// Identifies the institution whose catalog a request targets.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum InstitutionSelector {
    Id(InstitutionId),
    Name(String),
}

/// Comparison request received by the worker.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub request_id: String,
    pub institution: InstitutionSelector,
    #[serde(flatten)]
    pub mode: ComparisonMode,
}

/// Reply published for every processed request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ComparisonResponse {
    Completed {
        request_id: String,
        institution_id: InstitutionId,
        outcome: ComparisonOutcome,
    },
    Failed {
        request_id: String,
        error: String,
    },
}

impl ComparisonResponse {
    pub fn request_id(&self) -> &str {
        match self {
            ComparisonResponse::Completed { request_id, .. }
            | ComparisonResponse::Failed { request_id, .. } => request_id,
        }
    }
}
