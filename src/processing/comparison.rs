use thiserror::Error;

use crate::domain::types::InstitutionId;
use crate::processing::matcher::{ComparisonOutcome, EquivalencyMatcher, MatchError};
use crate::processing::{ComparisonRequest, ComparisonResponse, InstitutionSelector};
use crate::repository::{CatalogReader, RepositoryError};

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("institution not found: {0}")]
    UnknownInstitution(String),
    #[error("failed to load catalog: {0}")]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

fn resolve_institution<R>(
    selector: &InstitutionSelector,
    repo: &R,
) -> Result<InstitutionId, ComparisonError>
where
    R: CatalogReader,
{
    match selector {
        InstitutionSelector::Id(id) => Ok(*id),
        InstitutionSelector::Name(name) => match repo.find_institution_by_name(name) {
            Ok(institution) => Ok(institution.id),
            Err(RepositoryError::NotFound) => {
                Err(ComparisonError::UnknownInstitution(name.clone()))
            }
            Err(error) => Err(error.into()),
        },
    }
}

fn run_comparison<R>(
    request: &ComparisonRequest,
    repo: &R,
    matcher: &EquivalencyMatcher,
) -> Result<(InstitutionId, ComparisonOutcome), ComparisonError>
where
    R: CatalogReader,
{
    let institution_id = resolve_institution(&request.institution, repo)?;

    let candidates = repo.get_candidate_courses(institution_id)?;
    if candidates.is_empty() {
        log::warn!(
            "No catalog courses for institution {institution_id}; request {} will be rejected",
            request.request_id
        );
    }
    log::debug!(
        "Loaded {} candidate courses for institution {institution_id}",
        candidates.len()
    );

    let outcome = matcher.compare(&request.mode, &candidates)?;
    Ok((institution_id, outcome))
}

/// Handle one comparison request: resolve the institution, load its catalog,
/// run the matcher and build the reply. Blocks on model inference.
pub fn process_comparison_message<R>(
    request: ComparisonRequest,
    repo: &R,
    matcher: &EquivalencyMatcher,
) -> ComparisonResponse
where
    R: CatalogReader,
{
    log::info!(
        "Received {} comparison {} for {:?}",
        request.mode.name(),
        request.request_id,
        request.institution
    );

    match run_comparison(&request, repo, matcher) {
        Ok((institution_id, outcome)) => {
            log::info!(
                "Finished comparison {}: institution={institution_id}, score={:.2}, decision={}",
                request.request_id,
                outcome.score(),
                outcome.decision().as_str()
            );
            ComparisonResponse::Completed {
                request_id: request.request_id,
                institution_id,
                outcome,
            }
        }
        Err(error) => {
            log::error!("Comparison {} failed: {error}", request.request_id);
            ComparisonResponse::Failed {
                request_id: request.request_id,
                error: error.to_string(),
            }
        }
    }
}

/// Build the reply for a payload that is not a valid [`ComparisonRequest`].
///
/// The request id is recovered when the payload is a JSON object carrying a
/// string `request_id`; otherwise it is empty.
pub fn reject_malformed_message(
    payload: &[u8],
    error: &serde_json::Error,
) -> ComparisonResponse {
    let request_id = serde_json::from_slice::<serde_json::Value>(payload)
        .ok()
        .and_then(|value| {
            value
                .get("request_id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default();

    log::error!("Rejecting malformed request {request_id:?}: {error}");
    ComparisonResponse::Failed {
        request_id,
        error: format!("invalid request: {error}"),
    }
}
