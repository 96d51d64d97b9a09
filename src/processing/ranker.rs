use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("no candidates to rank against")]
    EmptyCandidateSet,
    #[error("candidate {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Cosine similarity of two vectors of equal length.
///
/// Accumulates in `f64`. Returns `0.0` when either vector has zero norm. The
/// result is kept inside `[-1, 1]` to absorb rounding drift only; negative
/// similarities are preserved.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Return the index and raw cosine similarity of the closest candidate.
///
/// Only a strictly greater similarity replaces the current best, so ties
/// resolve to the earliest candidate.
pub fn best_match<V>(query: &[f32], candidates: &[V]) -> Result<(usize, f64), RankError>
where
    V: AsRef<[f32]>,
{
    let mut best: Option<(usize, f64)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        if candidate.len() != query.len() {
            return Err(RankError::DimensionMismatch {
                index,
                expected: query.len(),
                found: candidate.len(),
            });
        }

        let similarity = cosine_similarity(query, candidate);
        let replace = match best {
            None => true,
            Some((_, best_similarity)) => similarity > best_similarity,
        };
        if replace {
            best = Some((index, similarity));
        }
    }

    best.ok_or(RankError::EmptyCandidateSet)
}
