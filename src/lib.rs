pub mod db;
pub mod domain;
pub mod models;
pub mod processing;
pub mod repository;
pub mod schema;

/// Scores at or above this value are accepted as equivalent.
pub const ACCEPTED_THRESHOLD: f64 = 80.0;

/// Scores at or above this value (and below the accepted cut) are partial.
pub const PARTIAL_THRESHOLD: f64 = 50.0;
