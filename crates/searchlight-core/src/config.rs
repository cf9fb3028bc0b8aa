//! Compile-time configuration constants.

/// Index storage configuration.
pub struct IndexConfig;

impl IndexConfig {
    /// Default filename for the index database.
    pub const DB_FILENAME: &'static str = "search_index.db";

    /// How long a connection waits on a locked database before failing.
    pub const BUSY_TIMEOUT_MS: u32 = 30_000;
}

/// Scoring configuration.
pub struct ScoringConfig;

impl ScoringConfig {
    /// Multiplier applied to the query length to derive the minimum
    /// relevance score a full-text match must clear.
    ///
    /// Longer queries demand proportionally stronger matches. Matches
    /// below the floor still surface when the raw text contains the
    /// query as a substring.
    pub const MIN_SCORE_FACTOR: f64 = 0.8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_values() {
        assert!(IndexConfig::DB_FILENAME.ends_with(".db"));
        assert!(IndexConfig::BUSY_TIMEOUT_MS > 0);
        assert!(ScoringConfig::MIN_SCORE_FACTOR > 0.0);
    }
}
