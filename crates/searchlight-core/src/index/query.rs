//! Query specification and match-expression building.
//!
//! User input is never interpolated into a MATCH expression directly.
//! Terms that contain anything besides alphanumerics are wrapped in
//! FTS5 string syntax, and LIKE patterns escape their wildcards, so a
//! query like `50% "off"` stays a literal search.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ScoringConfig;

/// ASCII characters that force a term into quoted FTS5 string syntax.
/// Anything non-ASCII is a valid bareword character and passes through.
static MATCH_SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[:ascii:]&&[^a-zA-Z0-9]]").expect("Invalid escape regex"));

/// Escape a single term for safe use in an FTS5 MATCH expression.
///
/// Terms with special characters are wrapped in double quotes with
/// embedded quotes doubled:
/// - `hello` stays `hello`
/// - `gpt-2` becomes `"gpt-2"`
/// - `say "hi"` becomes `"say ""hi"""`
pub fn escape_match_term(term: &str) -> String {
    if MATCH_SPECIAL_CHARS.is_match(term) {
        format!("\"{}\"", term.replace('"', "\"\""))
    } else {
        term.to_string()
    }
}

/// Build an FTS5 prefix query from user input.
///
/// Splits on whitespace, lowercases, escapes each term and appends the
/// `*` prefix operator, then joins with OR so any term can match:
/// `"Hello World"` becomes `hello* OR world*`.
pub fn build_match_query(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|term| format!("{}*", escape_match_term(term)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Build a substring LIKE pattern from user input.
///
/// The pattern is used with `ESCAPE '\'`, so literal `%`, `_` and `\`
/// in the query are escaped rather than treated as wildcards.
pub fn build_like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// A fully described search request against the index.
///
/// The spec is an explicit value so that pre-search hooks can adjust
/// filters and thresholds before execution instead of mutating a half
/// built SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Raw query text as the caller typed it.
    pub query: String,
    /// Entity types to restrict the search to; empty means all.
    pub models: Vec<String>,
    /// Fields to restrict the search to; empty means all.
    pub fields: Vec<String>,
    /// Multiplier for the query-length score floor.
    pub min_score_factor: f64,
    /// Group results by `(foreign_id, model)` instead of `foreign_id`
    /// alone. Set for multi-entity searches.
    pub group_by_model: bool,
    /// Maximum number of hits to return.
    pub limit: Option<usize>,
}

impl QuerySpec {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            models: Vec::new(),
            fields: Vec::new(),
            min_score_factor: ScoringConfig::MIN_SCORE_FACTOR,
            group_by_model: false,
            limit: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.models.push(model.into());
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models.extend(models.into_iter().map(Into::into));
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_min_score_factor(mut self, factor: f64) -> Self {
        self.min_score_factor = factor;
        self
    }

    pub fn grouped_by_model(mut self) -> Self {
        self.group_by_model = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Minimum score a full-text match must exceed, derived from the
    /// query's byte length. Longer queries demand stronger matches;
    /// weaker ones only surface through the substring channel.
    pub fn min_score(&self) -> f64 {
        (self.query.len() as f64 * self.min_score_factor).round()
    }

    /// FTS5 MATCH expression for this query.
    pub fn match_query(&self) -> String {
        build_match_query(&self.query)
    }

    /// LIKE pattern for the substring channel.
    pub fn like_pattern(&self) -> String {
        build_like_pattern(&self.query)
    }
}
