//! Fuzzy matcher trait.

/// Ranks candidate strings by closeness to a (possibly incomplete) fragment.
pub trait FuzzyMatcher: Send + Sync {
    /// Up to `limit` candidates, best match first.
    ///
    /// Implementations may return more than `limit`; callers cap.
    fn close_matches(&self, fragment: &str, candidates: &[String], limit: usize) -> Vec<String>;
}
