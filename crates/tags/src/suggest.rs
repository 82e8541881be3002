//! Autocomplete suggestions for the `id` option.
//!
//! Scoring is delegated to a [`FuzzyMatcher`]; this module only caps the
//! result and shapes it into choices. [`PrefixDistanceMatcher`] is the
//! default matcher.

use std::sync::Arc;

use tagbot_core::interaction::Choice;
use tagbot_core::matcher::FuzzyMatcher;

/// Maximum number of autocomplete choices offered.
pub const MAX_SUGGESTIONS: usize = 5;

/// Turns a typed fragment into a capped, ranked list of tag ids.
#[derive(Clone)]
pub struct SuggestionEngine {
    matcher: Arc<dyn FuzzyMatcher>,
}

impl SuggestionEngine {
    pub fn new(matcher: Arc<dyn FuzzyMatcher>) -> Self {
        Self { matcher }
    }

    /// At most `limit` ids, in the matcher's order.
    pub fn suggest(&self, fragment: &str, known_ids: &[String], limit: usize) -> Vec<String> {
        if limit == 0 || known_ids.is_empty() {
            return Vec::new();
        }
        let mut matches = self.matcher.close_matches(fragment, known_ids, limit);
        matches.truncate(limit);
        matches
    }

    /// Autocomplete choices; label and value are both the tag id.
    pub fn choices(&self, fragment: &str, known_ids: &[String]) -> Vec<Choice> {
        self.suggest(fragment, known_ids, MAX_SUGGESTIONS)
            .into_iter()
            .map(Choice::same)
            .collect()
    }

    /// The single closest id, used to hint at typos.
    pub fn closest(&self, fragment: &str, known_ids: &[String]) -> Option<String> {
        self.suggest(fragment, known_ids, 1).into_iter().next()
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(Arc::new(PrefixDistanceMatcher))
    }
}

/// Ranks candidates by how many edits turn the fragment into some prefix of
/// the candidate, so a correctly typed beginning scores zero.
///
/// Case-insensitive. Ties are broken alphabetically.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixDistanceMatcher;

impl FuzzyMatcher for PrefixDistanceMatcher {
    fn close_matches(&self, fragment: &str, candidates: &[String], limit: usize) -> Vec<String> {
        let fragment = fragment.to_lowercase();
        let mut scored: Vec<(usize, &String)> = candidates
            .iter()
            .map(|c| (prefix_edit_distance(&fragment, &c.to_lowercase()), c))
            .collect();
        scored.sort();
        scored
            .into_iter()
            .take(limit)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

/// Minimum Levenshtein distance between `fragment` and any prefix of `candidate`.
pub fn prefix_edit_distance(fragment: &str, candidate: &str) -> usize {
    let fragment: Vec<char> = fragment.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    // previous[j] = distance(fragment[..i-1], candidate[..j])
    let mut previous: Vec<usize> = (0..=candidate.len()).collect();
    let mut current = vec![0; candidate.len() + 1];

    for (i, f) in fragment.iter().enumerate() {
        current[0] = i + 1;
        for (j, c) in candidate.iter().enumerate() {
            let substitution = previous[j] + usize::from(f != c);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous.into_iter().min().unwrap_or(0)
}
