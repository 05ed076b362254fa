//! Lexical similarity: plain term-frequency over lower-cased substrings.
//!
//! Tokens are matched as literal substrings, not on word boundaries, so
//! `"dog"` also counts inside `"dogs"`. Scores are integers; ties keep the
//! original chunk order.

use super::chunker::Chunk;
use super::{RankedResult, SimilarityIndex};

/// Number of results returned when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// Sum of non-overlapping occurrences of each query token in `content`.
pub fn lexical_score(content: &str, query: &str) -> usize {
    let haystack = content.to_lowercase();
    let query = query.to_lowercase();
    query
        .split_whitespace()
        .map(|token| haystack.matches(token).count())
        .sum()
}

/// Top-`k` chunks by descending `lexical_score`, stable among equal scores.
pub fn rank(chunks: &[Chunk], query: &str, k: usize) -> RankedResult {
    let mut scored: Vec<(usize, &Chunk)> = chunks
        .iter()
        .map(|c| (lexical_score(&c.content, query), c))
        .collect();
    // sort_by is stable.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(k)
        .map(|(_, c)| c.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalIndex;

impl SimilarityIndex for LexicalIndex {
    fn rank(&self, chunks: &[Chunk], query: &str, k: usize) -> RankedResult {
        rank(chunks, query, k)
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        let mut off = 0;
        texts
            .iter()
            .map(|t| {
                let c = Chunk {
                    content: t.to_string(),
                    origin_offset: off,
                };
                off += t.chars().count();
                c
            })
            .collect()
    }

    fn contents(r: &RankedResult) -> Vec<&str> {
        r.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn scores_match_term_frequency() {
        let q = "dog";
        assert_eq!(lexical_score("cat dog", q), 1);
        assert_eq!(lexical_score("dog dog", q), 2);
        assert_eq!(lexical_score("bird", q), 0);
    }

    #[test]
    fn ranks_by_score_and_truncates() {
        let c = chunks(&["cat dog", "dog dog", "bird"]);
        assert_eq!(contents(&rank(&c, "dog", 2)), vec!["dog dog", "cat dog"]);
    }

    #[test]
    fn ties_keep_original_order() {
        let c = chunks(&["A x", "B x", "C x"]);
        assert_eq!(contents(&rank(&c, "x", 4)), vec!["A x", "B x", "C x"]);
    }

    #[test]
    fn empty_query_keeps_order_and_truncates() {
        let c = chunks(&["one", "two", "three"]);
        assert_eq!(contents(&rank(&c, "   ", 2)), vec!["one", "two"]);
    }

    #[test]
    fn empty_chunks_give_empty_result() {
        assert!(rank(&[], "dog", 10).is_empty());
    }

    #[test]
    fn k_larger_than_input_returns_all() {
        let c = chunks(&["a", "b"]);
        assert_eq!(rank(&c, "a", 10).len(), 2);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(lexical_score("Dogs and DOGMA", "dog"), 2);
        assert_eq!(lexical_score("aaaa", "aa"), 2);
        assert_eq!(lexical_score("The Fed", "THE fed"), 2);
    }
}
