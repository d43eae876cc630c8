//! Approximate string similarity for fuzzy candidate search.
//!
//! Scores are normalized edit-distance similarities scaled to `[0, 100]`,
//! case-folded first so `"Dove"` vs `"dove"` scores 100. Different scripts
//! share no characters and bottom out near 0 ("Шампунь" vs "shampoo").

use strsim::normalized_levenshtein;

use crate::types::Token;

/// Similarity between two token values in `[0, 100]`.
pub fn similarity(left: &str, right: &str) -> f64 {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    if left == right {
        return 100.0;
    }
    normalized_levenshtein(&left, &right) * 100.0
}

/// Best-scoring candidate among `candidates` for `value`.
///
/// Returns `(index, score)` of the first candidate achieving the maximum
/// score, or `None` when the candidate list is empty — the recovered
/// "lookup returned nothing" case.
pub fn best_match(value: &str, candidates: &[Token]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = similarity(value, &candidate.value);
        match best {
            Some((_, top)) if top >= score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_values_score_100() {
        assert!((similarity("dove", "dove") - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_insensitive_equality_scores_100() {
        assert!((similarity("Dove", "dove") - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_scripts_score_near_zero() {
        assert!(similarity("Шампунь", "shampoo") < 20.0);
    }

    #[test]
    fn test_close_variants_score_high() {
        assert!(similarity("shampoo", "shampo") > 80.0);
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = similarity("dove", "dvoe");
        let b = similarity("dvoe", "dove");
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_best_match_empty_candidates() {
        assert!(best_match("dove", &[]).is_none());
    }

    #[test]
    fn test_best_match_picks_highest() {
        let candidates = vec![Token::new("soap"), Token::new("dove"), Token::new("gel")];
        let (idx, score) = best_match("Dove", &candidates).unwrap();
        assert_eq!(idx, 1);
        assert!((score - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_match_tie_takes_first() {
        // Both candidates are equally distant from the query.
        let candidates = vec![Token::new("daue"), Token::new("dame")];
        let (idx, _) = best_match("dave", &candidates).unwrap();
        assert_eq!(idx, 0);
    }
}
