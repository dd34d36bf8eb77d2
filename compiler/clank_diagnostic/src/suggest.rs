//! "Did you mean" suggestions.
//!
//! Levenshtein distance with a two-row DP (O(min(|a|, |b|)) space).
//! Candidates rank by distance ascending, then similarity score descending
//! (distance relative to the longer string), then longest common prefix
//! with the target descending.

/// Levenshtein edit distance between two strings.
pub fn levenshtein(a: &str, b: &str) -> usize {
    // Keep the shorter string as the row for O(min) space.
    let (short, long): (Vec<char>, Vec<char>) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() {
            (a, b)
        } else {
            (b, a)
        }
    };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// Length of the longest common prefix of two strings, in chars.
pub fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(ca, cb)| ca == cb)
        .count()
}

/// Find candidates similar to `target`.
///
/// Returns at most `max_results` names within `max_distance` edits.
pub fn find_similar_with_limits(
    target: &str,
    candidates: &[String],
    max_distance: usize,
    max_results: usize,
) -> Vec<String> {
    let target_len = target.chars().count();
    let mut scored: Vec<(usize, usize, usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let distance = levenshtein(target, candidate);
            if distance == 0 || distance > max_distance {
                return None;
            }
            let max_len = target_len.max(candidate.chars().count());
            let lcp = longest_common_prefix(target, candidate);
            Some((distance, max_len, lcp, candidate))
        })
        .collect();

    scored.sort_by(|(d1, len1, lcp1, n1), (d2, len2, lcp2, n2)| {
        d1.cmp(d2)
            // Similarity score 1 - d/max_len descending: for equal distance
            // this is max_len descending; compare without floats.
            .then_with(|| (d1 * len2).cmp(&(d2 * len1)))
            .then_with(|| lcp2.cmp(lcp1))
            .then_with(|| n1.cmp(n2))
    });

    scored
        .into_iter()
        .take(max_results)
        .map(|(_, _, _, name)| name.clone())
        .collect()
}

/// [`find_similar_with_limits`] with the default bounds (distance 3, top 3).
pub fn find_similar(target: &str, candidates: &[String]) -> Vec<String> {
    find_similar_with_limits(target, candidates, 3, 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("consol_log", "console_log"), 1);
    }

    #[test]
    fn distance_is_symmetric() {
        for (a, b) in [("abc", "yabd"), ("flour", "flower"), ("x", "xyzzy")] {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn common_prefix() {
        assert_eq!(longest_common_prefix("console_log", "consol_log"), 6);
        assert_eq!(longest_common_prefix("abc", "xyz"), 0);
        assert_eq!(longest_common_prefix("abc", "abc"), 3);
    }

    #[test]
    fn finds_closest_first() {
        let candidates = names(&["console_log", "count", "cosine"]);
        let similar = find_similar("consol_log", &candidates);
        assert_eq!(similar, vec!["console_log".to_string()]);
    }

    #[test]
    fn respects_max_distance() {
        let candidates = names(&["completely_different"]);
        assert!(find_similar("x", &candidates).is_empty());
    }

    #[test]
    fn excludes_exact_matches() {
        let candidates = names(&["len", "len2"]);
        let similar = find_similar("len", &candidates);
        assert_eq!(similar, vec!["len2".to_string()]);
    }

    #[test]
    fn caps_result_count() {
        let candidates = names(&["val1", "val2", "val3", "val4"]);
        let similar = find_similar("val", &candidates);
        assert_eq!(similar.len(), 3);
    }

    #[test]
    fn prefix_breaks_ties() {
        // Both at distance 1 and equal length; the longer shared prefix
        // with the target wins.
        let candidates = names(&["abXd", "abcX"]);
        let similar = find_similar("abcd", &candidates);
        assert_eq!(similar[0], "abcX");
    }
}
