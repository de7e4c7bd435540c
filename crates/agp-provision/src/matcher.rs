//! Fuzzy matching of directory names to project repositories
//!
//! Scoring uses the classic longest-common-run scheme: find the longest
//! common substring, then recurse into the prefixes and the suffixes on
//! both sides, summing the matched lengths. The percentage normalizes
//! that sum against the combined length, so identical strings score 100.

/// Similarity of one catalog entry against the requested name
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCandidate {
    /// Repository name
    pub name: String,
    /// Total number of matched characters
    pub score: usize,
    /// Score normalized against the combined length, 0 to 100
    pub percent: f64,
}

/// Total number of matching characters between two strings
///
/// Symmetric: the arguments are put into a canonical order before
/// scoring, so `similarity(a, b) == similarity(b, a)` always holds.
pub fn similarity(a: &str, b: &str) -> usize {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    matched_chars(first.as_bytes(), second.as_bytes())
}

/// Percentage variant of [`similarity`]
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    percent(similarity(a, b), a.len() + b.len())
}

/// Normalize a matched-character count against the combined length
fn percent(score: usize, combined: usize) -> f64 {
    if combined == 0 {
        return 0.0;
    }
    score as f64 * 200.0 / combined as f64
}

/// Score every candidate against `input`
pub fn rank(input: &str, candidates: &[String]) -> Vec<ProjectCandidate> {
    candidates
        .iter()
        .map(|name| {
            let score = similarity(input, name);
            ProjectCandidate {
                name: name.clone(),
                score,
                percent: percent(score, input.len() + name.len()),
            }
        })
        .collect()
}

/// Pick the candidate most similar to `input`
///
/// Returns `None` for an empty candidate list. Ties resolve to the
/// candidate with the lowest index in the original ordering.
pub fn closest<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    let ranked = rank(input, candidates);
    let mut best: Option<usize> = None;
    for (index, candidate) in ranked.iter().enumerate() {
        match best {
            Some(current) if ranked[current].percent >= candidate.percent => {}
            _ => best = Some(index),
        }
    }
    best.map(|index| candidates[index].as_str())
}

fn matched_chars(a: &[u8], b: &[u8]) -> usize {
    let (pos_a, pos_b, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_chars(&a[..pos_a], &b[..pos_b])
        + matched_chars(&a[pos_a + len..], &b[pos_b + len..])
}

/// Longest run of identical bytes, earliest positions on ties
fn longest_common_run(a: &[u8], b: &[u8]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut len = 0;
            while i + len < a.len() && j + len < b.len() && a[i + len] == b[j + len] {
                len += 1;
            }
            if len > best.2 {
                best = (i, j, len);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_strings_match_fully() {
        assert_eq!(similarity("customer", "customer"), 8);
        assert_eq!(similarity_percent("customer", "customer"), 100.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity("abc", "xyz"), 0);
        assert_eq!(similarity_percent("abc", "xyz"), 0.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(similarity("", "anything"), 0);
        assert_eq!(similarity_percent("", ""), 0.0);
    }

    #[test]
    fn recursion_counts_runs_on_both_sides() {
        // "foo" matches, then "bar" matches in the leftover suffixes
        assert_eq!(similarity("foobar", "foo-bar"), 6);
    }

    #[test]
    fn scoring_is_symmetric() {
        // The naive greedy scheme scores these differently per direction
        let pairs = [
            ("bafoobar", "barfoo"),
            ("customer-project", "customer"),
            ("ab", "ba"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn closest_prefers_higher_percentage() {
        let candidates = names(&["supplier-project", "customer-project"]);

        let best = closest("customerx", &candidates);

        assert_eq!(best, Some("customer-project"));
    }

    #[test]
    fn closest_resolves_ties_to_the_lowest_index() {
        let candidates = names(&["alpha-project", "alpha-project", "beta"]);

        let best = closest("alpha-project", &candidates);

        assert_eq!(best, Some("alpha-project"));
        // Equal percentages keep the first entry
        let ranked = rank("ab", &names(&["ab", "ab"]));
        assert_eq!(ranked[0].percent, ranked[1].percent);
        assert_eq!(closest("ab", &names(&["ab", "ab"])), Some("ab"));
    }

    #[test]
    fn closest_of_empty_list_is_none() {
        assert_eq!(closest("anything", &[]), None);
    }

    #[test]
    fn rank_reports_scores_for_all_candidates() {
        let ranked = rank("customer", &names(&["customer-project", "crm-project"]));

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].score, 8);
        assert!(ranked[0].percent > ranked[1].percent);
    }
}
