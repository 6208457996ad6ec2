//! Textual similarity between a handle and candidate text
//!
//! Uses the Ratcliff/Obershelp "gestalt" ratio: find the longest common
//! contiguous block, recurse on both sides of it, and score
//! `2 * matched / (len(a) + len(b))`. Comparison is case-insensitive.

use std::collections::HashMap;

/// A candidate is accepted only when its score is strictly above this value
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Sequences at least this long get popular-element pruning
const POPULAR_MIN_LEN: usize = 200;

/// Similarity ratio in `[0, 1]` between two strings, ignoring case
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Whether a score clears the acceptance threshold
pub fn is_match(score: f64) -> bool {
    score > MATCH_THRESHOLD
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element of `b` (popular elements removed)
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the longest match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Extend across elements pruned as popular
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    /// Total size of all matching blocks
    fn matched_len(&self) -> usize {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut matched = 0;

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_is_one() {
        assert!(approx(similarity("alice", "alice"), 1.0));
        assert!(approx(similarity("", ""), 1.0));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(approx(similarity("Foo", "foo"), 1.0));
        assert!(approx(similarity("ALICE", "alice"), 1.0));
    }

    #[test]
    fn test_known_ratios() {
        // "abcd" vs "bcde": one block "bcd" of 3 -> 6/8
        assert!(approx(similarity("abcd", "bcde"), 0.75));
        // "alice" inside "alice_smith": 2*5/16
        assert!(approx(similarity("alice", "alice_smith"), 10.0 / 16.0));
        // two blocks: "ab" and "cd" around an inserted "x"
        assert!(approx(similarity("abcd", "abxcd"), 8.0 / 9.0));
    }

    #[test]
    fn test_unrelated_is_low() {
        assert!(similarity("alice", "zzzzqqqq") < MATCH_THRESHOLD);
        assert!(similarity("alice", "Welcome to our search page, results below") < MATCH_THRESHOLD);
        assert!(approx(similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_symmetric_decision() {
        let pairs = [
            ("alice", "alice99"),
            ("alice", "malice in wonderland"),
            ("bob", "bobby"),
            ("alice", "xyz"),
        ];
        for (a, b) in pairs {
            assert_eq!(is_match(similarity(a, b)), is_match(similarity(b, a)), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_match(0.5));
        assert!(is_match(0.500_001));
        // "ab" vs "abcd": 2*2/6 = 0.666..
        assert!(is_match(similarity("ab", "abcd")));
        // "ab" vs "abcdef": 2*2/8 = 0.5 exactly, rejected
        assert!(approx(similarity("ab", "abcdef"), 0.5));
        assert!(!is_match(similarity("ab", "abcdef")));
    }

    #[test]
    fn test_long_candidate_is_bounded() {
        let long = format!("alice {}", "lorem ipsum dolor sit amet ".repeat(20));
        let score = similarity("alice", &long);
        assert!((0.0..=1.0).contains(&score));
        assert!(score < MATCH_THRESHOLD);
    }
}
