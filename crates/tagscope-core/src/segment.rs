//! Caption segmentation and bounded substring enumeration.
//!
//! A caption is cut into segments at every delimiter character, and every
//! substring of a bounded character length inside a segment becomes a
//! candidate phrase. Lengths are counted in `char`s, so full-width CJK text
//! and ASCII tags are measured the same way.
//!
//! Enumeration costs `O(len × (max_len - min_len + 1))` substrings per
//! segment. Nothing bounds segment length, so a caption with a very long
//! undelimited run is proportionally expensive.

use std::collections::HashSet;

/// Characters that terminate a segment.
///
/// ASCII and full-width punctuation, brackets of the common styles, dash-like
/// marks, and whitespace (space, tab, CR, LF).
pub const DELIMITERS: &[char] = &[
    ',', '.', '!', '?', ';', ':', // ASCII punctuation
    '，', '。', '！', '？', '；', '：', '、', // full-width punctuation
    '"', '\'', // quotes
    '「', '」', '【', '】', '（', '）', // CJK brackets
    '(', ')', '[', ']', '{', '}', '《', '》', '<', '>', // brackets
    '-', '_', '—', '·', '…', // dashes, middle dot, ellipsis
    '\n', '\r', '\t', ' ', // whitespace
];

/// Returns `true` if `c` terminates a segment.
pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Returns `true` if any character of `s` is a delimiter.
pub fn contains_delimiter(s: &str) -> bool {
    s.chars().any(is_delimiter)
}

/// Split text into maximal delimiter-free runs.
///
/// Empty runs between adjacent delimiters are dropped.
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(is_delimiter).filter(|s| !s.is_empty()).collect()
}

/// Enumerate every distinct candidate substring of `text`.
///
/// For each segment, every run of `min_len..=max_len` characters is taken,
/// trimmed, and kept if it is non-empty and delimiter-free. Duplicates
/// collapse, so the result is the caption's contribution to document
/// frequency.
///
/// Returns an empty set when `min_len` is zero or greater than `max_len`.
#[tracing::instrument(level = "trace", skip(text), fields(text_len = text.len()))]
pub fn segment(text: &str, min_len: usize, max_len: usize) -> HashSet<String> {
    let mut substrings = HashSet::new();
    if min_len == 0 || min_len > max_len {
        return substrings;
    }

    for seg in split_segments(text) {
        let seg = seg.trim();
        if seg.is_empty() {
            continue;
        }

        let chars: Vec<char> = seg.chars().collect();
        let len = chars.len();

        for start in 0..len {
            for l in min_len..=max_len {
                if l > len - start {
                    break;
                }
                let sub: String = chars[start..start + l].iter().collect();
                let sub = sub.trim();
                // Trimming can expose characters the split never saw as
                // boundaries, so the delimiter check stays.
                if !sub.is_empty() && !contains_delimiter(sub) {
                    substrings.insert(sub.to_string());
                }
            }
        }
    }

    substrings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(set: HashSet<String>) -> Vec<String> {
        let mut v: Vec<String> = set.into_iter().collect();
        v.sort();
        v
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("", 2, 15).is_empty());
    }

    #[test]
    fn delimiter_only_input_yields_nothing() {
        assert!(segment(", . ，。\n\t()【】", 2, 15).is_empty());
    }

    #[test]
    fn enumerates_all_bounded_substrings() {
        assert_eq!(sorted(segment("cat", 2, 15)), vec!["at", "ca", "cat"]);
    }

    #[test]
    fn respects_max_len() {
        let subs = segment("abcdef", 2, 3);
        assert!(subs.contains("abc"));
        assert!(!subs.contains("abcd"));
        assert_eq!(subs.len(), 5 + 4);
    }

    #[test]
    fn single_char_segments_are_below_min_len() {
        assert!(segment("a, b, c", 2, 15).is_empty());
    }

    #[test]
    fn space_splits_words() {
        let subs = segment("red hair", 2, 15);
        assert!(subs.contains("red"));
        assert!(subs.contains("hair"));
        assert!(!subs.contains("red hair"));
        assert!(!subs.iter().any(|s| s.contains(' ')));
    }

    #[test]
    fn duplicates_within_a_document_collapse() {
        let subs = segment("dog, dog, dog", 2, 15);
        assert_eq!(sorted(subs), vec!["do", "dog", "og"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let subs = segment("正面视角", 2, 3);
        assert_eq!(
            sorted(subs),
            vec!["正面", "正面视", "视角", "面视", "面视角"]
        );
    }

    #[test]
    fn full_width_punctuation_splits() {
        let subs = segment("长发，蓝眼睛", 2, 15);
        assert!(subs.contains("长发"));
        assert!(subs.contains("蓝眼睛"));
        assert!(!subs.iter().any(|s| s.contains('，')));
    }

    #[test]
    fn no_output_contains_a_delimiter() {
        let text = "1girl, (masterpiece:1.2), [blue_eyes] \"smile\" — looking-at-viewer…《test》";
        for sub in segment(text, 1, 15) {
            assert!(!contains_delimiter(&sub), "{sub:?} contains a delimiter");
        }
    }

    #[test]
    fn invalid_bounds_yield_nothing() {
        assert!(segment("abcdef", 4, 2).is_empty());
        assert!(segment("abcdef", 0, 3).is_empty());
    }

    #[test]
    fn min_len_beyond_segment_yields_nothing() {
        assert!(segment("abc", 4, 15).is_empty());
        assert!(segment("abc, de", 3, 3).contains("abc"));
        assert_eq!(segment("abc, de", 3, 3).len(), 1);
    }

    #[test]
    fn unbounded_max_len_takes_whole_segment() {
        let subs = segment("abc, de", 2, usize::MAX);
        assert_eq!(sorted(subs), vec!["ab", "abc", "bc", "de"]);
    }

    #[test]
    fn huge_min_len_does_not_overflow() {
        assert!(segment("abc", usize::MAX, usize::MAX).is_empty());
        assert!(segment("abc", usize::MAX - 1, usize::MAX).is_empty());
        assert!(segment("正面视角", usize::MAX / 2, usize::MAX).is_empty());
    }

    #[test]
    fn split_segments_drops_empty_runs() {
        assert_eq!(split_segments(",,a  b,"), vec!["a", "b"]);
    }

    #[test]
    fn delimiter_predicates() {
        assert!(is_delimiter('、'));
        assert!(is_delimiter(' '));
        assert!(!is_delimiter('a'));
        assert!(contains_delimiter("a-b"));
    }
}
