//! Fuzzy name similarity on a 0-100 scale.
//!
//! Scores are indel similarities: `2 * LCS / (|a| + |b|)` over `char`s, so a
//! substitution or a transposition costs two edits out of the combined length.

use marks_core::UrlRecord;
use rapidfuzz::distance::indel;

/// Score passed to the partition finder's predicate when no threshold is
/// configured.
pub const DEFAULT_THRESHOLD: u8 = 90;

/// Whole-string similarity, 0-100.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    scale(indel::normalized_similarity(a.chars(), b.chars()))
}

/// Best [`ratio`] between the shorter string and any equally long window of
/// the longer one.
///
/// Windows are taken on `char` boundaries. Returns 0 when either side is
/// empty.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (short, short_len, long, long_len) = if a_len <= b_len {
        (a, a_len, b, b_len)
    } else {
        (b, b_len, a, a_len)
    };

    if short_len == 0 {
        return 0;
    }
    if short_len == long_len {
        return ratio(short, long);
    }

    // Byte offset of every char start, plus the end of the string.
    let bounds: Vec<usize> = long
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(long.len()))
        .collect();

    let mut best = 0.0_f64;
    for start in 0..=long_len - short_len {
        let window = &long[bounds[start]..bounds[start + short_len]];
        let score = indel::normalized_similarity(short.chars(), window.chars());
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    scale(best)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Bookmark match predicate: names whose [`partial_ratio`] exceeds
/// `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatcher {
    threshold: u8,
}

impl NameMatcher {
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    #[must_use]
    pub fn is_same(&self, a: &UrlRecord, b: &UrlRecord) -> bool {
        partial_ratio(&a.name, &b.name) > self.threshold
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
