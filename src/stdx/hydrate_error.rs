//! Errors from strict word-array hydration.
//!
//! Only [`ConcurrentBitSet::try_from_words`] produces these. The lenient
//! [`ConcurrentBitSet::from_words`] path never fails: it truncates or
//! zero-extends the supplied words and masks stray padding bits instead.
//!
//! The enum is `#[non_exhaustive]`; consumers should include a fallback arm.
//!
//! [`ConcurrentBitSet::try_from_words`]: super::ConcurrentBitSet::try_from_words
//! [`ConcurrentBitSet::from_words`]: super::ConcurrentBitSet::from_words

use std::fmt;

/// Reasons a word array does not describe a well-formed bitset of the
/// requested size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum HydrateError {
    /// The word array length is not `size.div_ceil(64)`.
    WordCountMismatch { got: usize, expected: usize },
    /// The last word has bits set at positions `>= size`.
    ///
    /// `stray` holds just the offending bits (already shifted into their
    /// in-word positions).
    PaddingBitsSet { word: usize, stray: u64 },
}

impl HydrateError {
    /// Number of stray bits for [`PaddingBitsSet`](Self::PaddingBitsSet),
    /// zero for other variants.
    #[inline]
    pub fn stray_bit_count(&self) -> u32 {
        match self {
            Self::PaddingBitsSet { stray, .. } => stray.count_ones(),
            Self::WordCountMismatch { .. } => 0,
        }
    }
}

impl fmt::Display for HydrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordCountMismatch { got, expected } => {
                write!(f, "word count mismatch: got {got}, expected {expected}")
            }
            Self::PaddingBitsSet { word, stray } => write!(
                f,
                "{} padding bit(s) set in word {word} (mask {stray:#018x})",
                stray.count_ones()
            ),
        }
    }
}

impl std::error::Error for HydrateError {}
