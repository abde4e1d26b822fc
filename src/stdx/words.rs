//! Word-layout helpers shared by the bitset and its callers.
//!
//! Bits are stored least-significant-bit first in `u64` words: bit `b` lives
//! in word `b / 64` at offset `b % 64`. Callers that persist the flat word
//! encoding produced by [`ConcurrentBitSet::to_words`] can use these helpers
//! to size buffers and to check padding without constructing a bitset.
//!
//! [`ConcurrentBitSet::to_words`]: super::ConcurrentBitSet::to_words

/// Number of bits held by one backing word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Computes the number of `u64` words needed to store `n` bits.
///
/// ```
/// use concurrent_bitset::stdx::words::words_for_bits;
///
/// assert_eq!(words_for_bits(0), 0);
/// assert_eq!(words_for_bits(64), 1);
/// assert_eq!(words_for_bits(130), 3);
/// ```
#[inline]
pub const fn words_for_bits(n: usize) -> usize {
    n.div_ceil(WORD_BITS)
}

/// Mask of the addressable bits in the last word of an `n`-bit set.
///
/// Returns `u64::MAX` when `n` is a multiple of 64 (including zero, where
/// there is no last word and the mask is never applied).
#[inline]
pub const fn last_word_mask(n: usize) -> u64 {
    let remaining_bits = n % WORD_BITS;
    if remaining_bits == 0 {
        u64::MAX
    } else {
        (1u64 << remaining_bits) - 1
    }
}

/// Splits a bit index into `(word_index, single_bit_mask)`.
#[inline(always)]
pub(crate) const fn locate(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}
