//! Lock-free fixed-capacity [`ConcurrentBitSet`] with a striped cardinality
//! counter.
//!
//! # Invariants
//! - Bits are stored LSB-first in `AtomicU64` words;
//!   `words.len() == words_for_bits(bit_length)`.
//! - Padding bits beyond `bit_length` are zero. No mutator can address them,
//!   and hydration masks them off.
//! - Once mutators quiesce, `count.sum()` equals the population count of the
//!   words. Every unset→set transition increments exactly once and every
//!   set→unset transition decrements exactly once.
//!
//! # Ordering
//! - Word loads are `Acquire`; a successful word CAS is `AcqRel`. A thread
//!   that observes bit `b` set also observes everything the setter wrote
//!   before `set(b)`.
//! - The counter is `Relaxed` (see [`StripedCounter`]). It lags word state
//!   by at most the operations in flight.
//!
//! # Consistency
//! `next_set_bit`, `iter`, `to_words`, `cardinality` and `is_empty` read
//! words (or stripes) one at a time. Under concurrent mutation each word
//! reflects some state of that word, but the whole is not a single snapshot.
//!
//! # Performance
//! - `set`, `clear`, `is_set` are O(1); `set`/`clear` retry only while other
//!   writers keep changing the same word.
//! - `next_set_bit` is O(words scanned); `to_words` is O(words).
//! - `cardinality`/`is_empty` are O(stripes).

#[cfg(loom)]
use loom::sync::atomic::{AtomicU64, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicU64, Ordering};

use std::iter::FusedIterator;

use super::hydrate_error::HydrateError;
use super::striped_counter::{StripedCounter, StripedCounterConfig};
use super::words::{last_word_mask, locate, words_for_bits, WORD_BITS};

/// Thread-safe bitset of fixed size with lock-free single-bit updates.
///
/// Out-of-range indices are never an error: `set`/`clear` on `bit >= size`
/// do nothing and queries past the end report "not found".
///
/// # Examples
///
/// ```
/// use concurrent_bitset::ConcurrentBitSet;
///
/// let bits = ConcurrentBitSet::new(130);
/// bits.set(0);
/// bits.set(64);
/// bits.set(129);
/// bits.set(500); // out of range: ignored
///
/// assert_eq!(bits.cardinality(), 3);
/// assert_eq!(bits.next_set_bit(1), Some(64));
/// assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 64, 129]);
///
/// let restored = ConcurrentBitSet::from_words(&bits.to_words(), 130);
/// assert_eq!(restored.cardinality(), 3);
/// ```
pub struct ConcurrentBitSet {
    words: Box<[AtomicU64]>,
    bit_length: usize,
    count: StripedCounter,
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConcurrentBitSet>();
};

impl std::fmt::Debug for ConcurrentBitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentBitSet")
            .field("bit_length", &self.bit_length)
            .field("words_len", &self.words.len())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

impl ConcurrentBitSet {
    /// Creates an all-zero bitset of `size` bits with the default counter
    /// striping.
    ///
    /// `size` may be zero; such a set has no words and every operation is a
    /// no-op or "not found".
    pub fn new(size: usize) -> Self {
        Self::with_config(size, StripedCounterConfig::default())
    }

    /// Creates an all-zero bitset of `size` bits with an explicit counter
    /// config.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`StripedCounterConfig::validate`].
    pub fn with_config(size: usize, config: StripedCounterConfig) -> Self {
        let words = (0..words_for_bits(size))
            .map(|_| AtomicU64::new(0))
            .collect();
        Self {
            words,
            bit_length: size,
            count: StripedCounter::new(config),
        }
    }

    /// Hydrates a bitset of `size` bits from a flat word array.
    ///
    /// Copies `min(data.len(), words_for_bits(size))` words. Excess words are
    /// ignored and missing words read as zero. Bits at positions `>= size` in
    /// the last word are masked off (and reported via `tracing::warn!`), so
    /// `cardinality()` only ever counts addressable bits.
    ///
    /// Use [`try_from_words`](Self::try_from_words) to reject malformed input
    /// instead.
    pub fn from_words(data: &[u64], size: usize) -> Self {
        Self::from_words_with_config(data, size, StripedCounterConfig::default())
    }

    /// [`from_words`](Self::from_words) with an explicit counter config.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`StripedCounterConfig::validate`].
    pub fn from_words_with_config(
        data: &[u64],
        size: usize,
        config: StripedCounterConfig,
    ) -> Self {
        let word_len = words_for_bits(size);
        let copied = data.len().min(word_len);
        let tail_mask = last_word_mask(size);

        let mut population = 0u64;
        let mut stray_bits = 0u32;
        let words: Box<[AtomicU64]> = (0..word_len)
            .map(|i| {
                let mut word = if i < copied { data[i] } else { 0 };
                if i + 1 == word_len {
                    stray_bits += (word & !tail_mask).count_ones();
                    word &= tail_mask;
                }
                population += u64::from(word.count_ones());
                AtomicU64::new(word)
            })
            .collect();

        if data.len() > word_len {
            tracing::debug!(
                size,
                supplied = data.len(),
                ignored = data.len() - word_len,
                "ignoring excess words during bitset hydration"
            );
        }
        if stray_bits > 0 {
            tracing::warn!(
                size,
                stray_bits,
                "masked padding bits beyond bitset size during hydration"
            );
        }
        tracing::debug!(
            size,
            supplied = data.len(),
            copied,
            cardinality = population,
            "hydrated concurrent bitset"
        );

        Self {
            words,
            bit_length: size,
            count: StripedCounter::with_initial(config, population as i64),
        }
    }

    /// Strict hydration: the word array must have exactly
    /// `words_for_bits(size)` entries and no padding bits set.
    ///
    /// # Errors
    ///
    /// - [`HydrateError::WordCountMismatch`] if `data.len()` is wrong.
    /// - [`HydrateError::PaddingBitsSet`] if the last word has bits at
    ///   positions `>= size`.
    pub fn try_from_words(data: &[u64], size: usize) -> Result<Self, HydrateError> {
        let expected = words_for_bits(size);
        if data.len() != expected {
            return Err(HydrateError::WordCountMismatch {
                got: data.len(),
                expected,
            });
        }
        if let Some(&last) = data.last() {
            let stray = last & !last_word_mask(size);
            if stray != 0 {
                return Err(HydrateError::PaddingBitsSet {
                    word: expected - 1,
                    stray,
                });
            }
        }
        Ok(Self::from_words(data, size))
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Returns the number of backing words.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Sets `bit`. No-op if already set or if `bit >= bit_length()`.
    #[inline]
    pub fn set(&self, bit: usize) {
        self.test_and_set(bit);
    }

    /// Clears `bit`. No-op if already clear or if `bit >= bit_length()`.
    #[inline]
    pub fn clear(&self, bit: usize) {
        self.test_and_clear(bit);
    }

    /// Sets `bit` and returns `true` iff this call flipped it from unset.
    ///
    /// Among concurrent callers racing on the same unset bit, exactly one
    /// observes `true`. Returns `false` for `bit >= bit_length()`.
    #[inline]
    pub fn test_and_set(&self, bit: usize) -> bool {
        if bit >= self.bit_length {
            return false;
        }
        let (word_idx, mask) = locate(bit);
        let flipped = self.update_word(word_idx, |w| w | mask);
        if flipped {
            self.count.increment();
        }
        flipped
    }

    /// Clears `bit` and returns `true` iff this call flipped it from set.
    ///
    /// Returns `false` for `bit >= bit_length()`.
    #[inline]
    pub fn test_and_clear(&self, bit: usize) -> bool {
        if bit >= self.bit_length {
            return false;
        }
        let (word_idx, mask) = locate(bit);
        let flipped = self.update_word(word_idx, |w| w & !mask);
        if flipped {
            self.count.decrement();
        }
        flipped
    }

    /// CAS loop applying `apply` to one word. Returns `true` if this call
    /// installed a changed value, `false` if `apply` was already a no-op.
    #[inline(always)]
    fn update_word(&self, word_idx: usize, apply: impl Fn(u64) -> u64) -> bool {
        let word = &self.words[word_idx];
        let mut current = word.load(Ordering::Acquire);
        loop {
            let next = apply(current);
            if next == current {
                // Nothing to do: leave the cache line clean.
                return false;
            }
            match word.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns whether `bit` is set. `false` for `bit >= bit_length()`.
    #[inline]
    pub fn is_set(&self, bit: usize) -> bool {
        if bit >= self.bit_length {
            return false;
        }
        let (word_idx, mask) = locate(bit);
        (self.words[word_idx].load(Ordering::Acquire) & mask) != 0
    }

    /// Index of the first set bit at or after `from`, or `None`.
    ///
    /// Words are loaded one at a time; see the module-level consistency
    /// notes.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let mut word_idx = from / WORD_BITS;
        let first = self.words.get(word_idx)?;
        let mut word = first.load(Ordering::Acquire) & (u64::MAX << (from % WORD_BITS));
        loop {
            if word != 0 {
                let idx = word_idx * WORD_BITS + word.trailing_zeros() as usize;
                return (idx < self.bit_length).then_some(idx);
            }
            word_idx += 1;
            word = self.words.get(word_idx)?.load(Ordering::Acquire);
        }
    }

    /// Returns `true` when the counter reads zero.
    ///
    /// Eventually consistent with the words: an in-flight `set`/`clear` may
    /// have flipped its word without yet updating the counter.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count.sum() <= 0
    }

    /// Number of set bits, per the striped counter.
    ///
    /// Same consistency caveat as [`is_empty`](Self::is_empty). A transiently
    /// negative fold (a `clear` decrement landing before the matching `set`
    /// increment) reads as zero.
    #[inline]
    pub fn cardinality(&self) -> usize {
        usize::try_from(self.count.sum().max(0)).unwrap_or(usize::MAX)
    }

    /// Copies the backing words, one independent load per word.
    ///
    /// The result has `word_len()` entries in the LSB-first layout accepted
    /// by [`from_words`](Self::from_words). `bit_length()` must be stored
    /// alongside it; it cannot be recovered from the words.
    pub fn to_words(&self) -> Vec<u64> {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire))
            .collect()
    }

    /// Weakly-consistent iterator over set bits in ascending order.
    #[inline]
    pub fn iter(&self) -> SetBits<'_> {
        SetBits {
            set: self,
            cursor: 0,
        }
    }
}

impl<'a> IntoIterator for &'a ConcurrentBitSet {
    type Item = usize;
    type IntoIter = SetBits<'a>;

    fn into_iter(self) -> SetBits<'a> {
        self.iter()
    }
}

/// Ascending iterator over set bits, produced by [`ConcurrentBitSet::iter`].
///
/// Each step is a [`next_set_bit`](ConcurrentBitSet::next_set_bit) call from
/// just past the previous result. Bits set behind the cursor are never
/// revisited; bits ahead of it are seen if they are set when their word is
/// read.
pub struct SetBits<'a> {
    set: &'a ConcurrentBitSet,
    cursor: usize,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self.set.next_set_bit(self.cursor) {
            Some(idx) => {
                // idx < bit_length <= usize::MAX, so this cannot overflow.
                self.cursor = idx + 1;
                Some(idx)
            }
            None => {
                self.cursor = self.set.bit_length;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.set.bit_length.saturating_sub(self.cursor)))
    }
}

// Once exhausted the cursor sits at `bit_length`, where `next_set_bit` can
// only return `None`.
impl FusedIterator for SetBits<'_> {}

// ---------------------------------------------------------------------------
// Test module includes
// ---------------------------------------------------------------------------

#[cfg(any(all(test, not(loom)), kani))]
#[path = "concurrent_bitset_tests.rs"]
mod concurrent_bitset_tests;

// ---------------------------------------------------------------------------
// Loom concurrency tests
// ---------------------------------------------------------------------------

#[cfg(loom)]
mod loom_tests {
    use super::*;
    use loom::sync::atomic::AtomicUsize;
    use loom::sync::Arc;
    use loom::thread;

    fn small(size: usize) -> ConcurrentBitSet {
        ConcurrentBitSet::with_config(size, StripedCounterConfig { stripes: 2 })
    }

    /// Two threads race to set the same bit — exactly one flips it.
    #[test]
    fn same_bit_race_counts_once() {
        loom::model(|| {
            let bs = Arc::new(small(64));
            let bs2 = bs.clone();

            let h = thread::spawn(move || bs2.test_and_set(5));
            let won_main = bs.test_and_set(5);
            let won_thread = h.join().unwrap();

            assert!(
                won_main ^ won_thread,
                "exactly one caller must win: main={won_main}, thread={won_thread}"
            );
            assert!(bs.is_set(5));
            assert_eq!(bs.cardinality(), 1);
        });
    }

    /// Different bits in one word force the CAS retry path; neither is lost.
    #[test]
    fn same_word_no_lost_updates() {
        loom::model(|| {
            let bs = Arc::new(small(64));
            let bs2 = bs.clone();

            let h = thread::spawn(move || bs2.set(1));
            bs.set(0);
            h.join().unwrap();

            assert_eq!(bs.to_words(), vec![0b11]);
            assert_eq!(bs.cardinality(), 2);
        });
    }

    /// Racing set and clear on one bit leave the counter matching the word.
    #[test]
    fn set_clear_race_keeps_counter_exact() {
        loom::model(|| {
            let bs = Arc::new(small(64));
            bs.set(3);
            let bs2 = bs.clone();

            let h = thread::spawn(move || bs2.clear(3));
            bs.set(4);
            bs.set(3);
            h.join().unwrap();

            let expected = bs.to_words()[0].count_ones() as usize;
            assert_eq!(bs.cardinality(), expected);
            assert!(bs.is_set(4));
        });
    }

    /// Observing a set bit publishes the setter's prior writes.
    #[test]
    fn set_publishes_prior_writes() {
        loom::model(|| {
            let bs = Arc::new(small(64));
            let payload = Arc::new(AtomicUsize::new(0));
            let (bs2, payload2) = (bs.clone(), payload.clone());

            let h = thread::spawn(move || {
                payload2.store(42, Ordering::Relaxed);
                bs2.set(7);
            });

            if bs.is_set(7) {
                assert_eq!(payload.load(Ordering::Relaxed), 42);
            }
            h.join().unwrap();
        });
    }
}

// ---------------------------------------------------------------------------
// Concurrent smoke tests
// ---------------------------------------------------------------------------
