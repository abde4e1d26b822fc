//! Concurrent bit-level data structures.

pub mod concurrent_bitset;
pub mod hydrate_error;
pub mod striped_counter;
pub mod words;

pub use concurrent_bitset::{ConcurrentBitSet, SetBits};
pub use hydrate_error::HydrateError;
pub use striped_counter::{StripedCounter, StripedCounterConfig, MAX_STRIPES};
pub use words::{last_word_mask, words_for_bits, WORD_BITS};
