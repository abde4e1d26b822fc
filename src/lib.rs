//! Fixed-capacity bitset that many threads can mutate without a lock.
//!
//! ## Scope
//! [`ConcurrentBitSet`] holds `size` bits in `AtomicU64` words. It supports
//! single-bit `set`/`clear`, a cardinality query backed by a striped counter,
//! a forward "next set bit" scan, and bulk export/import of the flat word
//! array for persistence.
//!
//! ## Key invariants
//! - Each word is mutated by its own CAS loop; there is no global lock.
//! - Out-of-range indices are silent no-ops, never errors or panics.
//! - Padding bits past `size` are never observable as set.
//! - Once writers quiesce, `cardinality()` equals the population count of the
//!   words.
//!
//! ## Consistency
//! Multi-word reads (`next_set_bit`, `iter`, `to_words`) and counter reads
//! (`cardinality`, `is_empty`) are linearizable per word or stripe only. They
//! never describe one global instant while writers are active.
//!
//! ## Notable entry points
//! - [`ConcurrentBitSet`]: the bitset.
//! - [`StripedCounterConfig`]: counter striping; defaults to one stripe per
//!   hardware thread.
//! - [`HydrateError`]: rejections from strict hydration
//!   ([`ConcurrentBitSet::try_from_words`]).

pub mod stdx;

pub use stdx::{
    last_word_mask, words_for_bits, ConcurrentBitSet, HydrateError, SetBits, StripedCounter,
    StripedCounterConfig, MAX_STRIPES, WORD_BITS,
};
