//! Property-based tests for `ConcurrentBitSet` against a sequential model.
//!
//! Run with: `cargo test --test property`
//! Case counts: `PROPTEST_CASES` overrides; CI runs the full default.

mod bitset_props;
mod hydrate_props;
mod support;
