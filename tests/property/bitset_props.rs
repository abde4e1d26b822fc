use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::support::{model_vec, proptest_cases, scan_all, striped};

const PROPTEST_CASES: u32 = 64;

#[derive(Clone, Debug)]
enum Op {
    Set(usize),
    Clear(usize),
}

fn op_strategy(max_idx: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..max_idx).prop_map(Op::Set),
        (0..max_idx).prop_map(Op::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases(PROPTEST_CASES)))]

    /// Second set/clear of the same bit never moves the cardinality.
    #[test]
    fn set_and_clear_are_idempotent(size in 1usize..300, idx_factor in 0.0f64..1.0) {
        let idx = ((size - 1) as f64 * idx_factor) as usize;
        let bs = striped(size);

        bs.set(idx);
        let after_first = bs.cardinality();
        bs.set(idx);
        prop_assert_eq!(bs.cardinality(), after_first);
        prop_assert_eq!(after_first, 1);

        bs.clear(idx);
        let after_clear = bs.cardinality();
        bs.clear(idx);
        prop_assert_eq!(bs.cardinality(), after_clear);
        prop_assert_eq!(after_clear, 0);
    }

    /// set(b) then clear(b) on a previously clear bit restores words and count.
    #[test]
    fn set_clear_is_inverse(
        size in 1usize..300,
        prefill in prop::collection::vec(0usize..300, 0..40),
        probe in 0usize..300,
    ) {
        let bs = striped(size);
        for &b in &prefill {
            bs.set(b);
        }
        prop_assume!(probe < size && !bs.is_set(probe));

        let words = bs.to_words();
        let card = bs.cardinality();
        bs.set(probe);
        bs.clear(probe);

        prop_assert_eq!(bs.to_words(), words);
        prop_assert_eq!(bs.cardinality(), card);
    }

    /// Indices at or past `size` never change anything.
    #[test]
    fn out_of_range_never_mutates(
        size in 0usize..300,
        prefill in prop::collection::vec(0usize..300, 0..40),
        offset in 0usize..10_000,
    ) {
        let bs = striped(size);
        for &b in &prefill {
            bs.set(b);
        }
        let words = bs.to_words();
        let card = bs.cardinality();

        let bit = size.saturating_add(offset);
        bs.set(bit);
        bs.clear(bit);
        bs.set(usize::MAX);

        prop_assert_eq!(bs.to_words(), words);
        prop_assert_eq!(bs.cardinality(), card);
    }

    /// Random op sequences match a `BTreeSet` model: cardinality, scan
    /// order, iterator, and per-bit reads.
    #[test]
    fn sequential_model_equivalence(
        size in 1usize..260,
        ops in prop::collection::vec(op_strategy(300), 1..128),
    ) {
        let bs = striped(size);
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Set(b) => {
                    let flipped = bs.test_and_set(b);
                    let model_flipped = b < size && model.insert(b);
                    prop_assert_eq!(flipped, model_flipped, "set({})", b);
                }
                Op::Clear(b) => {
                    let flipped = bs.test_and_clear(b);
                    let model_flipped = model.remove(&b);
                    prop_assert_eq!(flipped, model_flipped, "clear({})", b);
                }
            }
        }

        let expected = model_vec(&model);
        prop_assert_eq!(bs.cardinality(), model.len());
        prop_assert_eq!(bs.is_empty(), model.is_empty());
        prop_assert_eq!(scan_all(&bs), expected.clone());
        prop_assert_eq!(bs.iter().collect::<Vec<_>>(), expected);
        for b in 0..size {
            prop_assert_eq!(bs.is_set(b), model.contains(&b));
        }
    }

    /// `next_set_bit(from)` is the model's first element `>= from`.
    #[test]
    fn next_set_bit_matches_model(
        size in 1usize..260,
        bits in prop::collection::btree_set(0usize..260, 0..48),
        from in 0usize..400,
    ) {
        let bs = striped(size);
        let model: BTreeSet<usize> = bits.into_iter().filter(|&b| b < size).collect();
        for &b in &model {
            bs.set(b);
        }

        prop_assert_eq!(bs.next_set_bit(from), model.range(from..).next().copied());
    }
}
