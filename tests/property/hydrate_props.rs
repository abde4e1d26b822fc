use proptest::prelude::*;

use concurrent_bitset::{last_word_mask, words_for_bits, ConcurrentBitSet, HydrateError};

use crate::support::{proptest_cases, scan_all, striped};

const PROPTEST_CASES: u32 = 64;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases(PROPTEST_CASES)))]

    /// to_words → from_words preserves cardinality and the ordered bit list.
    #[test]
    fn words_round_trip(
        size in 0usize..400,
        bits in prop::collection::vec(0usize..400, 0..64),
    ) {
        let bs = striped(size);
        for &b in &bits {
            bs.set(b);
        }

        let words = bs.to_words();
        prop_assert_eq!(words.len(), words_for_bits(size));

        let restored = ConcurrentBitSet::from_words(&words, size);
        prop_assert_eq!(restored.cardinality(), bs.cardinality());
        prop_assert_eq!(scan_all(&restored), scan_all(&bs));

        let strict = ConcurrentBitSet::try_from_words(&words, size).unwrap();
        prop_assert_eq!(strict.to_words(), words);
    }

    /// Arbitrary words hydrate into a set whose counter, scan and export
    /// agree, with padding masked away.
    #[test]
    fn arbitrary_words_hydrate_consistently(
        size in 0usize..300,
        data in prop::collection::vec(any::<u64>(), 0..8),
    ) {
        let bs = ConcurrentBitSet::from_words(&data, size);
        let words = bs.to_words();
        let word_len = words_for_bits(size);
        prop_assert_eq!(words.len(), word_len);

        for (i, &w) in words.iter().enumerate() {
            let mut expected = data.get(i).copied().unwrap_or(0);
            if i + 1 == word_len {
                expected &= last_word_mask(size);
            }
            prop_assert_eq!(w, expected, "word {}", i);
        }

        let population: usize = words.iter().map(|w| w.count_ones() as usize).sum();
        prop_assert_eq!(bs.cardinality(), population);
        prop_assert_eq!(scan_all(&bs).len(), population);
    }

    /// Strict hydration accepts exactly the inputs the lenient path would
    /// copy verbatim.
    #[test]
    fn strict_hydration_agrees_with_masking(
        size in 1usize..300,
        data in prop::collection::vec(any::<u64>(), 0..8),
    ) {
        let word_len = words_for_bits(size);
        match ConcurrentBitSet::try_from_words(&data, size) {
            Ok(bs) => {
                prop_assert_eq!(bs.to_words(), data);
            }
            Err(HydrateError::WordCountMismatch { got, expected }) => {
                prop_assert_eq!(got, data.len());
                prop_assert_eq!(expected, word_len);
                prop_assert_ne!(got, expected);
            }
            Err(HydrateError::PaddingBitsSet { word, stray }) => {
                prop_assert_eq!(data.len(), word_len);
                prop_assert_eq!(word, word_len - 1);
                prop_assert_eq!(stray, data[word] & !last_word_mask(size));
                prop_assert_ne!(stray, 0);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}
