#![no_main]

use libfuzzer_sys::fuzz_target;

use concurrent_bitset::{last_word_mask, words_for_bits, ConcurrentBitSet};

// Hydrates arbitrary words and checks that padding never leaks.
//
// Byte layout:
// - Bytes 0..2 → `size` (little-endian u16)
// - Remaining bytes → words, 8 bytes each (little-endian, trailing partial
//   word dropped)
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let size = u16::from_le_bytes([data[0], data[1]]) as usize;
    let words: Vec<u64> = data[2..]
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect();

    let bs = ConcurrentBitSet::from_words(&words, size);
    let out = bs.to_words();
    assert_eq!(out.len(), words_for_bits(size));
    if let Some(&last) = out.last() {
        assert_eq!(last & !last_word_mask(size), 0, "padding leaked");
    }

    let population: usize = out.iter().map(|w| w.count_ones() as usize).sum();
    assert_eq!(bs.cardinality(), population);
    assert!(bs.iter().all(|b| b < size));
    assert_eq!(bs.iter().count(), population);

    match ConcurrentBitSet::try_from_words(&words, size) {
        Ok(strict) => assert_eq!(strict.to_words(), words),
        Err(_) => assert_ne!(out, words),
    }
});
