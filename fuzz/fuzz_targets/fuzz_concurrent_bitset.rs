#![no_main]

use libfuzzer_sys::fuzz_target;

use concurrent_bitset::{ConcurrentBitSet, StripedCounterConfig};

// Interprets a byte stream as an operation sequence against
// `ConcurrentBitSet`, checking every result against a `Vec<bool>` model.
//
// Byte layout:
// - Byte 0 → `size` (0..=255; zero-size sets are valid)
// - Remaining bytes as `(opcode, operand)` pairs. Operands are NOT reduced
//   modulo `size`, so out-of-range indices are exercised too:
//   - 0 → `test_and_set(operand)`
//   - 1 → `test_and_clear(operand)`
//   - 2 → `is_set(operand)`
//   - 3 → `next_set_bit(operand)`
//   - 4 → `cardinality()` / `is_empty()`
//   - 5 → round trip through `to_words` / `from_words`
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let size = data[0] as usize;
    let mut bs = ConcurrentBitSet::with_config(size, StripedCounterConfig { stripes: 2 });
    let mut model = vec![false; size];

    let ops = &data[1..];
    let mut i = 0;
    while i + 1 < ops.len() {
        let opcode = ops[i];
        let idx = ops[i + 1] as usize;
        i += 2;

        match opcode % 6 {
            0 => {
                let flipped = bs.test_and_set(idx);
                let model_flipped = idx < size && !model[idx];
                if idx < size {
                    model[idx] = true;
                }
                assert_eq!(flipped, model_flipped, "test_and_set({idx}) mismatch");
            }
            1 => {
                let flipped = bs.test_and_clear(idx);
                let model_flipped = idx < size && model[idx];
                if idx < size {
                    model[idx] = false;
                }
                assert_eq!(flipped, model_flipped, "test_and_clear({idx}) mismatch");
            }
            2 => {
                let expected = idx < size && model[idx];
                assert_eq!(bs.is_set(idx), expected, "is_set({idx}) mismatch");
            }
            3 => {
                let expected = model.iter().skip(idx).position(|&b| b).map(|p| p + idx);
                assert_eq!(bs.next_set_bit(idx), expected, "next_set_bit({idx}) mismatch");
            }
            4 => {
                let expected = model.iter().filter(|&&b| b).count();
                assert_eq!(bs.cardinality(), expected, "cardinality mismatch");
                assert_eq!(bs.is_empty(), expected == 0, "is_empty mismatch");
            }
            _ => {
                bs = ConcurrentBitSet::from_words_with_config(
                    &bs.to_words(),
                    size,
                    StripedCounterConfig { stripes: 2 },
                );
            }
        }
    }

    // Final consistency check.
    let expected: Vec<usize> = (0..size).filter(|&b| model[b]).collect();
    assert_eq!(bs.iter().collect::<Vec<_>>(), expected, "final scan mismatch");
    assert_eq!(bs.cardinality(), expected.len(), "final cardinality mismatch");
});
