use std::collections::BTreeSet;

use concurrent_bitset::{ConcurrentBitSet, StripedCounterConfig};

pub fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
}

fn is_ci() -> bool {
    std::env::var_os("CI").is_some()
}

/// Local runs are capped low; CI or `PROPTEST_CASES` get the full count.
pub fn proptest_cases(default: u32) -> u32 {
    if let Some(value) = env_u32("PROPTEST_CASES") {
        return value.max(1);
    }
    if is_ci() {
        return default.max(1);
    }
    default.clamp(1, 32)
}

/// Bitset with a small striped counter so several stripes are exercised.
pub fn striped(size: usize) -> ConcurrentBitSet {
    ConcurrentBitSet::with_config(size, StripedCounterConfig { stripes: 4 })
}

/// Walks `next_set_bit` from zero until exhaustion.
pub fn scan_all(bs: &ConcurrentBitSet) -> Vec<usize> {
    let mut out = Vec::new();
    let mut next = bs.next_set_bit(0);
    while let Some(idx) = next {
        out.push(idx);
        next = bs.next_set_bit(idx + 1);
    }
    out
}

pub fn model_vec(model: &BTreeSet<usize>) -> Vec<usize> {
    model.iter().copied().collect()
}
