//! Integer helpers for pyramid depth selection.

/// Returns `floor(log2(value))`, or `None` for zero.
pub(crate) fn floor_log2(value: u64) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(63 - value.leading_zeros())
    }
}

/// Largest `n` such that `base * 2^n <= limit`, i.e. `floor(log2(limit / base))`.
///
/// Returns `None` when even `n = 0` does not fit.
pub(crate) fn max_doublings(base: u64, limit: u64) -> Option<u32> {
    if base == 0 || base > limit {
        return None;
    }
    let mut n = 0u32;
    let mut scaled = base;
    while let Some(next) = scaled.checked_mul(2) {
        if next > limit {
            break;
        }
        scaled = next;
        n += 1;
    }
    Some(n)
}
