//! Fibonacci numbers with explicit overflow handling.

/// Largest `n` whose Fibonacci number fits in a `u64`.
pub const MAX_FIB_INPUT: u64 = 93;

/// Returns the `n`th Fibonacci number (`fib(0) = 0`, `fib(1) = 1`).
///
/// Iterates with two accumulators, so it runs in O(n) time and constant space. Returns `None` when
/// the result does not fit in a `u64`, i.e. for `n > MAX_FIB_INPUT`; the loop stops at the first
/// overflowing step, so large inputs cost at most `MAX_FIB_INPUT + 1` iterations.
pub fn fib(n: u64) -> Option<u64> {
    if n <= 1 {
        return Some(n);
    }
    let (mut prev, mut cur) = (0u64, 1u64);
    for _ in 1..n {
        let next = prev.checked_add(cur)?;
        prev = cur;
        cur = next;
    }
    Some(cur)
}
