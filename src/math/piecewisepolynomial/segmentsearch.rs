// ─────────────────────────────────────────────
// Segment search
// ─────────────────────────────────────────────
//
// 兩種搜尋方式必須回傳相同的區間索引：
//   breakpoints[i] <= x < breakpoints[i+1]   (右連續)
//   x <  breakpoints[1]    → 0
//   x >= breakpoints[n-1]  → n-1
//
// 呼叫端保證 breakpoints 至少兩個、嚴格遞增，且 x 為有限值。

/// Biased bisection over breakpoint indices.
///
/// The probe sits 40% of the way from `low` to `high` (rounded up), which
/// favours the lower segments where the measure functions carry most of their
/// breakpoints.
pub(crate) fn biased_bisection(breakpoints: &[f64], x: f64) -> usize {
    let segments = breakpoints.len() - 1;
    if segments == 1 {
        return 0;
    }
    if x >= breakpoints[segments - 1] {
        return segments - 1;
    }
    if x < breakpoints[1] {
        return 0;
    }

    // breakpoints[low] <= x < breakpoints[high]
    let mut low = 1;
    let mut high = segments - 1;
    while high - low > 1 {
        let middle = low + (2 * (high - low) + 4) / 5;
        if x < breakpoints[middle] {
            high = middle;
        } else {
            low = middle;
        }
    }
    low
}

/// Counts the interior breakpoints not greater than `x`.
pub(crate) fn partition_search(breakpoints: &[f64], x: f64) -> usize {
    let segments = breakpoints.len() - 1;
    breakpoints[1..segments].partition_point(|&b| b <= x)
}
