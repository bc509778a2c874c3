// File: crates/chart-core/src/downsample.rs
// Summary: Largest-Triangle-Three-Buckets reduction for ordered XY sequences.

/// Point budget applied to individual-value series.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Largest-Triangle-Three-Buckets downsampling for XY series.
/// Returns up to `threshold` points preserving overall shape.
pub fn lttb(points: &[(f64, f64)], threshold: usize) -> Vec<(f64, f64)> {
    lttb_indices(points, threshold).into_iter().map(|i| points[i]).collect()
}

/// Indices (ascending) of the points LTTB keeps, so callers can carry payloads along.
///
/// Interior points are split into buckets of `ceil((n - 2) / (threshold - 2))` points.
/// From each bucket the point forming the largest triangle with the previously kept point
/// and the average of the next bucket is kept. First and last points always survive.
pub fn lttb_indices(points: &[(f64, f64)], threshold: usize) -> Vec<usize> {
    let n = points.len();
    if threshold == 0 || n == 0 { return Vec::new(); }
    if threshold >= n || n <= 2 { return (0..n).collect(); }
    if threshold == 1 { return vec![0]; }
    if threshold == 2 { return vec![0, n - 1]; }

    let last = n - 1;
    let bucket = (n - 2).div_ceil(threshold - 2);
    let mut kept = Vec::with_capacity(threshold);
    // Always include first
    kept.push(0);

    let mut a = 0usize; // index of the point kept from the previous bucket
    let mut start = 1usize;
    while start < last {
        let end = (start + bucket).min(last);

        // Average of the next bucket; the last point stands in past the final bucket.
        let next_end = (end + bucket).min(last);
        let (avg_x, avg_y) = if end < next_end {
            let count = (next_end - end) as f64;
            let (sx, sy) = points[end..next_end]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
            (sx / count, sy / count)
        } else {
            points[last]
        };

        let (a_x, a_y) = points[a];
        let mut max_area = -1.0f64;
        let mut max_idx = start;
        for (k, p) in points.iter().enumerate().take(end).skip(start) {
            // Triangle area via cross product magnitude
            let area = ((a_x - p.0) * (avg_y - a_y) - (a_x - avg_x) * (p.1 - a_y)).abs();
            if area > max_area {
                max_area = area;
                max_idx = k;
            }
        }
        kept.push(max_idx);
        a = max_idx;
        start = end;
    }

    // Always include last
    kept.push(last);
    kept
}
