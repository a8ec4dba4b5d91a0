//! Evenly spaced evaluation of a compiled function, the input of plotting and of the
//! sampling-based range estimate.
use crate::symbolic::symbolic_lambdify::NumericCallable;
use crate::symbolic::utils::round_to;
use log::debug;

/// Largest number of points a window may be split into.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Number of points of `grid(window, step)`; `None` for a degenerate window or step, or
/// when the count would exceed [`MAX_GRID_POINTS`].
pub fn grid_len(window: (f64, f64), step: f64) -> Option<usize> {
    let (lo, hi) = window;
    if !(step > 0.0) || !lo.is_finite() || !hi.is_finite() || hi < lo {
        return None;
    }
    let intervals = ((hi - lo) / step + 1e-9).floor();
    if !intervals.is_finite() || intervals >= MAX_GRID_POINTS as f64 {
        return None;
    }
    Some(intervals as usize + 1)
}

/// Grid points lo, lo + step, ..., up to and including hi (within half a step).
///
/// Abscissae are computed from integer indices, so there is no drift from repeated
/// addition: `grid((-10.0, 10.0), 0.1)` has exactly 201 points and contains 0.
/// Empty when [`grid_len`] refuses the window.
pub fn grid(window: (f64, f64), step: f64) -> Vec<f64> {
    let Some(len) = grid_len(window, step) else {
        debug!("no grid on [{}, {}] with step {}", window.0, window.1, step);
        return Vec::new();
    };
    (0..len)
        .map(|i| round_to(window.0 + i as f64 * step, 12))
        .collect()
}

/// Ordered `(x, y)` pairs over `window`; points where evaluation fails carry `y = NaN`.
pub fn sample(callable: &NumericCallable, window: (f64, f64), step: f64) -> Vec<(f64, f64)> {
    let points: Vec<(f64, f64)> = grid(window, step)
        .into_iter()
        .map(|x| (x, callable.value_or_nan(x)))
        .collect();
    debug!(
        "sampled {} on [{}, {}] step {}: {} points, {} undefined",
        callable.source(),
        window.0,
        window.1,
        step,
        points.len(),
        points.iter().filter(|(_, y)| y.is_nan()).count()
    );
    points
}

/// Values at the integers `lo..=hi` (the coarse table printed next to a plot).
pub fn integer_table(callable: &NumericCallable, grid: (i64, i64)) -> Vec<(i64, f64)> {
    (grid.0..=grid.1)
        .map(|x| (x, callable.value_or_nan(x as f64)))
        .collect()
}
