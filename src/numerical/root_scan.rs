//! Sign-change scan with bisection refinement: the numeric x-intercept search.
//!
//! The window is sampled on a fixed grid; every pair of consecutive finite samples with
//! opposite signs brackets a root (or a pole) and is refined by bisection. Refined points
//! where |f| exceeds both bracket ends are poles and are dropped.
use crate::analysis::config::RootSettings;
use crate::errors::{PointFailure, RootFindingError};
use crate::numerical::bisection::{NonlinearFunction, ScalarRootFinder};
use crate::numerical::sampling::grid;
use crate::symbolic::symbolic_lambdify::NumericCallable;
use itertools::Itertools;
use log::{debug, info};

/// Where a numeric root came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOrigin {
    /// a grid point where f vanishes
    GridPoint,
    /// bisection converged inside a sign-change bracket
    Bisection,
    /// bisection could not finish; midpoint of the bracket
    Midpoint,
}

/// One numeric root candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedRoot {
    pub x: f64,
    pub value: f64,
    pub origin: RootOrigin,
}

/// a grid sample is a zero only when it is this much smaller than its neighbours
const ZERO_RATIO: f64 = 1e-3;

/// Numeric roots in `settings.window`, ascending, deduplicated and capped.
pub fn scan_roots(callable: &NumericCallable, settings: &RootSettings) -> Vec<ScannedRoot> {
    let finder = ScalarRootFinder::with_config(settings.bisection_config());
    let samples: Vec<(f64, Option<f64>)> = grid(settings.window, settings.step)
        .into_iter()
        .map(|x| (x, callable.evaluate(x).ok()))
        .collect();

    let zeros: Vec<bool> = (0..samples.len())
        .map(|i| is_grid_zero(&samples, i, settings.tolerance))
        .collect();
    let mut candidates: Vec<ScannedRoot> = samples
        .iter()
        .zip(&zeros)
        .filter_map(|(&(x, y), &zero)| match y {
            Some(y) if zero => Some(ScannedRoot {
                x,
                value: y,
                origin: RootOrigin::GridPoint,
            }),
            _ => None,
        })
        .collect();

    for ((&(a, fa), &zero_a), (&(b, fb), &zero_b)) in
        samples.iter().zip(&zeros).tuple_windows()
    {
        let (Some(fa), Some(fb)) = (fa, fb) else {
            continue;
        };
        if zero_a || zero_b || fa == 0.0 || fb == 0.0 || fa.signum() == fb.signum() {
            continue;
        }
        if let Some(root) = refine(callable, &finder, (a, fa), (b, fb)) {
            candidates.push(root);
        }
    }

    candidates.sort_by(|p, q| p.x.total_cmp(&q.x));
    let roots = dedup(candidates, settings.dedup_threshold, settings.max_roots);
    info!(
        "numeric scan of {} on [{}, {}]: {} root(s)",
        callable.source(),
        settings.window.0,
        settings.window.1,
        roots.len()
    );
    roots
}

/// A sample is a root when it is exactly zero, or below `tolerance` and a sharp dip of |f|
/// relative to every neighbour. Small values on a flat, decaying tail are not roots.
fn is_grid_zero(samples: &[(f64, Option<f64>)], i: usize, tolerance: f64) -> bool {
    let Some(y) = samples[i].1 else {
        return false;
    };
    if y == 0.0 {
        return true;
    }
    if y.abs() >= tolerance {
        return false;
    }
    let neighbours: Vec<f64> = [i.checked_sub(1), Some(i + 1)]
        .into_iter()
        .flatten()
        .filter_map(|j| samples.get(j).and_then(|(_, value)| *value))
        .collect();
    !neighbours.is_empty()
        && neighbours
            .iter()
            .all(|n| y.abs() <= ZERO_RATIO * n.abs())
}

/// `f / scale`: bisection then stops on |f| small relative to the bracket, not in absolute
/// terms, so tiny-valued brackets are still refined in x.
struct ScaledFunction<'a> {
    callable: &'a NumericCallable,
    scale: f64,
}

impl NonlinearFunction for ScaledFunction<'_> {
    fn evaluate(&self, x: f64) -> Result<f64, PointFailure> {
        Ok(self.callable.evaluate(x)? / self.scale)
    }

    fn name(&self) -> &str {
        self.callable.source()
    }
}

/// Bisection inside one sign-change bracket. `None` for poles and failing brackets.
fn refine(
    callable: &NumericCallable,
    finder: &ScalarRootFinder,
    (a, fa): (f64, f64),
    (b, fb): (f64, f64),
) -> Option<ScannedRoot> {
    let bound = fa.abs().max(fb.abs());
    let scaled = ScaledFunction {
        callable,
        scale: bound.min(1.0),
    };
    let candidate = match finder.bisection(&scaled, a, b) {
        Ok(result) => ScannedRoot {
            x: result.root,
            value: callable.evaluate(result.root).ok()?,
            origin: RootOrigin::Bisection,
        },
        Err(RootFindingError::Point(failure)) => {
            debug!("bracket [{}, {}] dropped: {}", a, b, failure);
            return None;
        }
        Err(err) => {
            debug!("bracket [{}, {}]: {}, using the midpoint", a, b, err);
            let mid = 0.5 * (a + b);
            ScannedRoot {
                x: mid,
                value: callable.evaluate(mid).ok()?,
                origin: RootOrigin::Midpoint,
            }
        }
    };
    if candidate.value.abs() > bound {
        debug!("bracket [{}, {}] holds a pole near {}", a, b, candidate.x);
        return None;
    }
    Some(candidate)
}

/// Keeps the first of every run of roots closer than `threshold`, then caps the count.
fn dedup(sorted: Vec<ScannedRoot>, threshold: f64, cap: usize) -> Vec<ScannedRoot> {
    let mut kept: Vec<ScannedRoot> = Vec::new();
    for root in sorted {
        match kept.last() {
            Some(last) if (root.x - last.x).abs() < threshold => {}
            _ => kept.push(root),
        }
    }
    kept.truncate(cap);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::normalize;
    use crate::symbolic::symbolic_lambdify::compile;
    use std::f64::consts::PI;

    fn roots_of(text: &str) -> Vec<ScannedRoot> {
        let callable = compile(&normalize(text).unwrap()).unwrap();
        scan_roots(&callable, &RootSettings::default())
    }

    #[test]
    fn test_quadratic_roots() {
        let roots = roots_of("x^2 - 4");
        assert_eq!(roots.len(), 2);
        assert!((roots[0].x + 2.0).abs() < 1e-6);
        assert!((roots[1].x - 2.0).abs() < 1e-6);
        assert!(roots.iter().all(|r| r.origin == RootOrigin::GridPoint));
    }

    #[test]
    fn test_sine_roots_in_window() {
        let roots = roots_of("sin(x)");
        // kπ for k = -3..=3
        assert_eq!(roots.len(), 7);
        for (root, k) in roots.iter().zip(-3..=3) {
            assert!((root.x - k as f64 * PI).abs() < 1e-5, "{:?}", root);
            assert!(root.value.abs() < 1e-6);
        }
    }

    #[test]
    fn test_poles_are_not_roots() {
        assert!(roots_of("1/x").is_empty());
        assert!(roots_of("1/(x - 0.05)").is_empty());
        let roots = roots_of("tan(x)");
        assert!(roots.iter().all(|r| r.value.abs() < 1e-6));
        assert!(roots.iter().any(|r| r.x.abs() < 1e-9));
    }

    #[test]
    fn test_cap_and_order() {
        // sin(10x) has 64 roots in [-10, 10]
        let roots = roots_of("sin(10x)");
        assert_eq!(roots.len(), 10);
        assert!(roots.windows(2).all(|w| w[0].x < w[1].x));
        assert!(roots.windows(2).all(|w| w[1].x - w[0].x >= 1e-3));
    }

    #[test]
    fn test_decaying_tail_is_not_a_root() {
        let roots = roots_of("exp(-x^2)*sin(x)");
        // kπ for k = -3..=3, nothing from the flat tails
        assert_eq!(roots.len(), 7, "{:?}", roots);
        for (root, k) in roots.iter().zip(-3..=3) {
            assert!((root.x - k as f64 * PI).abs() < 1e-5, "{:?}", root);
        }
        assert!(roots_of("exp(-x^2)").is_empty());
        assert!(roots_of("exp(-x)").is_empty());
    }

    #[test]
    fn test_grid_zero_needs_a_dip() {
        let flat = vec![(0.0, Some(1e-40)), (0.1, Some(5e-41)), (0.2, Some(2e-41))];
        assert!(!is_grid_zero(&flat, 1, 1e-6));
        let dip = vec![(0.0, Some(0.1)), (0.1, Some(1e-15)), (0.2, Some(-0.1))];
        assert!(is_grid_zero(&dip, 1, 1e-6));
        let exact = vec![(0.0, Some(3e-50)), (0.1, Some(0.0)), (0.2, None)];
        assert!(is_grid_zero(&exact, 1, 1e-6));
        assert!(!is_grid_zero(&exact, 2, 1e-6));
    }

    #[test]
    fn test_no_roots() {
        assert!(roots_of("x^2 + 1").is_empty());
        assert!(roots_of("exp(x)").is_empty());
        assert!(roots_of("ln(x - 20)").is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_of_cluster() {
        let at = |x: f64| ScannedRoot {
            x,
            value: 0.0,
            origin: RootOrigin::Bisection,
        };
        let kept = dedup(vec![at(1.0), at(1.0005), at(1.5), at(2.0)], 1e-3, 2);
        assert_eq!(kept.iter().map(|r| r.x).collect::<Vec<_>>(), vec![1.0, 1.5]);
    }
}
