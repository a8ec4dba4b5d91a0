//! Subsets of the real line as sorted unions of disjoint intervals.
use crate::symbolic::utils::format_number;
use std::fmt;

/// One interval; infinite ends are always open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
    pub lo_closed: bool,
    pub hi_closed: bool,
}

impl Interval {
    pub fn new(lo: f64, hi: f64, lo_closed: bool, hi_closed: bool) -> Self {
        Self {
            lo,
            hi,
            lo_closed: lo_closed && lo.is_finite(),
            hi_closed: hi_closed && hi.is_finite(),
        }
    }

    pub fn open(lo: f64, hi: f64) -> Self {
        Self::new(lo, hi, false, false)
    }

    pub fn closed(lo: f64, hi: f64) -> Self {
        Self::new(lo, hi, true, true)
    }

    pub fn point(at: f64) -> Self {
        Self::closed(at, at)
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi || (self.lo == self.hi && !(self.lo_closed && self.hi_closed))
    }

    pub fn contains(&self, x: f64) -> bool {
        let above = x > self.lo || (self.lo_closed && x == self.lo);
        let below = x < self.hi || (self.hi_closed && x == self.hi);
        above && below
    }

    fn intersect(&self, other: &Interval) -> Interval {
        let (lo, lo_closed) = if self.lo > other.lo {
            (self.lo, self.lo_closed)
        } else if other.lo > self.lo {
            (other.lo, other.lo_closed)
        } else {
            (self.lo, self.lo_closed && other.lo_closed)
        };
        let (hi, hi_closed) = if self.hi < other.hi {
            (self.hi, self.hi_closed)
        } else if other.hi < self.hi {
            (other.hi, other.hi_closed)
        } else {
            (self.hi, self.hi_closed && other.hi_closed)
        };
        Interval::new(lo, hi, lo_closed, hi_closed)
    }

    /// Overlapping, or touching at a point one of them contains.
    fn joins(&self, next: &Interval) -> bool {
        next.lo < self.hi || (next.lo == self.hi && (self.hi_closed || next.lo_closed))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.lo == self.hi {
            return write!(f, "{{{}}}", format_number(self.lo));
        }
        write!(
            f,
            "{}{}, {}{}",
            if self.lo_closed { "[" } else { "(" },
            format_number(self.lo),
            format_number(self.hi),
            if self.hi_closed { "]" } else { ")" }
        )
    }
}

/// Normalized union of intervals: sorted, non-empty, pairwise disjoint and non-touching.
#[derive(Clone, Debug, PartialEq)]
pub struct RealSet {
    intervals: Vec<Interval>,
}

impl RealSet {
    pub fn all() -> Self {
        Self {
            intervals: vec![Interval::open(f64::NEG_INFINITY, f64::INFINITY)],
        }
    }

    pub fn empty() -> Self {
        Self { intervals: Vec::new() }
    }

    pub fn from_intervals(mut intervals: Vec<Interval>) -> Self {
        intervals.retain(|i| !i.is_empty());
        intervals.sort_by(|a, b| a.lo.total_cmp(&b.lo).then(b.lo_closed.cmp(&a.lo_closed)));
        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for next in intervals {
            match merged.last_mut() {
                Some(last) if last.joins(&next) => {
                    if next.hi > last.hi {
                        last.hi = next.hi;
                        last.hi_closed = next.hi_closed;
                    } else if next.hi == last.hi {
                        last.hi_closed |= next.hi_closed;
                    }
                }
                _ => merged.push(next),
            }
        }
        Self { intervals: merged }
    }

    pub fn from_points(points: &[f64]) -> Self {
        Self::from_intervals(points.iter().map(|p| Interval::point(*p)).collect())
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_all(&self) -> bool {
        *self == Self::all()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|i| i.contains(x))
    }

    pub fn intersect(&self, other: &RealSet) -> RealSet {
        let mut pieces = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                pieces.push(a.intersect(b));
            }
        }
        Self::from_intervals(pieces)
    }

    pub fn union(&self, other: &RealSet) -> RealSet {
        let mut pieces = self.intervals.clone();
        pieces.extend_from_slice(&other.intervals);
        Self::from_intervals(pieces)
    }

    /// Removes isolated points (zeros of a denominator, poles of a tangent, ...).
    pub fn exclude_points(&self, points: &[f64]) -> RealSet {
        let mut pieces = self.intervals.clone();
        for &p in points {
            pieces = pieces
                .into_iter()
                .flat_map(|i| {
                    if i.contains(p) {
                        vec![
                            Interval::new(i.lo, p, i.lo_closed, false),
                            Interval::new(p, i.hi, false, i.hi_closed),
                        ]
                    } else {
                        vec![i]
                    }
                })
                .collect();
        }
        Self::from_intervals(pieces)
    }

    /// Infimum and supremum, `None` for the empty set.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.intervals.first()?.lo, self.intervals.last()?.hi))
    }

    /// Points missing from an otherwise full line, if that is the shape of the set.
    fn punctures(&self) -> Option<Vec<f64>> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        if self.intervals.len() < 2 || first.lo.is_finite() || last.hi.is_finite() {
            return None;
        }
        self.intervals
            .windows(2)
            .map(|pair| (pair[0].hi == pair[1].lo).then_some(pair[0].hi))
            .collect()
    }
}

impl fmt::Display for RealSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        if self.is_all() {
            return write!(f, "ℝ");
        }
        if let Some(points) = self.punctures() {
            let listed: Vec<String> = points.iter().map(|p| format_number(*p)).collect();
            return write!(f, "ℝ \\ {{{}}}", listed.join(", "));
        }
        let parts: Vec<String> = self.intervals.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(" ∪ "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_normalization_merges() {
        let set = RealSet::from_intervals(vec![
            Interval::closed(2.0, 3.0),
            Interval::open(0.0, 1.0),
            Interval::new(1.0, 2.0, true, false),
        ]);
        assert_eq!(set.intervals(), &[Interval::new(0.0, 3.0, false, true)]);
        let set = RealSet::from_intervals(vec![Interval::open(0.0, 1.0), Interval::open(1.0, 2.0)]);
        assert_eq!(set.intervals().len(), 2);
    }

    #[test]
    fn test_intersect_and_contains() {
        let positive = RealSet::from_intervals(vec![Interval::new(0.0, INF, true, false)]);
        let below_two = RealSet::from_intervals(vec![Interval::open(-INF, 2.0)]);
        let both = positive.intersect(&below_two);
        assert_eq!(both.to_string(), "[0, 2)");
        assert!(both.contains(0.0));
        assert!(!both.contains(2.0));
        assert!(positive.intersect(&RealSet::empty()).is_empty());
    }

    #[test]
    fn test_exclude_points_display() {
        let set = RealSet::all().exclude_points(&[0.0]);
        assert_eq!(set.to_string(), "ℝ \\ {0}");
        assert!(!set.contains(0.0));
        let set = RealSet::all().exclude_points(&[-1.0, 1.0]);
        assert_eq!(set.to_string(), "ℝ \\ {-1, 1}");
        let set = RealSet::from_intervals(vec![Interval::new(0.0, INF, true, false)])
            .exclude_points(&[1.0]);
        assert_eq!(set.to_string(), "[0, 1) ∪ (1, ∞)");
    }

    #[test]
    fn test_display_special_sets() {
        assert_eq!(RealSet::all().to_string(), "ℝ");
        assert_eq!(RealSet::empty().to_string(), "∅");
        assert_eq!(RealSet::from_points(&[2.0]).to_string(), "{2}");
        let set = RealSet::from_intervals(vec![Interval::open(1.0, INF)]);
        assert_eq!(set.to_string(), "(1, ∞)");
        assert_eq!(set.bounds(), Some((1.0, INF)));
    }
}
