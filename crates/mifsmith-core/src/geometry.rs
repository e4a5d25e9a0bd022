//! Bounding-box ordering and cell-size divisibility checks.

use std::fmt;

/// Absolute nudge applied to a span, in its own direction, before taking the
/// remainder.
const NUDGE: f64 = 1e-16;

/// Largest remainder still treated as an exact division.
const TOLERANCE: f64 = 5e-16;

/// One of the three spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{axis} min {min} is greater than max {max}")]
    Reversed { axis: Axis, min: f64, max: f64 },
}

/// A 3D axis-aligned box as `(min, max)` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    ranges: [(f64, f64); 3],
}

impl Extent {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self { ranges: [x, y, z] }
    }

    /// Builds an extent and checks its ordering in one go.
    pub fn checked(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Result<Self, GeometryError> {
        let extent = Self::new(x, y, z);
        extent.validate()?;
        Ok(extent)
    }

    pub fn range(&self, axis: Axis) -> (f64, f64) {
        self.ranges[axis.index()]
    }

    pub fn span(&self, axis: Axis) -> f64 {
        let (min, max) = self.range(axis);
        max - min
    }

    /// All six bounds in `xmin, xmax, ymin, ymax, zmin, zmax` order.
    pub fn bounds(&self) -> [f64; 6] {
        let [(a, b), (c, d), (e, f)] = self.ranges;
        [a, b, c, d, e, f]
    }

    /// Smallest extent enclosing both boxes.
    pub fn union(&self, other: &Extent) -> Extent {
        let mut ranges = self.ranges;
        for (mine, theirs) in ranges.iter_mut().zip(other.ranges) {
            mine.0 = mine.0.min(theirs.0);
            mine.1 = mine.1.max(theirs.1);
        }
        Extent { ranges }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        let [x, y, z] = self.ranges;
        validate_extent(x.0, x.1, y.0, y.1, z.0, z.1)
    }
}

/// Fails on the first axis whose minimum exceeds its maximum. Degenerate
/// axes (`min == max`) are accepted.
pub fn validate_extent(
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    zmin: f64,
    zmax: f64,
) -> Result<(), GeometryError> {
    for (axis, min, max) in [(Axis::X, xmin, xmax), (Axis::Y, ymin, ymax), (Axis::Z, zmin, zmax)] {
        if min > max {
            return Err(GeometryError::Reversed { axis, min, max });
        }
    }
    Ok(())
}

/// Remainder with the sign of the divisor.
fn floored_rem(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

fn sign(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x.signum() }
}

/// True when `step` leaves more than a rounding-error remainder in `span`.
///
/// Decimal cell sizes are rarely exact in binary, so the span is nudged away
/// from zero before the floored remainder is compared against a tolerance.
pub fn has_significant_remainder(span: f64, step: f64) -> bool {
    floored_rem(span + NUDGE * sign(span), step).abs() > TOLERANCE
}

/// True when `step` evenly divides `span`. A non-positive step never divides.
pub fn evenly_divides(span: f64, step: f64) -> bool {
    step > 0.0 && !has_significant_remainder(span, step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_extent_passes() {
        assert!(validate_extent(0.0, 1e-7, 0.0, 1e-7, 0.0, 1.2e-8).is_ok());
    }

    #[test]
    fn degenerate_axis_passes() {
        assert!(validate_extent(0.0, 0.0, -1.0, 1.0, 5e-9, 5e-9).is_ok());
    }

    #[test]
    fn reversed_axis_is_named() {
        let err = validate_extent(0.0, 1.0, 0.0, 1.0, 2.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            GeometryError::Reversed {
                axis: Axis::Z,
                min: 2.0,
                max: 1.0
            }
        );
        assert!(format!("{err}").starts_with("z min"));
    }

    #[test]
    fn first_reversed_axis_wins() {
        let err = validate_extent(1.0, 0.0, 1.0, 0.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, GeometryError::Reversed { axis: Axis::X, .. }));
    }

    #[test]
    fn four_nanometres_divide_one_hundred() {
        assert!(evenly_divides(100e-9, 4e-9));
        assert!(!has_significant_remainder(100e-9, 4e-9));
    }

    #[test]
    fn three_nanometres_do_not_divide_one_hundred() {
        assert!(!evenly_divides(100e-9, 3e-9));
        assert!(has_significant_remainder(100e-9, 3e-9));
    }

    #[test]
    fn inexact_decimal_steps_still_divide() {
        // 0.1 and 0.3 are not representable; naive remainder is ~0.1.
        assert!(evenly_divides(0.3, 0.1));
        assert!(evenly_divides(12e-9, 3e-9));
        assert!(evenly_divides(20e-9, 5e-9));
    }

    #[test]
    fn zero_span_divides() {
        assert!(evenly_divides(0.0, 5e-9));
    }

    #[test]
    fn non_positive_step_never_divides() {
        assert!(!evenly_divides(1e-7, 0.0));
        assert!(!evenly_divides(1e-7, -1e-9));
    }

    #[test]
    fn floored_rem_takes_divisor_sign() {
        assert_eq!(floored_rem(-1.0, 3.0), 2.0);
        assert_eq!(floored_rem(1.0, -3.0), -2.0);
        assert_eq!(floored_rem(4.0, 2.0), 0.0);
    }

    #[test]
    fn union_encloses_both() {
        let a = Extent::new((0.0, 1.0), (0.0, 1.0), (0.0, 1.0));
        let b = Extent::new((-1.0, 0.5), (0.5, 2.0), (0.0, 1.0));
        let u = a.union(&b);
        assert_eq!(u.range(Axis::X), (-1.0, 1.0));
        assert_eq!(u.range(Axis::Y), (0.0, 2.0));
        assert_eq!(u.span(Axis::Z), 1.0);
    }

    #[test]
    fn checked_rejects_reversed() {
        assert!(Extent::checked((0.0, 1.0), (1.0, 0.0), (0.0, 1.0)).is_err());
        let e = Extent::checked((0.0, 1.0), (0.0, 2.0), (0.0, 3.0)).unwrap();
        assert_eq!(e.bounds(), [0.0, 1.0, 0.0, 2.0, 0.0, 3.0]);
    }
}
