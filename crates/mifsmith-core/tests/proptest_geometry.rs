//! Property-based tests for extent ordering and cell-size divisibility.

use mifsmith_core::geometry::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// An ordered `(min, max)` pair on the nanometre-to-micrometre scale.
fn arb_range() -> impl Strategy<Value = (f64, f64)> {
    (-1e-6..1e-6f64, -1e-6..1e-6f64).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

/// A strictly reversed `(min, max)` pair.
fn arb_reversed() -> impl Strategy<Value = (f64, f64)> {
    arb_range()
        .prop_filter("strictly ordered", |(a, b)| a < b)
        .prop_map(|(a, b)| (b, a))
}

fn arb_axis() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn ordered_extents_validate(x in arb_range(), y in arb_range(), z in arb_range()) {
        prop_assert!(validate_extent(x.0, x.1, y.0, y.1, z.0, z.1).is_ok());
        prop_assert!(Extent::checked(x, y, z).is_ok());
    }

    #[test]
    fn reversed_axis_is_reported(
        axis in arb_axis(),
        bad in arb_reversed(),
        good in arb_range(),
    ) {
        let mut ranges = [good; 3];
        let index = Axis::ALL.iter().position(|a| *a == axis).unwrap();
        ranges[index] = bad;
        let [x, y, z] = ranges;
        let err = validate_extent(x.0, x.1, y.0, y.1, z.0, z.1).unwrap_err();
        match err {
            GeometryError::Reversed { axis: reported, .. } => prop_assert_eq!(reported, axis),
        }
    }

    #[test]
    fn exact_nanometre_multiples_divide(k in 1u32..200, m in 1u32..20) {
        let span = f64::from(k * m) * 1e-9;
        let step = f64::from(m) * 1e-9;
        prop_assert!(evenly_divides(span, step), "span {span} step {step}");
    }

    #[test]
    fn nanometre_offsets_are_rejected(k in 1u32..200, m in 2u32..20, r in 1u32..20) {
        let r = r % m;
        prop_assume!(r != 0);
        let span = f64::from(k * m + r) * 1e-9;
        let step = f64::from(m) * 1e-9;
        prop_assert!(!evenly_divides(span, step), "span {span} step {step}");
    }

    #[test]
    fn union_contains_both(a in (arb_range(), arb_range(), arb_range()), b in (arb_range(), arb_range(), arb_range())) {
        let ea = Extent::new(a.0, a.1, a.2);
        let eb = Extent::new(b.0, b.1, b.2);
        let u = ea.union(&eb);
        prop_assert!(u.validate().is_ok());
        for axis in Axis::ALL {
            prop_assert!(u.span(axis) >= ea.span(axis));
            prop_assert!(u.span(axis) >= eb.span(axis));
        }
    }
}
