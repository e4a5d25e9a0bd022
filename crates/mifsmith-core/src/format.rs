//! Number rendering for emitted blocks.
//!
//! Free-standing numbers use [`format_number`], the shortest decimal that
//! round-trips. Grouped values that should line up in columns (the bounds of
//! one extent, the rows of a field table) use [`scientific`] with a shared
//! precision from [`significant_digits`].

/// Characters of a rendered number that carry no significance.
const NOTATION_OVERHEAD: usize = 6;

/// Fewest decimals ever used for a grouped column.
const MIN_DIGITS: usize = 2;

/// Shortest round-trip decimal for `x`.
///
/// Fixed notation (with a trailing `.0` for integral values) is used when the
/// decimal exponent lies in `[-4, 16)`; anything else is written in scientific
/// notation with a signed exponent of at least two digits.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sign = if x.is_sign_negative() { "-" } else { "" };
    let shortest = format!("{:e}", x.abs());
    let (mantissa, exponent) = split_exponent(&shortest);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        format!("{sign}{}", fixed_from_digits(&digits, exponent))
    } else {
        format!("{sign}{mantissa}e{}", signed_exponent(exponent))
    }
}

/// `x` in scientific notation with `digits` decimals, a leading space when
/// non-negative, and a signed two-digit exponent (` 1.00e-07`).
pub fn scientific(x: f64, digits: usize) -> String {
    let raw = format!("{x:.digits$e}");
    let (mantissa, exponent) = split_exponent(&raw);
    let pad = if x.is_sign_negative() { "" } else { " " };
    format!("{pad}{mantissa}e{}", signed_exponent(exponent))
}

/// Decimals needed to show every value of a group at the same width.
pub fn significant_digits(values: &[f64]) -> usize {
    values
        .iter()
        .map(|v| format_number(v.abs()).len().saturating_sub(NOTATION_OVERHEAD))
        .max()
        .unwrap_or(0)
        .max(MIN_DIGITS)
}

/// Renders a `{ min max }` range sharing `digits` decimals.
pub fn range(min: f64, max: f64, digits: usize) -> String {
    format!("{{ {} {} }}", scientific(min, digits), scientific(max, digits))
}

/// Renders a literal triple as `{ x y z }`.
pub fn triple(v: (f64, f64, f64)) -> String {
    format!(
        "{{ {} {} {} }}",
        format_number(v.0),
        format_number(v.1),
        format_number(v.2)
    )
}

/// Renders a 0/1 flag.
pub fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

/// Width of the widest entry, for left-aligned table columns.
pub fn column_width<'a>(entries: impl IntoIterator<Item = &'a str>) -> usize {
    entries.into_iter().map(str::len).max().unwrap_or(0)
}

fn split_exponent(s: &str) -> (&str, i32) {
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn signed_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{:02}", exponent.abs())
}

fn fixed_from_digits(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{zeros}{digits}");
    }
    let point = exponent as usize + 1;
    if digits.len() <= point {
        let zeros = "0".repeat(point - digits.len());
        format!("{digits}{zeros}.0")
    } else {
        format!("{}.{}", &digits[..point], &digits[point..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_keep_a_decimal() {
        assert_eq!(format_number(800e3), "800000.0");
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(-2.0), "-2.0");
    }

    #[test]
    fn fractions_use_fixed_notation() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.85), "0.85");
        assert_eq!(format_number(2.211e5), "221100.0");
        assert_eq!(format_number(1e-4), "0.0001");
        assert_eq!(format_number(-12.25), "-12.25");
    }

    #[test]
    fn small_and_large_values_use_scientific() {
        assert_eq!(format_number(1e-7), "1e-07");
        assert_eq!(format_number(4e-9), "4e-09");
        assert_eq!(format_number(1.2e-8), "1.2e-08");
        assert_eq!(format_number(13e-12), "1.3e-11");
        assert_eq!(format_number(1e16), "1e+16");
        assert_eq!(format_number(-5e-9), "-5e-09");
        assert_eq!(format_number(1e-5), "1e-05");
    }

    #[test]
    fn scientific_pads_non_negative_values() {
        assert_eq!(scientific(0.0, 2), " 0.00e+00");
        assert_eq!(scientific(1e-7, 2), " 1.00e-07");
        assert_eq!(scientific(-1.5e-8, 3), "-1.500e-08");
        assert_eq!(scientific(123.0, 1), " 1.2e+02");
    }

    #[test]
    fn significant_digits_has_a_floor() {
        assert_eq!(significant_digits(&[0.0, 1e-7, 0.0, 1e-7, 0.0, 2e-8]), 2);
        assert_eq!(significant_digits(&[]), 2);
    }

    #[test]
    fn significant_digits_grows_with_precision() {
        // "1.23456789e-07" is 14 characters.
        assert_eq!(significant_digits(&[0.0, 1.23456789e-7]), 8);
        assert_eq!(significant_digits(&[-1.23456789e-7]), 8);
    }

    #[test]
    fn range_shares_digits() {
        assert_eq!(range(0.0, 1e-7, 2), "{  0.00e+00  1.00e-07 }");
    }

    #[test]
    fn triple_and_flag() {
        assert_eq!(triple((0.0, 0.0, 1.0)), "{ 0.0 0.0 1.0 }");
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
    }

    #[test]
    fn column_width_is_widest_entry() {
        assert_eq!(column_width(["a", "abc", "ab"]), 3);
        assert_eq!(column_width(Vec::<&str>::new()), 0);
    }
}
