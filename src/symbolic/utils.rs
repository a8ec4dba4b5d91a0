// the collection of small numeric helpers shared by the symbolic modules

/// largest denominator tried when recognising a float as a fraction
const MAX_DENOMINATOR: i64 = 64;

/// Recognises `value` as a reduced fraction p/q with a small denominator.
pub fn as_rational(value: f64) -> Option<(i64, i64)> {
    if !value.is_finite() {
        return None;
    }
    for q in 1..=MAX_DENOMINATOR {
        let p = (value * q as f64).round();
        if (p / q as f64 - value).abs() < 1e-12 * value.abs().max(1.0) {
            let p = p as i64;
            let g = gcd(p.abs(), q);
            return Some((p / g, q / g));
        }
    }
    None
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// True when the exponent is a fraction with an even denominator (square root, x^(3/4), ...).
pub fn is_even_root_exponent(exponent: f64) -> bool {
    matches!(as_rational(exponent), Some((_, q)) if q % 2 == 0)
}

/// Real power: odd-denominator rational exponents of negative bases give the real root.
///
/// `real_powf(-8.0, 1.0/3.0) == -2.0`; even roots of negative numbers stay NaN.
pub fn real_powf(base: f64, exponent: f64) -> f64 {
    if base >= 0.0 || exponent.fract() == 0.0 {
        return base.powf(exponent);
    }
    match as_rational(exponent) {
        Some((p, q)) if q % 2 == 1 => {
            let magnitude = (-base).powf(exponent);
            if p % 2 == 0 { magnitude } else { -magnitude }
        }
        _ => f64::NAN,
    }
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    // avoid printing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Human-readable number: at most 5 decimals, no trailing zeros, ∞ for infinities.
pub fn format_number(value: f64) -> String {
    if value == f64::INFINITY {
        return "∞".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-∞".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    let text = format!("{:.5}", round_to(value, 5));
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_rational() {
        assert_eq!(as_rational(0.5), Some((1, 2)));
        assert_eq!(as_rational(-1.5), Some((-3, 2)));
        assert_eq!(as_rational(1.0 / 3.0), Some((1, 3)));
        assert_eq!(as_rational(2.0), Some((2, 1)));
        assert_eq!(as_rational(std::f64::consts::PI), None);
    }

    #[test]
    fn test_even_root_exponent() {
        assert!(is_even_root_exponent(0.5));
        assert!(is_even_root_exponent(0.75));
        assert!(!is_even_root_exponent(1.0 / 3.0));
        assert!(!is_even_root_exponent(2.0));
    }

    #[test]
    fn test_real_powf() {
        assert!((real_powf(-8.0, 1.0 / 3.0) + 2.0).abs() < 1e-12);
        assert!((real_powf(-8.0, 2.0 / 3.0) - 4.0).abs() < 1e-12);
        assert!(real_powf(-4.0, 0.5).is_nan());
        assert_eq!(real_powf(-2.0, 3.0), -8.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(1.414213562), "1.41421");
        assert_eq!(format_number(-0.000001), "0");
        assert_eq!(format_number(f64::NEG_INFINITY), "-∞");
    }
}
