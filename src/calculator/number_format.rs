//! String rendering of real and complex results.
//!
//! * real scalar: plain number, `4` rather than `4.0`;
//! * complex with zero imaginary part: the real part alone;
//! * pure imaginary: `1i`, `-2.5i`;
//! * otherwise `<real><sign><imag>i`, e.g. `3-4i`.
use num_complex::Complex64;

/// plain rendering used for evaluator results
pub fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e16 || magnitude < 1e-7 {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// rendering with a fixed number of significant figures, the `%g` way:
/// fixed notation unless the decimal exponent is below -4 or at least `digits`,
/// trailing zeros dropped
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        trim_fraction(&fixed).to_string()
    }
}

/// shared complex layout, `real_fmt` renders each component
pub fn format_complex_with<F>(z: Complex64, real_fmt: F) -> String
where
    F: Fn(f64) -> String,
{
    if z.im == 0.0 {
        return real_fmt(z.re);
    }
    if z.re == 0.0 {
        return format!("{}i", real_fmt(z.im));
    }
    let sign = if z.im < 0.0 { '-' } else { '+' };
    format!("{}{}{}i", real_fmt(z.re), sign, real_fmt(z.im.abs()))
}

pub fn format_complex(z: Complex64) -> String {
    format_complex_with(z, format_real)
}

pub fn format_complex_significant(z: Complex64, digits: usize) -> String {
    format_complex_with(z, |v| format_significant(v, digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_real_plain() {
        assert_eq!(format_real(4.0), "4");
        assert_eq!(format_real(-0.0), "0");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(-12.25), "-12.25");
        assert_eq!(format_real(1e20), "1e20");
        assert_eq!(format_real(2.5e-9), "2.5e-9");
    }

    #[test]
    fn test_format_significant() {
        assert_eq!(format_significant(1.0, 6), "1");
        assert_eq!(format_significant(3.14159265, 6), "3.14159");
        assert_eq!(format_significant(0.70710678118, 6), "0.707107");
        assert_eq!(format_significant(-0.70710678118, 6), "-0.707107");
        assert_eq!(format_significant(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_significant(0.00001234, 6), "1.234e-05");
        assert_eq!(format_significant(100.0, 6), "100");
    }

    #[test]
    fn test_format_complex() {
        assert_eq!(format_complex(Complex64::new(3.0, 4.0)), "3+4i");
        assert_eq!(format_complex(Complex64::new(3.0, -4.0)), "3-4i");
        assert_eq!(format_complex(Complex64::new(0.0, 1.0)), "1i");
        assert_eq!(format_complex(Complex64::new(0.0, -2.5)), "-2.5i");
        assert_eq!(format_complex(Complex64::new(-1.5, 0.0)), "-1.5");
        assert_eq!(format_complex(Complex64::new(0.0, 0.0)), "0");
    }

    #[test]
    fn test_format_complex_significant() {
        let z = Complex64::new(0.70710678118, -0.70710678118);
        assert_eq!(format_complex_significant(z, 6), "0.707107-0.707107i");
    }
}
