//! Numeric formatting for regenerated NC words
//!
//! Values are rounded to a fixed number of decimal places and written
//! without trailing zeros, so accumulated floating-point noise such as
//! `-4.069999999999999` is written back as `-4.07` while every digit a
//! program can carry survives a rewrite. Exponent notation is never produced
//! since controllers do not read it.

/// Finer fractions than this are written as zero
const MAX_DECIMALS: usize = 10;

/// Format a value positionally with trailing zeros removed
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let text = trim_fraction(&format!("{:.*}", MAX_DECIMALS, value));
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_float_noise() {
        assert_eq!(format_number(-4.069999999999999), "-4.07");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_trailing_zeros_removed() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.45), "0.45");
        assert_eq!(format_number(12000.0), "12000");
    }

    #[test]
    fn test_zero_has_no_sign() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_extreme_magnitudes_stay_positional() {
        assert_eq!(format_number(1234567.0), "1234567");
        assert_eq!(format_number(0.00001), "0.00001");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(-1e-12), "0");
    }

    #[test]
    fn test_rounding_carries_into_next_digit() {
        assert_eq!(format_number(9.99999999999), "10");
    }

    #[test]
    fn test_keeps_every_program_digit() {
        assert_eq!(format_number(-123.4567), "-123.4567");
        assert_eq!(format_number(1234.56789), "1234.56789");
        assert_eq!(format_number(0.0000012), "0.0000012");
        assert_eq!(format_number(2.1234567891), "2.1234567891");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-3.14159, 4), -3.1416);
        assert_eq!(round_to(12345.6, 0), 12346.0);
    }
}
