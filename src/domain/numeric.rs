//! Presentation-time rounding and percentage helpers.
//!
//! Engines keep full precision; these are applied only when results are
//! rendered for output.

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format with exactly 2 decimal places.
pub fn format2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Percentage change from `from` to `to`.
pub fn pct_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(103.456), 103.46);
        assert_eq!(round2(103.454), 103.45);
        assert_eq!(round2(-3.0), -3.0);
    }

    #[test]
    fn format2_pads_decimals() {
        assert_eq!(format2(97.0), "97.00");
        assert_eq!(format2(1.005e3), "1005.00");
    }

    #[test]
    fn pct_change_signs() {
        assert!((pct_change(100.0, 103.0) - 3.0).abs() < 1e-12);
        assert!((pct_change(100.0, 97.0) + 3.0).abs() < 1e-12);
    }
}
