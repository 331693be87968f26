//! Simplified "theoretical" premium used by the roll suggestion.
//!
//! This is an illustrative estimate, not an option pricing model: there is no
//! interest rate and no cumulative-normal term. The premium is the intrinsic
//! value plus a time value of `S·σ·√t·φ(d1)`.

use crate::domain::model::OptionKind;
use chrono::NaiveDate;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

pub fn normal_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Year fraction between `as_of` and `expiry`, never negative.
pub fn time_to_expiry(as_of: NaiveDate, expiry: NaiveDate, days_per_year: f64) -> f64 {
    let days = (expiry - as_of).num_days().max(0) as f64;
    days / days_per_year
}

/// `(ln(S/K) + σ²t/2) / (σ√t)`. Returns `None` when `t` or `σ` is zero.
pub fn d1(spot: f64, strike: f64, t: f64, vol: f64) -> Option<f64> {
    let vol_sqrt_t = vol * t.sqrt();
    if vol_sqrt_t <= 0.0 || spot <= 0.0 || strike <= 0.0 {
        return None;
    }
    Some(((spot / strike).ln() + 0.5 * vol * vol * t) / vol_sqrt_t)
}

pub fn intrinsic_value(kind: OptionKind, spot: f64, strike: f64) -> f64 {
    match kind {
        OptionKind::Put => (strike - spot).max(0.0),
        OptionKind::Call => (spot - strike).max(0.0),
    }
}

pub fn theoretical_premium(kind: OptionKind, spot: f64, strike: f64, t: f64, vol: f64) -> f64 {
    let intrinsic = intrinsic_value(kind, spot, strike);
    match d1(spot, strike, t, vol) {
        Some(d1) => intrinsic + spot * vol * t.sqrt() * normal_pdf(d1),
        None => intrinsic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_reference_put_premium() {
        let t: f64 = 0.1;
        let expected_d1 = ((100.0_f64 / 95.0).ln() + 0.5 * 0.04 * t) / (0.2 * t.sqrt());
        let expected = 100.0 * 0.2 * t.sqrt() * normal_pdf(expected_d1);

        assert_relative_eq!(d1(100.0, 95.0, t, 0.2).unwrap(), expected_d1, epsilon = 1e-12);
        assert_relative_eq!(
            theoretical_premium(OptionKind::Put, 100.0, 95.0, t, 0.2),
            expected,
            epsilon = 1e-12
        );
        // d1 ≈ 0.8427, time value ≈ 1.7691
        assert_abs_diff_eq!(expected_d1, 0.8427, epsilon = 1e-3);
        assert_abs_diff_eq!(expected, 1.7691, epsilon = 1e-3);
    }

    #[test]
    fn test_in_the_money_put_includes_intrinsic() {
        let premium = theoretical_premium(OptionKind::Put, 90.0, 95.0, 0.25, 0.3);
        assert!(premium > 5.0);
    }

    #[test]
    fn test_degenerate_inputs_fall_back_to_intrinsic() {
        assert_eq!(theoretical_premium(OptionKind::Call, 110.0, 100.0, 0.0, 0.2), 10.0);
        assert_eq!(theoretical_premium(OptionKind::Put, 110.0, 100.0, 0.5, 0.0), 0.0);
        assert!(d1(100.0, 100.0, 0.0, 0.2).is_none());
    }

    #[test]
    fn test_time_to_expiry() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_relative_eq!(time_to_expiry(as_of, expiry, 365.0), 60.0 / 365.0, epsilon = 1e-12);
        assert_eq!(time_to_expiry(expiry, as_of, 365.0), 0.0);
    }
}
