use crate::domain::model::{
    OperationType, RollForm, RollInput, RollModel, RollPreference,
};
use crate::domain::ports::SettingsProvider;
use crate::utils::error::{Result, RollError};
use crate::utils::validation::validate_non_empty_string;
use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Parses a typed number. Accepts `,` as the decimal separator (`1,50`) and
/// `.` as a thousands separator when both appear (`1.234,50`). Mixed forms
/// that do not follow that layout (`1,234.50`, `12.34,5`) are rejected.
pub fn parse_decimal(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim().trim_start_matches("R$").trim();
    validate_non_empty_string(field, trimmed)?;

    let not_a_number = || RollError::validation(field, format!("'{}' is not a number", raw.trim()));

    let normalized = match trimmed.split_once(',') {
        Some((integer, fraction)) => {
            if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(not_a_number());
            }
            let integer = if integer.contains('.') {
                let grouped = Regex::new(r"^[+-]?\d{1,3}(\.\d{3})+$")
                    .map_err(|e| RollError::processing(format!("invalid thousands pattern: {}", e)))?;
                if !grouped.is_match(integer) {
                    return Err(not_a_number());
                }
                integer.replace('.', "")
            } else {
                integer.to_string()
            };
            format!("{}.{}", integer, fraction)
        }
        None => trimmed.to_string(),
    };

    let value: f64 = normalized.parse().map_err(|_| not_a_number())?;

    if !value.is_finite() {
        return Err(RollError::validation(
            field,
            format!("'{}' is not a finite number", raw.trim()),
        ));
    }
    Ok(value)
}

pub fn parse_quantity(field: &str, raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RollError::MissingFieldError {
            field: field.to_string(),
        });
    }
    let quantity: u32 = trimmed.parse().map_err(|_| {
        RollError::validation(field, format!("'{}' is not a whole number of contracts", trimmed))
    })?;
    if quantity == 0 {
        return Err(RollError::validation(field, "at least one contract is required"));
    }
    Ok(quantity)
}

/// Accepts `dd/mm`, `dd/mm/yyyy` and `yyyy-mm-dd`. A date without a year is
/// the next occurrence on or after `as_of`.
pub fn parse_expiry(field: &str, raw: &str, as_of: NaiveDate) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RollError::MissingFieldError {
            field: field.to_string(),
        });
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Ok(date);
    }

    let invalid = || {
        RollError::validation(
            field,
            format!("'{}' is not a date (use dd/mm, dd/mm/yyyy or yyyy-mm-dd)", trimmed),
        )
    };

    let (day, month) = trimmed.split_once('/').ok_or_else(invalid)?;
    let day: u32 = day.trim().parse().map_err(|_| invalid())?;
    let month: u32 = month.trim().parse().map_err(|_| invalid())?;

    // 29/02 may only exist a few years ahead.
    (as_of.year()..=as_of.year() + 4)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= as_of)
        .ok_or_else(invalid)
}

fn required_text(field: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    validate_non_empty_string(field, trimmed)?;
    Ok(trimmed.to_string())
}

/// Volatility is typed either as a fraction (`0.25`) or as a percentage (`25`).
fn normalize_volatility(value: f64) -> f64 {
    if value > 3.0 {
        value / 100.0
    } else {
        value
    }
}

impl RollForm {
    /// Turns the typed form into a validated [`RollInput`].
    ///
    /// The new expiry is only required to lie in the future for the
    /// theoretical model, which needs a positive time to expiry.
    pub fn parse<C: SettingsProvider + ?Sized>(
        &self,
        as_of: NaiveDate,
        settings: &C,
    ) -> Result<RollInput> {
        let advisor = required_text("advisor", &self.advisor)?;
        let client = required_text("client", &self.client)?;

        let operation_type: OperationType = required_text("operation_type", &self.operation_type)?
            .parse()
            .map_err(|e: String| RollError::validation("operation_type", e))?;

        let underlying = self.underlying.trim().to_uppercase();

        let spot_price = parse_decimal("spot_price", &self.spot_price)?;
        if spot_price <= 0.0 {
            return Err(RollError::validation("spot_price", "must be greater than zero"));
        }

        let current_strike = parse_decimal("current_strike", &self.current_strike)?;
        if current_strike <= 0.0 {
            return Err(RollError::validation("current_strike", "must be greater than zero"));
        }

        let current_premium = parse_decimal("current_premium", &self.current_premium)?;
        if current_premium < 0.0 {
            return Err(RollError::validation("current_premium", "cannot be negative"));
        }

        let quantity = parse_quantity("quantity", &self.quantity)?;

        let volatility = normalize_volatility(parse_decimal("volatility", &self.volatility)?);
        if volatility <= 0.0 {
            return Err(RollError::validation("volatility", "must be greater than zero"));
        }

        let current_expiry = parse_expiry("current_expiry", &self.current_expiry, as_of)?;
        let new_expiry = parse_expiry("new_expiry", &self.new_expiry, as_of)?;
        if new_expiry < current_expiry {
            return Err(RollError::validation(
                "new_expiry",
                format!("{} is before the current expiry {}", new_expiry, current_expiry),
            ));
        }
        if settings.model() == RollModel::Theoretical && new_expiry <= as_of {
            return Err(RollError::validation(
                "new_expiry",
                format!("{} must be after {}", new_expiry, as_of),
            ));
        }

        let roll_preference = if self.roll_preference.trim().is_empty() {
            settings.default_preference()
        } else {
            self.roll_preference
                .parse::<RollPreference>()
                .map_err(|e| RollError::validation("roll_preference", e))?
        };

        tracing::debug!(
            %operation_type,
            spot_price,
            current_strike,
            %new_expiry,
            "Parsed roll form"
        );

        Ok(RollInput {
            advisor,
            client,
            operation_type,
            underlying,
            spot_price,
            current_strike,
            current_expiry,
            new_expiry,
            current_premium,
            quantity,
            volatility,
            roll_preference,
            as_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::Settings;
    use approx::assert_relative_eq;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    fn sample_form() -> RollForm {
        RollForm {
            advisor: "Ana Souza".to_string(),
            client: "Carlos Lima".to_string(),
            operation_type: "put spread".to_string(),
            underlying: "petr4".to_string(),
            spot_price: "36,50".to_string(),
            current_strike: "35".to_string(),
            current_expiry: "20/02".to_string(),
            new_expiry: "20/03".to_string(),
            current_premium: "0,85".to_string(),
            quantity: "100".to_string(),
            volatility: "28".to_string(),
            roll_preference: "subir".to_string(),
        }
    }

    #[test]
    fn test_parse_decimal_accepts_brazilian_format() {
        assert_eq!(parse_decimal("x", "1,50").unwrap(), 1.5);
        assert_eq!(parse_decimal("x", " 1.234,56 ").unwrap(), 1234.56);
        assert_eq!(parse_decimal("x", "R$ 2.75").unwrap(), 2.75);
        assert_eq!(parse_decimal("x", "-3").unwrap(), -3.0);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(matches!(
            parse_decimal("spot_price", "abc"),
            Err(RollError::ValidationError { ref field, .. }) if field == "spot_price"
        ));
        assert!(matches!(
            parse_decimal("spot_price", "   "),
            Err(RollError::MissingFieldError { .. })
        ));
        assert!(parse_decimal("spot_price", "NaN").is_err());
        assert!(parse_decimal("spot_price", "inf").is_err());
    }

    #[test]
    fn test_parse_decimal_rejects_mixed_separators() {
        for raw in ["1,234.50", "12.34,5", "1,2,3", "1.2.3,4", "1,", "1,5e3"] {
            assert!(
                matches!(
                    parse_decimal("current_premium", raw),
                    Err(RollError::ValidationError { ref field, .. }) if field == "current_premium"
                ),
                "{raw} should be rejected"
            );
        }
        assert_eq!(parse_decimal("x", "1.234.567,8").unwrap(), 1234567.8);
        assert_eq!(parse_decimal("x", "-1.000,25").unwrap(), -1000.25);
        assert_eq!(parse_decimal("x", "0,5").unwrap(), 0.5);
    }

    #[test]
    fn test_parse_expiry_formats() {
        let today = as_of();
        assert_eq!(
            parse_expiry("e", "18/03", today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
        );
        // Already past this year, rolls into the next one.
        assert_eq!(
            parse_expiry("e", "15/01", today).unwrap(),
            NaiveDate::from_ymd_opt(2027, 1, 15).unwrap()
        );
        assert_eq!(
            parse_expiry("e", "29/02", today).unwrap(),
            NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()
        );
        assert_eq!(
            parse_expiry("e", "2026-06-19", today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 19).unwrap()
        );
        assert_eq!(
            parse_expiry("e", "19/06/2026", today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 19).unwrap()
        );
        assert!(parse_expiry("e", "32/01", today).is_err());
        assert!(parse_expiry("e", "next month", today).is_err());
    }

    #[test]
    fn test_parse_full_form() {
        let input = sample_form().parse(as_of(), &Settings::default()).unwrap();

        assert_eq!(input.operation_type, OperationType::PutSpread);
        assert_eq!(input.underlying, "PETR4");
        assert_eq!(input.spot_price, 36.5);
        assert_eq!(input.current_premium, 0.85);
        assert_eq!(input.quantity, 100);
        assert_relative_eq!(input.volatility, 0.28, epsilon = 1e-12);
        assert_eq!(input.roll_preference, RollPreference::Up);
        assert_eq!(input.new_expiry, NaiveDate::from_ymd_opt(2026, 3, 20).unwrap());
    }

    #[test]
    fn test_blank_preference_uses_default() {
        let form = RollForm {
            roll_preference: String::new(),
            ..sample_form()
        };
        let input = form.parse(as_of(), &Settings::default()).unwrap();
        assert_eq!(input.roll_preference, RollPreference::Up);
    }

    #[test]
    fn test_new_expiry_before_current_is_rejected() {
        let form = RollForm {
            current_expiry: "20/03".to_string(),
            new_expiry: "20/02".to_string(),
            ..sample_form()
        };
        assert!(matches!(
            form.parse(as_of(), &Settings::default()),
            Err(RollError::ValidationError { ref field, .. }) if field == "new_expiry"
        ));
    }

    #[test]
    fn test_zero_quantity_and_missing_client() {
        let form = RollForm {
            quantity: "0".to_string(),
            ..sample_form()
        };
        assert!(form.parse(as_of(), &Settings::default()).is_err());

        let form = RollForm {
            client: " ".to_string(),
            ..sample_form()
        };
        assert!(matches!(
            form.parse(as_of(), &Settings::default()),
            Err(RollError::MissingFieldError { ref field }) if field == "client"
        ));
    }

    fn assert_invalid(form: RollForm, settings: &Settings, expected_field: &str) {
        match form.parse(as_of(), settings) {
            Err(RollError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected a validation error on {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_prices_are_rejected() {
        let settings = Settings::default();
        assert_invalid(
            RollForm { spot_price: "0".to_string(), ..sample_form() },
            &settings,
            "spot_price",
        );
        assert_invalid(
            RollForm { current_strike: "-1".to_string(), ..sample_form() },
            &settings,
            "current_strike",
        );
        assert_invalid(
            RollForm { current_premium: "-0,5".to_string(), ..sample_form() },
            &settings,
            "current_premium",
        );
        assert_invalid(
            RollForm { volatility: "0".to_string(), ..sample_form() },
            &settings,
            "volatility",
        );
    }

    #[test]
    fn test_zero_premium_is_accepted() {
        let form = RollForm {
            current_premium: "0".to_string(),
            ..sample_form()
        };
        let input = form.parse(as_of(), &Settings::default()).unwrap();
        assert_eq!(input.current_premium, 0.0);
    }

    #[test]
    fn test_new_expiry_on_valuation_date_depends_on_model() {
        let form = RollForm {
            current_expiry: "2026-01-10".to_string(),
            new_expiry: "2026-02-10".to_string(),
            ..sample_form()
        };
        assert_invalid(form.clone(), &Settings::default(), "new_expiry");

        let mut fixed = Settings::default();
        fixed.pricing.model = RollModel::Fixed;
        let input = form.parse(as_of(), &fixed).unwrap();
        assert_eq!(input.new_expiry, as_of());
    }
}
