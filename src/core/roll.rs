use crate::core::payoff::Position;
use crate::core::pricing;
use crate::domain::model::{OperationType, RollInput, RollModel, RollSuggestion};
use crate::domain::ports::SettingsProvider;
use crate::utils::error::{Result, RollError};

/// Strike, premium and model diagnostics for the new position.
struct Quote {
    strike: f64,
    premium: f64,
    d1: Option<f64>,
}

/// Rolled strike and, for spreads, the sold leg. Both must stay positive.
fn rolled_strikes<C: SettingsProvider + ?Sized>(
    input: &RollInput,
    settings: &C,
) -> Result<(f64, Option<f64>)> {
    let strike = input.current_strike + input.roll_preference.direction() * settings.strike_step();
    if strike <= 0.0 {
        return Err(RollError::processing(format!(
            "rolling {} down by {} leaves no valid strike",
            input.current_strike,
            settings.strike_step()
        )));
    }

    let short_strike =
        Position::new(input.operation_type, strike, settings.spread_width(), 0.0).short_strike;
    if let Some(short) = short_strike {
        if short <= 0.0 {
            return Err(RollError::processing(format!(
                "spread width {} is wider than the strike {}",
                settings.spread_width(),
                strike
            )));
        }
    }
    Ok((strike, short_strike))
}

/// A long spread can never cost more than its width.
fn capped_premium(operation: OperationType, premium: f64, spread_width: f64) -> f64 {
    match operation {
        OperationType::PutSpread | OperationType::CallSpread => premium.clamp(0.0, spread_width),
        OperationType::Put | OperationType::Call => premium.max(0.0),
    }
}

/// First prototype rule: a fixed strike step and a fixed premium decrement.
fn fixed_quote<C: SettingsProvider + ?Sized>(input: &RollInput, settings: &C) -> Result<Quote> {
    let (strike, _) = rolled_strikes(input, settings)?;
    Ok(Quote {
        strike,
        premium: input.current_premium - settings.premium_decrement(),
        d1: None,
    })
}

fn theoretical_quote<C: SettingsProvider + ?Sized>(
    input: &RollInput,
    settings: &C,
    t: f64,
) -> Result<Quote> {
    let (strike, short_strike) = rolled_strikes(input, settings)?;
    let kind = input.operation_type.option_kind();
    let long_leg = pricing::theoretical_premium(kind, input.spot_price, strike, t, input.volatility);

    let premium = match short_strike {
        Some(short) => {
            long_leg - pricing::theoretical_premium(kind, input.spot_price, short, t, input.volatility)
        }
        None => long_leg,
    };

    Ok(Quote {
        strike,
        premium,
        d1: pricing::d1(input.spot_price, strike, t, input.volatility),
    })
}

/// Suggests the roll for `input` using the model configured in `settings`.
pub fn suggest<C: SettingsProvider + ?Sized>(input: &RollInput, settings: &C) -> Result<RollSuggestion> {
    let model = settings.model();
    let t = pricing::time_to_expiry(input.as_of, input.new_expiry, settings.days_per_year());

    let mut quote = match model {
        RollModel::Fixed => fixed_quote(input, settings)?,
        RollModel::Theoretical => theoretical_quote(input, settings, t)?,
    };
    quote.premium = capped_premium(input.operation_type, quote.premium, settings.spread_width());

    let position = Position::new(
        input.operation_type,
        quote.strike,
        settings.spread_width(),
        quote.premium,
    );

    let scale = f64::from(input.quantity) * settings.contract_multiplier();
    let net = input.current_premium - quote.premium;
    let payoff = position.curve(
        input.spot_price,
        settings.range_pct(),
        settings.payoff_points(),
        scale,
    );

    tracing::info!(
        ?model,
        new_strike = quote.strike,
        new_premium = quote.premium,
        net,
        points = payoff.len(),
        "Roll suggestion computed"
    );

    Ok(RollSuggestion {
        model,
        new_strike: quote.strike,
        spread_lower_strike: position.short_strike,
        new_premium: quote.premium,
        net,
        total_net: net * scale,
        time_to_expiry: t,
        d1: quote.d1,
        break_even: position.break_even(),
        max_profit: position.max_profit().map(|p| p * scale),
        max_loss: position.max_loss() * scale,
        payoff,
    })
}
