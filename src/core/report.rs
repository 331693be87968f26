use crate::domain::model::{PayoffPoint, RollInput, RollReport, RollSuggestion};
use crate::utils::error::Result;
use std::fmt::Write;

fn money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

/// The "Sugestão de Rolagem" results panel.
pub fn render_panel(input: &RollInput, suggestion: &RollSuggestion) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sugestão de Rolagem");
    let _ = writeln!(out, "===================");
    let _ = writeln!(out, "Assessor:           {}", input.advisor);
    let _ = writeln!(out, "Cliente:            {}", input.client);
    if input.underlying.is_empty() {
        let _ = writeln!(out, "Operação:           {}", input.operation_type);
    } else {
        let _ = writeln!(
            out,
            "Operação:           {} {}",
            input.operation_type, input.underlying
        );
    }
    let _ = writeln!(
        out,
        "Posição atual:      strike {:.2}, vencimento {}, prêmio {}",
        input.current_strike,
        input.current_expiry.format("%d/%m/%Y"),
        money(input.current_premium)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Novo Strike:        {:.2}", suggestion.new_strike);
    if let Some(lower) = suggestion.spread_lower_strike {
        let _ = writeln!(out, "Strike vendido:     {:.2}", lower);
    }
    let _ = writeln!(out, "Novo Vencimento:    {}", input.new_expiry.format("%d/%m/%Y"));
    let _ = writeln!(out, "Prêmio Estimado:    {}", money(suggestion.new_premium));
    let _ = writeln!(out, "Net da Rolagem:     {}", money(suggestion.net));
    let _ = writeln!(
        out,
        "Net Total ({} ct):  {}",
        input.quantity,
        money(suggestion.total_net)
    );
    let _ = writeln!(out, "Break-even:         {:.2}", suggestion.break_even);
    match suggestion.max_profit {
        Some(profit) => {
            let _ = writeln!(out, "Ganho máximo:       {}", money(profit));
        }
        None => {
            let _ = writeln!(out, "Ganho máximo:       ilimitado");
        }
    }
    let _ = writeln!(out, "Perda máxima:       {}", money(suggestion.max_loss));
    if let Some(d1) = suggestion.d1 {
        let _ = writeln!(
            out,
            "Modelo teórico:     d1 {:.4}, prazo {:.4} anos",
            d1, suggestion.time_to_expiry
        );
    }
    out
}

/// Plots the payoff curve as text, `width` columns by `height` rows.
/// Rows above the zero line are drawn with `*`, rows below with `.`.
pub fn render_chart(points: &[PayoffPoint], width: usize, height: usize) -> String {
    if points.len() < 2 || width < 2 || height < 2 {
        return String::new();
    }

    let min_price = points[0].price;
    let max_price = points[points.len() - 1].price;
    let (mut min_pay, mut max_pay) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.payoff), hi.max(p.payoff))
        });
    min_pay = min_pay.min(0.0);
    max_pay = max_pay.max(0.0);
    if (max_pay - min_pay).abs() < f64::EPSILON {
        max_pay = min_pay + 1.0;
    }

    let row_of = |value: f64| -> usize {
        let ratio = (max_pay - value) / (max_pay - min_pay);
        ((ratio * (height - 1) as f64).round() as usize).min(height - 1)
    };

    let mut grid = vec![vec![' '; width]; height];
    let zero_row = row_of(0.0);
    for cell in grid[zero_row].iter_mut() {
        *cell = '-';
    }

    for col in 0..width {
        let price = min_price + (max_price - min_price) * col as f64 / (width - 1) as f64;
        let payoff = interpolate(points, price);
        let row = row_of(payoff);
        grid[row][col] = if payoff >= 0.0 { '*' } else { '.' };
    }

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        let label = if i == 0 {
            format!("{:>10.2}", max_pay)
        } else if i == height - 1 {
            format!("{:>10.2}", min_pay)
        } else if i == zero_row {
            format!("{:>10.2}", 0.0)
        } else {
            " ".repeat(10)
        };
        let line: String = row.iter().collect();
        let _ = writeln!(out, "{} |{}", label, line.trim_end());
    }
    let _ = writeln!(
        out,
        "{} +{}",
        " ".repeat(10),
        "-".repeat(width)
    );
    let _ = writeln!(
        out,
        "{}  {:<w$.2}{:>.2}",
        " ".repeat(10),
        min_price,
        max_price,
        w = width.saturating_sub(6)
    );
    out
}

/// Linear interpolation on a curve sorted by price.
fn interpolate(points: &[PayoffPoint], price: f64) -> f64 {
    let idx = points.partition_point(|p| p.price < price);
    if idx == 0 {
        return points[0].payoff;
    }
    if idx >= points.len() {
        return points[points.len() - 1].payoff;
    }
    let (a, b) = (points[idx - 1], points[idx]);
    let span = b.price - a.price;
    if span <= 0.0 {
        return b.payoff;
    }
    a.payoff + (b.payoff - a.payoff) * (price - a.price) / span
}

pub fn payoff_csv(points: &[PayoffPoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in points {
        writer.serialize(point)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| crate::utils::error::RollError::processing(e.to_string()))?;
    String::from_utf8(data).map_err(|e| crate::utils::error::RollError::processing(e.to_string()))
}

pub fn to_json(report: &RollReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OperationType, RollModel, RollPreference};
    use chrono::NaiveDate;

    fn sample() -> (RollInput, RollSuggestion) {
        let input = RollInput {
            advisor: "Ana".to_string(),
            client: "Carlos".to_string(),
            operation_type: OperationType::PutSpread,
            underlying: "PETR4".to_string(),
            spot_price: 20.0,
            current_strike: 20.0,
            current_expiry: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            new_expiry: NaiveDate::from_ymd_opt(2026, 4, 17).unwrap(),
            current_premium: 1.5,
            quantity: 10,
            volatility: 0.3,
            roll_preference: RollPreference::Up,
            as_of: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
        };
        let suggestion = RollSuggestion {
            model: RollModel::Fixed,
            new_strike: 21.0,
            spread_lower_strike: Some(19.0),
            new_premium: 1.3,
            net: 0.2,
            total_net: 2.0,
            time_to_expiry: 0.0822,
            d1: None,
            break_even: 19.7,
            max_profit: Some(7.0),
            max_loss: 13.0,
            payoff: vec![
                PayoffPoint { price: 16.0, payoff: 7.0 },
                PayoffPoint { price: 19.0, payoff: 7.0 },
                PayoffPoint { price: 21.0, payoff: -13.0 },
                PayoffPoint { price: 24.0, payoff: -13.0 },
            ],
        };
        (input, suggestion)
    }

    #[test]
    fn test_panel_rounds_to_two_decimals() {
        let (input, suggestion) = sample();
        let panel = render_panel(&input, &suggestion);

        assert!(panel.contains("Novo Strike:        21.00"));
        assert!(panel.contains("Prêmio Estimado:    R$ 1.30"));
        assert!(panel.contains("Net da Rolagem:     R$ 0.20"));
        assert!(panel.contains("Strike vendido:     19.00"));
        assert!(panel.contains("Put Spread PETR4"));
        assert!(!panel.contains("Modelo teórico"));
    }

    #[test]
    fn test_chart_has_requested_height() {
        let (_, suggestion) = sample();
        let chart = render_chart(&suggestion.payoff, 30, 8);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 8 + 2);
        assert!(chart.contains('*'));
        assert!(chart.contains('.'));
        assert!(render_chart(&suggestion.payoff[..1], 30, 8).is_empty());
    }

    #[test]
    fn test_interpolate_between_points() {
        let (_, suggestion) = sample();
        assert_eq!(interpolate(&suggestion.payoff, 20.0), -3.0);
        assert_eq!(interpolate(&suggestion.payoff, 10.0), 7.0);
        assert_eq!(interpolate(&suggestion.payoff, 30.0), -13.0);
    }

    #[test]
    fn test_payoff_csv() {
        let (_, suggestion) = sample();
        let csv = payoff_csv(&suggestion.payoff).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("price,payoff"));
        assert_eq!(lines.next(), Some("16.0,7.0"));
        assert_eq!(csv.lines().count(), 5);
    }
}
