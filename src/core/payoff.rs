use crate::domain::model::{OperationType, PayoffPoint};

/// A long position per unit of underlying, valued at expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub operation: OperationType,
    pub strike: f64,
    /// Strike of the sold leg for spreads: `K - w` for puts, `K + w` for calls.
    pub short_strike: Option<f64>,
    pub premium: f64,
}

impl Position {
    pub fn new(operation: OperationType, strike: f64, spread_width: f64, premium: f64) -> Self {
        let short_strike = match operation {
            OperationType::PutSpread => Some(strike - spread_width),
            OperationType::CallSpread => Some(strike + spread_width),
            OperationType::Put | OperationType::Call => None,
        };
        Self {
            operation,
            strike,
            short_strike,
            premium,
        }
    }

    fn width(&self) -> f64 {
        self.short_strike
            .map(|short| (short - self.strike).abs())
            .unwrap_or(0.0)
    }

    pub fn payoff_at(&self, price: f64) -> f64 {
        let k = self.strike;
        let value = match (self.operation, self.short_strike) {
            (OperationType::Put, _) => (k - price).max(0.0),
            (OperationType::Call, _) => (price - k).max(0.0),
            (OperationType::PutSpread, Some(short)) => {
                (k - price).max(0.0) - (short - price).max(0.0)
            }
            (OperationType::CallSpread, Some(short)) => {
                (price - k).max(0.0) - (price - short).max(0.0)
            }
            (OperationType::PutSpread, None) => (k - price).max(0.0),
            (OperationType::CallSpread, None) => (price - k).max(0.0),
        };
        value - self.premium
    }

    pub fn break_even(&self) -> f64 {
        match self.operation {
            OperationType::Put | OperationType::PutSpread => self.strike - self.premium,
            OperationType::Call | OperationType::CallSpread => self.strike + self.premium,
        }
    }

    /// `None` when the upside is unbounded (long call).
    pub fn max_profit(&self) -> Option<f64> {
        match self.operation {
            OperationType::Put => Some(self.strike - self.premium),
            OperationType::Call => None,
            OperationType::PutSpread | OperationType::CallSpread => {
                Some(self.width() - self.premium)
            }
        }
    }

    pub fn max_loss(&self) -> f64 {
        self.premium
    }

    /// Strikes where the curve changes slope.
    pub fn kinks(&self) -> Vec<f64> {
        let mut kinks = vec![self.strike];
        kinks.extend(self.short_strike);
        kinks
    }

    /// Payoff over `[spot·(1-range), spot·(1+range)]`, scaled by `scale`.
    ///
    /// The grid is evenly spaced and every strike inside the range is added
    /// so the piecewise segments meet exactly at the kinks.
    pub fn curve(&self, spot: f64, range_pct: f64, points: usize, scale: f64) -> Vec<PayoffPoint> {
        let lo = (spot * (1.0 - range_pct)).max(0.0);
        let hi = spot * (1.0 + range_pct);
        let points = points.max(2);
        let step = (hi - lo) / (points - 1) as f64;

        let mut prices: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();
        prices.extend(
            self.kinks()
                .into_iter()
                .filter(|k| *k >= lo && *k <= hi),
        );
        prices.sort_by(f64::total_cmp);
        prices.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        prices
            .into_iter()
            .map(|price| PayoffPoint {
                price,
                payoff: self.payoff_at(price) * scale,
            })
            .collect()
    }
}
