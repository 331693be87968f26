use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The twelve form inputs exactly as typed, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollForm {
    #[serde(deserialize_with = "string_or_number")]
    pub advisor: String,
    #[serde(deserialize_with = "string_or_number")]
    pub client: String,
    #[serde(deserialize_with = "string_or_number")]
    pub operation_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub underlying: String,
    #[serde(deserialize_with = "string_or_number")]
    pub spot_price: String,
    #[serde(deserialize_with = "string_or_number")]
    pub current_strike: String,
    #[serde(deserialize_with = "string_or_number")]
    pub current_expiry: String,
    #[serde(deserialize_with = "string_or_number")]
    pub new_expiry: String,
    #[serde(deserialize_with = "string_or_number")]
    pub current_premium: String,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(deserialize_with = "string_or_number")]
    pub volatility: String,
    #[serde(deserialize_with = "string_or_number")]
    pub roll_preference: String,
}

/// Form files may carry bare numbers (`spot_price = 36.5`, `"quantity": 10`);
/// they are kept as their textual form and parsed like typed input.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Text(text) => text,
        RawValue::Int(value) => value.to_string(),
        RawValue::Float(value) => value.to_string(),
        RawValue::Bool(value) => value.to_string(),
    })
}

impl RollForm {
    /// Fills blank fields of `self` from `other`. Typed values always win.
    pub fn merge_missing(&mut self, other: RollForm) {
        fn fill(target: &mut String, source: String) {
            if target.trim().is_empty() {
                *target = source;
            }
        }

        fill(&mut self.advisor, other.advisor);
        fill(&mut self.client, other.client);
        fill(&mut self.operation_type, other.operation_type);
        fill(&mut self.underlying, other.underlying);
        fill(&mut self.spot_price, other.spot_price);
        fill(&mut self.current_strike, other.current_strike);
        fill(&mut self.current_expiry, other.current_expiry);
        fill(&mut self.new_expiry, other.new_expiry);
        fill(&mut self.current_premium, other.current_premium);
        fill(&mut self.quantity, other.quantity);
        fill(&mut self.volatility, other.volatility);
        fill(&mut self.roll_preference, other.roll_preference);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Put,
    Call,
    PutSpread,
    CallSpread,
}

impl OperationType {
    pub fn option_kind(self) -> OptionKind {
        match self {
            OperationType::Put | OperationType::PutSpread => OptionKind::Put,
            OperationType::Call | OperationType::CallSpread => OptionKind::Call,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationType::Put => "Put",
            OperationType::Call => "Call",
            OperationType::PutSpread => "Put Spread",
            OperationType::CallSpread => "Call Spread",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "put" | "venda de put" | "compra de put" => Ok(OperationType::Put),
            "call" | "venda de call" | "compra de call" => Ok(OperationType::Call),
            "put spread" | "putspread" | "trava de baixa" | "trava de baixa com put" => {
                Ok(OperationType::PutSpread)
            }
            "call spread" | "callspread" | "trava de alta" | "trava de alta com call" => {
                Ok(OperationType::CallSpread)
            }
            _ => Err(format!(
                "unknown operation type '{}' (expected put, call, put spread or call spread)",
                s.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollPreference {
    /// Roll the strike up one step.
    Up,
    /// Roll the strike down one step.
    Down,
    /// Keep the strike, roll only the expiry.
    Out,
}

impl RollPreference {
    /// Strike steps applied when rolling.
    pub fn direction(self) -> f64 {
        match self {
            RollPreference::Up => 1.0,
            RollPreference::Down => -1.0,
            RollPreference::Out => 0.0,
        }
    }
}

impl FromStr for RollPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "subir" | "para cima" | "acima" => Ok(RollPreference::Up),
            "down" | "descer" | "para baixo" | "abaixo" => Ok(RollPreference::Down),
            "out" | "same" | "manter" | "mesmo strike" | "prazo" => Ok(RollPreference::Out),
            other => Err(format!(
                "unknown roll preference '{}' (expected up, down or out)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollModel {
    /// First prototype rule: strike + step, premium - decrement.
    Fixed,
    #[default]
    Theoretical,
}

impl FromStr for RollModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixo" => Ok(RollModel::Fixed),
            "theoretical" | "teorico" | "teórico" => Ok(RollModel::Theoretical),
            other => Err(format!(
                "unknown model '{}' (expected fixed or theoretical)",
                other
            )),
        }
    }
}

/// A validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollInput {
    pub advisor: String,
    pub client: String,
    pub operation_type: OperationType,
    pub underlying: String,
    pub spot_price: f64,
    pub current_strike: f64,
    pub current_expiry: NaiveDate,
    pub new_expiry: NaiveDate,
    pub current_premium: f64,
    pub quantity: u32,
    pub volatility: f64,
    pub roll_preference: RollPreference,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub payoff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollSuggestion {
    pub model: RollModel,
    pub new_strike: f64,
    pub spread_lower_strike: Option<f64>,
    pub new_premium: f64,
    pub net: f64,
    pub total_net: f64,
    pub time_to_expiry: f64,
    pub d1: Option<f64>,
    pub break_even: f64,
    pub max_profit: Option<f64>,
    pub max_loss: f64,
    pub payoff: Vec<PayoffPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollReport {
    pub input: RollInput,
    pub suggestion: RollSuggestion,
    pub generated_at: DateTime<Local>,
}
