use crate::domain::model::{RollModel, RollPreference};
use crate::domain::ports::SettingsProvider;
use crate::utils::error::{Result, RollError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file (`rolagem.toml`). Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pricing: PricingConfig,
    pub roll: RollConfig,
    pub payoff: PayoffConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub model: RollModel,
    pub days_per_year: f64,
    pub contract_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            model: RollModel::Theoretical,
            days_per_year: 365.0,
            contract_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub strike_step: f64,
    pub premium_decrement: f64,
    pub default_preference: RollPreference,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            strike_step: 1.0,
            premium_decrement: 0.2,
            default_preference: RollPreference::Up,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    pub spread_width: f64,
    pub range_pct: f64,
    pub points: usize,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            spread_width: 2.0,
            range_pct: 0.2,
            points: 41,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub bundle: bool,
    pub chart_width: usize,
    pub chart_height: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            bundle: false,
            chart_width: 60,
            chart_height: 15,
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RollError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }

    pub fn validate_settings(&self) -> Result<()> {
        validation::validate_positive("pricing.days_per_year", self.pricing.days_per_year)?;
        validation::validate_positive(
            "pricing.contract_multiplier",
            self.pricing.contract_multiplier,
        )?;
        validation::validate_non_negative("roll.strike_step", self.roll.strike_step)?;
        validation::validate_non_negative("roll.premium_decrement", self.roll.premium_decrement)?;
        validation::validate_positive("payoff.spread_width", self.payoff.spread_width)?;
        validation::validate_range("payoff.range_pct", self.payoff.range_pct, 0.01, 1.0)?;
        validation::validate_range("payoff.points", self.payoff.points, 2, 10_000)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_range("output.chart_width", self.output.chart_width, 10, 400)?;
        validation::validate_range("output.chart_height", self.output.chart_height, 5, 200)?;
        Ok(())
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RollError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.validate_settings()
    }
}

impl SettingsProvider for Settings {
    fn model(&self) -> RollModel {
        self.pricing.model
    }

    fn days_per_year(&self) -> f64 {
        self.pricing.days_per_year
    }

    fn contract_multiplier(&self) -> f64 {
        self.pricing.contract_multiplier
    }

    fn strike_step(&self) -> f64 {
        self.roll.strike_step
    }

    fn premium_decrement(&self) -> f64 {
        self.roll.premium_decrement
    }

    fn default_preference(&self) -> RollPreference {
        self.roll.default_preference
    }

    fn spread_width(&self) -> f64 {
        self.payoff.spread_width
    }

    fn range_pct(&self) -> f64 {
        self.payoff.range_pct
    }

    fn payoff_points(&self) -> usize {
        self.payoff.points
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn bundle(&self) -> bool {
        self.output.bundle
    }

    fn chart_size(&self) -> (usize, usize) {
        (self.output.chart_width, self.output.chart_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model(), RollModel::Theoretical);
        assert_eq!(settings.strike_step(), 1.0);
        assert_eq!(settings.premium_decrement(), 0.2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_settings() {
        let toml_content = r#"
[pricing]
model = "fixed"
contract_multiplier = 100

[payoff]
spread_width = 5.0
points = 11

[output]
bundle = true
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.model(), RollModel::Fixed);
        assert_eq!(settings.contract_multiplier(), 100.0);
        assert_eq!(settings.days_per_year(), 365.0);
        assert_eq!(settings.spread_width(), 5.0);
        assert_eq!(settings.payoff_points(), 11);
        assert!(settings.bundle());
        assert_eq!(settings.output_path(), "./output");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ROLAGEM_TEST_OUTPUT_DIR", "/tmp/rolagem-reports");

        let toml_content = r#"
[output]
path = "${ROLAGEM_TEST_OUTPUT_DIR}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.output_path(), "/tmp/rolagem-reports");

        std::env::remove_var("ROLAGEM_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let settings = Settings::from_toml_str("[payoff]\nrange_pct = 3.0\n").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(RollError::InvalidConfigValueError { ref field, .. }) if field == "payoff.range_pct"
        ));
    }

    #[test]
    fn test_unknown_model_is_a_toml_error() {
        let result = Settings::from_toml_str("[pricing]\nmodel = \"monte-carlo\"\n");
        assert!(matches!(result, Err(RollError::TomlError(_))));
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[roll]\nstrike_step = 0.5\ndefault_preference = \"down\"\n")
            .unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.strike_step(), 0.5);
        assert_eq!(settings.default_preference(), RollPreference::Down);
    }
}
