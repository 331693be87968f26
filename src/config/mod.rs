pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{RollForm, RollModel};
#[cfg(feature = "cli")]
use crate::utils::error::{Result, RollError};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use toml_config::Settings;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rolagem")]
#[command(about = "Suggests an option roll (rolagem) with estimated strike, premium and payoff")]
pub struct CliConfig {
    #[arg(long, default_value = "", help = "Nome do Assessor")]
    pub advisor: String,

    #[arg(long, default_value = "", help = "Nome do Cliente")]
    pub client: String,

    #[arg(long, default_value = "", help = "Tipo de Operação (put, call, put spread, call spread)")]
    pub operation_type: String,

    #[arg(long, default_value = "", help = "Ativo objeto (ex: PETR4)")]
    pub underlying: String,

    #[arg(long, default_value = "", help = "Preço do ativo")]
    pub spot_price: String,

    #[arg(long, default_value = "", help = "Strike Atual")]
    pub current_strike: String,

    #[arg(long, default_value = "", help = "Vencimento Atual (ex: 18/03)")]
    pub current_expiry: String,

    #[arg(long, default_value = "", help = "Novo Vencimento (ex: 15/04)")]
    pub new_expiry: String,

    #[arg(long, default_value = "", help = "Prêmio Atual")]
    pub current_premium: String,

    #[arg(long, default_value = "", help = "Quantidade de Contratos")]
    pub quantity: String,

    #[arg(long, default_value = "", help = "Volatilidade (0.25 ou 25)")]
    pub volatility: String,

    #[arg(long, default_value = "", help = "Preferência de Rolagem (subir, descer, manter)")]
    pub roll_preference: String,

    /// Form file (TOML with a [form] table, or JSON). Flags override its values.
    #[arg(long)]
    pub form: Option<PathBuf>,

    /// Settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the pricing model from the settings file
    #[arg(long)]
    pub model: Option<RollModel>,

    /// Valuation date (yyyy-mm-dd), defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a single zip bundle instead of loose files
    #[arg(long)]
    pub bundle: bool,

    /// Compute and print the suggestion without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of the text panel
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Form values typed on the command line.
    pub fn typed_form(&self) -> RollForm {
        RollForm {
            advisor: self.advisor.clone(),
            client: self.client.clone(),
            operation_type: self.operation_type.clone(),
            underlying: self.underlying.clone(),
            spot_price: self.spot_price.clone(),
            current_strike: self.current_strike.clone(),
            current_expiry: self.current_expiry.clone(),
            new_expiry: self.new_expiry.clone(),
            current_premium: self.current_premium.clone(),
            quantity: self.quantity.clone(),
            volatility: self.volatility.clone(),
            roll_preference: self.roll_preference.clone(),
        }
    }

    /// Loads the settings file (or defaults) and applies command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading settings from: {}", path.display());
                Settings::from_file(path)?
            }
            None => Settings::default(),
        };

        if let Some(model) = self.model {
            settings.pricing.model = model;
            tracing::info!("🔧 Model overridden to: {:?}", model);
        }
        if let Some(output) = &self.output {
            settings.output.path = output.clone();
        }
        if self.bundle {
            settings.output.bundle = true;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.form {
            if !path.exists() {
                return Err(RollError::ConfigError {
                    message: format!("form file {} does not exist", path.display()),
                });
            }
        }
        if let Some(output) = &self.output {
            crate::utils::validation::validate_path("output", output)?;
        }
        Ok(())
    }
}
