pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::Settings};
pub use crate::core::{engine::RollEngine, pipeline::RollPipeline};
pub use domain::model::{
    OperationType, PayoffPoint, RollForm, RollInput, RollModel, RollPreference, RollReport,
    RollSuggestion,
};
pub use utils::error::{Result, RollError};
