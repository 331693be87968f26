pub mod engine;
pub mod form;
pub mod payoff;
pub mod pipeline;
pub mod pricing;
pub mod report;
pub mod roll;

pub use crate::domain::model::{RollForm, RollInput, RollReport, RollSuggestion};
pub use crate::domain::ports::{Pipeline, SettingsProvider, Storage};
pub use crate::utils::error::Result;
