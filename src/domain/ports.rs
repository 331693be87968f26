use crate::domain::model::{RollForm, RollModel, RollPreference, RollReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path` inside this storage.
    fn location(&self, path: &str) -> String;
}

/// Knobs that shape the suggestion and the report, independent of the form.
pub trait SettingsProvider: Send + Sync {
    fn model(&self) -> RollModel;
    fn days_per_year(&self) -> f64;
    fn contract_multiplier(&self) -> f64;
    fn strike_step(&self) -> f64;
    fn premium_decrement(&self) -> f64;
    fn default_preference(&self) -> RollPreference;
    fn spread_width(&self) -> f64;
    fn range_pct(&self) -> f64;
    fn payoff_points(&self) -> usize;
    fn output_path(&self) -> &str;
    fn bundle(&self) -> bool;
    fn chart_size(&self) -> (usize, usize);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RollForm>;
    async fn transform(&self, form: RollForm) -> Result<RollReport>;
    async fn load(&self, report: RollReport) -> Result<String>;
}
