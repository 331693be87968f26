use crate::core::Pipeline;
use crate::domain::model::RollReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct RollEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> RollEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract and transform only; nothing is written.
    pub async fn preview(&self) -> Result<RollReport> {
        tracing::info!("Reading form...");
        let form = self.pipeline.extract().await?;

        tracing::info!("Computing roll suggestion...");
        self.pipeline.transform(form).await
    }

    /// Runs the full pipeline and returns the report together with where it was saved.
    pub async fn run(&self) -> Result<(RollReport, String)> {
        let started = Instant::now();

        let report = self.preview().await?;

        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(report.clone()).await?;
        tracing::info!(
            "Report saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok((report, output_path))
    }
}
