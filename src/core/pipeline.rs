use crate::core::{report, roll};
use crate::domain::model::{RollForm, RollReport};
use crate::domain::ports::{Pipeline, SettingsProvider, Storage};
use crate::utils::error::{Result, RollError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_JSON: &str = "rolagem.json";
pub const PAYOFF_CSV: &str = "payoff.csv";
pub const PANEL_TXT: &str = "panel.txt";
pub const BUNDLE_ZIP: &str = "rolagem_report.zip";

#[derive(Deserialize)]
struct FormFile {
    form: RollForm,
}

/// Parses a form file: JSON object when the extension is `.json`, otherwise
/// TOML with a `[form]` table.
pub fn parse_form_file(path: &Path, content: &str) -> Result<RollForm> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(content)?)
    } else {
        let file: FormFile = toml::from_str(content)?;
        Ok(file.form)
    }
}

pub struct RollPipeline<S: Storage, C: SettingsProvider> {
    pub(crate) storage: S,
    pub(crate) settings: C,
    form: RollForm,
    form_file: Option<PathBuf>,
    as_of: NaiveDate,
}

impl<S: Storage, C: SettingsProvider> RollPipeline<S, C> {
    pub fn new(storage: S, settings: C, form: RollForm, as_of: NaiveDate) -> Self {
        Self {
            storage,
            settings,
            form,
            form_file: None,
            as_of,
        }
    }

    /// Reads blank fields from `path` during extract.
    pub fn with_form_file(mut self, path: PathBuf) -> Self {
        self.form_file = Some(path);
        self
    }

    fn text_panel(&self, report: &RollReport) -> String {
        let (width, height) = self.settings.chart_size();
        let mut panel = report::render_panel(&report.input, &report.suggestion);
        panel.push('\n');
        panel.push_str(&report::render_chart(
            &report.suggestion.payoff,
            width,
            height,
        ));
        panel
    }

    fn bundle(&self, json: &str, csv: &str, panel: &str) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>(REPORT_JSON, FileOptions::default())?;
        zip.write_all(json.as_bytes())?;

        zip.start_file::<_, ()>(PAYOFF_CSV, FileOptions::default())?;
        zip.write_all(csv.as_bytes())?;

        zip.start_file::<_, ()>(PANEL_TXT, FileOptions::default())?;
        zip.write_all(panel.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: SettingsProvider> Pipeline for RollPipeline<S, C> {
    async fn extract(&self) -> Result<RollForm> {
        let mut form = self.form.clone();

        if let Some(path) = &self.form_file {
            tracing::debug!("Reading form file: {}", path.display());
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                RollError::ConfigError {
                    message: format!("cannot read form file {}: {}", path.display(), e),
                }
            })?;
            form.merge_missing(parse_form_file(path, &content)?);
        }

        Ok(form)
    }

    async fn transform(&self, form: RollForm) -> Result<RollReport> {
        let input = form.parse(self.as_of, &self.settings)?;
        let suggestion = roll::suggest(&input, &self.settings)?;

        Ok(RollReport {
            input,
            suggestion,
            generated_at: chrono::Local::now(),
        })
    }

    async fn load(&self, report: RollReport) -> Result<String> {
        let json = report::to_json(&report)?;
        let csv = report::payoff_csv(&report.suggestion.payoff)?;
        let panel = self.text_panel(&report);

        if self.settings.bundle() {
            let zip_data = self.bundle(&json, &csv, &panel)?;
            tracing::debug!("Writing report bundle ({} bytes)", zip_data.len());
            self.storage.write_file(BUNDLE_ZIP, &zip_data).await?;
            return Ok(self.storage.location(BUNDLE_ZIP));
        }

        self.storage.write_file(REPORT_JSON, json.as_bytes()).await?;
        self.storage.write_file(PAYOFF_CSV, csv.as_bytes()).await?;
        self.storage.write_file(PANEL_TXT, panel.as_bytes()).await?;
        tracing::debug!("Report files written");

        Ok(self.storage.location(REPORT_JSON))
    }
}
