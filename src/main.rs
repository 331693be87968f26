use clap::Parser;
use rolagem::core::{report, SettingsProvider};
use rolagem::utils::{error::RollError, logger, validation::Validate};
use rolagem::{CliConfig, LocalStorage, RollEngine, RollPipeline, RollReport};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting rolagem");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Roll suggestion failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> Result<(), RollError> {
    config.validate()?;
    let settings = config.settings()?;
    tracing::info!("✅ Settings loaded and validated");

    let as_of = config.as_of_date();
    let storage = LocalStorage::new(settings.output_path().to_string());
    let mut pipeline = RollPipeline::new(storage, settings.clone(), config.typed_form(), as_of);
    if let Some(path) = &config.form {
        pipeline = pipeline.with_form_file(path.clone());
    }

    let engine = RollEngine::new(pipeline);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let report = engine.preview().await?;
        print_report(&report, &settings, config.json)?;
        return Ok(());
    }

    let (report, output_path) = engine.run().await?;
    print_report(&report, &settings, config.json)?;
    if !config.json {
        println!("📁 Report saved to: {}", output_path);
    }

    Ok(())
}

fn print_report<C: SettingsProvider>(
    report: &RollReport,
    settings: &C,
    json: bool,
) -> Result<(), RollError> {
    if json {
        println!("{}", report::to_json(report)?);
        return Ok(());
    }

    let (width, height) = settings.chart_size();
    println!("{}", report::render_panel(&report.input, &report.suggestion));
    println!(
        "{}",
        report::render_chart(&report.suggestion.payoff, width, height)
    );
    Ok(())
}
