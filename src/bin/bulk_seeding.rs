use anyhow::Context;
use cell_splitter::utils::{logger, validation::Validate};
use cell_splitter::{BulkConfig, BulkSeedingPipeline, Catalog, LocalStorage, PlanningEngine};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BulkConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting bulk seeding planner");
    tracing::info!("📁 Reading requests from: {}", config.input);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }

    let catalog = match &config.catalog {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog '{}'", path))?,
        None => Catalog::builtin().context("Failed to load built-in catalog")?,
    };
    catalog.validate().context("Catalog is invalid")?;

    // paths in the config are used as given, relative to the working directory
    let storage = LocalStorage::new(String::new());
    let pipeline = BulkSeedingPipeline::new(storage, config, catalog);
    let engine = PlanningEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Bulk plan completed");
            println!("✅ Bulk plan completed");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Bulk plan failed: {} (status {})", e, e.status_code());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}
