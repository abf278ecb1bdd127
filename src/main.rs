use anyhow::Context;
use cell_splitter::utils::{logger, validation::Validate};
use cell_splitter::{Catalog, CliConfig, SeedingCalculator};
use clap::Parser;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }

    let catalog = match &config.catalog {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog '{}'", path))?,
        None => Catalog::builtin().context("Failed to load built-in catalog")?,
    };
    catalog.validate().context("Catalog is invalid")?;
    tracing::debug!(
        "Catalog: {} vessels, {} cell lines, {} cultures",
        catalog.vessels.len(),
        catalog.cell_lines.len(),
        catalog.cultures.len()
    );

    let calculator = SeedingCalculator::new(catalog);

    if config.list_cell_lines {
        let lines = calculator.doubling_times();
        for line in &lines {
            tracing::debug!("{}: {}", line.name, line.display_doubling_time());
        }
        print_json(&serde_json::to_value(lines)?, config.pretty)?;
        return Ok(());
    }

    let raw = match config.request.as_deref() {
        Some(path) if path != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read request '{}'", path))?,
        _ => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read request from stdin")?;
            buffer
        }
    };
    let payload: serde_json::Value =
        serde_json::from_str(&raw).context("Request is not valid JSON")?;

    let (status, body) = calculator.respond(&payload);
    print_json(&body, config.pretty)?;

    match status {
        200 => Ok(()),
        404 => std::process::exit(4),
        _ => std::process::exit(1),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
