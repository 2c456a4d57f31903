use calendar_etl::utils::logger;
use calendar_etl::{CalendarPipeline, CliConfig, EtlEngine, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let storage = LocalStorage::new(config.output_path.clone().unwrap_or_else(|| ".".to_string()));
    let engine = EtlEngine::new(CalendarPipeline::new(storage, config));

    match engine.run().await {
        Ok(outcome) => {
            for event in &outcome.events {
                println!("{}", event);
            }
            if let Some(path) = outcome.output_path {
                eprintln!("📁 Export saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!("Calendar ETL failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    Ok(())
}
