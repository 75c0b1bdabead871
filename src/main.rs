use clap::Parser;
use cugold_regime::cli::{Cli, Commands};
use cugold_regime::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry; the guard writes the metrics snapshot on exit
    let _telemetry = cugold_regime::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            let result = args.execute(&config)?;
            tracing::info!(
                run_id = %result.run_id,
                accepted = result.summary.accepted(),
                "Backtest finished"
            );
        }
        Commands::Config => {
            println!("# Effective configuration ({})", cli.config);
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
