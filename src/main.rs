use clap::Parser;
use colored::Colorize;

use linkmeter::cli::{Cli, Commands};
use linkmeter::config::{StaticConfig, get_config, init_config, init_config_from};
use linkmeter::errors::LinkmeterError;
use linkmeter::runtime::modes::run_server;
use linkmeter::system::logging::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.config.as_deref() {
        Some(path) => init_config_from(path),
        None => init_config(),
    }

    let result = match cli.command {
        Some(Commands::GenerateConfig { output }) => generate_config(output.as_deref()),
        Some(Commands::Serve) | None => serve().await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<LinkmeterError>() {
            Some(err) => eprintln!("{}\n  {:#}", err.format_colored(), e),
            None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
        }
        std::process::exit(1);
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = get_config();
    // Held until exit so buffered log lines are flushed.
    let _guard = init_logging(&config.logging)?;
    run_server(&config).await
}

fn generate_config(output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default().save_to_file(path)?;
            println!("{} Configuration written to {}", "[OK]".green().bold(), path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
