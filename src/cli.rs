//! Command-line interface

use clap::{Parser, Subcommand};

/// linkmeter - URL shortener with click analytics
#[derive(Parser, Debug)]
#[command(name = "linkmeter")]
#[command(version)]
#[command(about = "URL shortener with click analytics", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: ./config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print a sample configuration file, or write it to a path
    GenerateConfig {
        /// Output file path (default: stdout)
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["linkmeter"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["linkmeter", "serve", "-c", "prod.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve));
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
    }

    #[test]
    fn test_generate_config_output() {
        let cli = Cli::try_parse_from(["linkmeter", "generate-config", "out.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::GenerateConfig {
                output: Some("out.toml".to_string())
            })
        );
    }
}
