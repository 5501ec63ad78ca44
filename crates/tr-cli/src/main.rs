//! Ticket Relay CLI
//!
//! Command-line interface for the Falcon-to-ServiceNow integration
//! helper.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;

use commands::{run_server, ServeConfig};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "ticket-relay")]
#[command(version)]
#[command(about = "Bridges Falcon security workflows to ServiceNow ticketing", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config/default.yaml"));
    let config = AppConfig::load(&config_path).unwrap_or_else(|_| {
        if cli.verbose {
            eprintln!("Using default configuration (no config file found)");
        }
        AppConfig::default()
    });

    init_logging(&cli, &config);

    match cli.command {
        Commands::Serve { port, host } => cmd_serve(ServeConfig { port, host }, config).await,
        Commands::Validate { config: cfg_path } => {
            cmd_validate(cfg_path.unwrap_or(config_path)).await
        }
        Commands::Config => cmd_config(config).await,
    }
}

fn init_logging(cli: &Cli, config: &AppConfig) {
    use tr_observability::logging::{init_logging_with_config, LoggingConfig};

    let mut logging = if config.is_production {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    };

    if cli.verbose {
        logging.level = tracing::Level::DEBUG;
    } else if let Ok(level) = config.logging.level.parse() {
        logging.level = level;
    }

    init_logging_with_config(logging);
}

async fn cmd_serve(serve_config: ServeConfig, app_config: AppConfig) -> Result<()> {
    let problems = app_config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            println!("  {} {}", "✗".red(), problem);
        }
        println!();
        println!(
            "{}",
            "Server startup aborted due to configuration errors."
                .red()
                .bold()
        );
        std::process::exit(1);
    }

    run_server(serve_config, app_config).await
}

async fn cmd_validate(config_path: PathBuf) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            println!("{}: {}", "Configuration file error".red().bold(), err);
            std::process::exit(1);
        }
    };

    let problems = config.validate();
    if problems.is_empty() {
        println!("{}", "Configuration is valid.".green().bold());
    } else {
        for problem in &problems {
            println!("  {} {}", "✗".red(), problem);
        }
        println!();
        println!("{}", "Configuration validation failed.".red().bold());
        std::process::exit(1);
    }

    Ok(())
}

async fn cmd_config(config: AppConfig) -> Result<()> {
    println!("{}", "Current Configuration".bold());
    println!("─────────────────────");
    println!("  Production mode: {}", config.is_production);
    println!(
        "  Cloud: {}",
        config
            .effective_cloud()
            .unwrap_or_else(|| "us-1 (default)".to_string())
    );
    println!("  Log level: {}", config.logging.level);

    Ok(())
}
