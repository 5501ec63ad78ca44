//! Serve command - starts the API server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;

use tr_api::{ApiServer, ApiServerConfig, AppState};
use tr_platform::FalconClientBuilder;

use crate::config::AppConfig;

/// Server configuration from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Hostname to bind to.
    pub host: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Runs the API server.
pub async fn run_server(config: ServeConfig, app_config: AppConfig) -> Result<()> {
    println!("{} Starting Ticket Relay API server...", "[server]".cyan());

    let builder = match app_config.effective_cloud() {
        Some(cloud) => {
            println!("  {} Falcon cloud: {}", "→".green(), cloud);
            FalconClientBuilder::with_cloud(cloud)
        }
        None => FalconClientBuilder::new(),
    };

    let state = AppState::new(Arc::new(builder));

    let bind_address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid bind address")?;

    println!();
    println!("{}", "Ticket Relay".bold());
    println!("{}", "═".repeat(40));
    println!("  {} http://{}", "Address:".cyan(), bind_address);
    println!();
    println!("{}", "Endpoints:".bold());
    println!("  POST /check_if_ext_entity_exists - Look up an entity mapping");
    println!("  POST /create_entity_mapping      - Insert or overwrite a mapping");
    println!("  POST /create_incident            - Create a ServiceNow incident");
    println!("  POST /create_sir_incident        - Create a ServiceNow SIR incident");
    println!("  POST /throttle                   - Bucketed dedup decision");
    println!("  GET  /health                     - Health check");
    println!("  GET  /live                       - Liveness probe");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    let server = ApiServer::new(state, ApiServerConfig { bind_address });
    server.run().await.context("server error")?;

    println!();
    println!("{} Server stopped", "[server]".cyan());

    Ok(())
}
