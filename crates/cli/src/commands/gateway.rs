//! `confab gateway` — Start the HTTP API server.

use confab_config::AppConfig;
use confab_core::error::Error;

pub async fn run(port_override: Option<u16>) -> confab_core::Result<()> {
    let mut config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Confab Gateway");
    println!("  Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("  Backend:   {}", config.backend.ollama_url);

    confab_gateway::start(config).await?;

    Ok(())
}
