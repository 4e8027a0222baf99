//! `confab doctor` — Diagnose local setup.

use confab_config::AppConfig;
use confab_core::backend::ChatBackend;
use confab_core::error::Error;
use confab_providers::OllamaBackend;
use confab_store::ConversationStore;

pub async fn run() -> confab_core::Result<()> {
    println!("Confab Doctor — Diagnostics");
    println!("===========================\n");

    let mut issues = 0;

    // Config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ok   Config file valid");
                config
            }
            Err(e) => {
                println!("  FAIL Config file invalid: {e}");
                return Err(Error::Config {
                    message: e.to_string(),
                });
            }
        }
    } else {
        println!("  warn No config file — run `confab onboard` (using defaults)");
        issues += 1;
        AppConfig::default()
    };

    // Data directory + conversations file
    let data_dir = config.data_dir();
    if data_dir.exists() {
        println!("  ok   Data directory exists: {}", data_dir.display());
    } else {
        println!("  warn No data directory yet (created on first chat)");
    }

    let conversations = ConversationStore::new(config.conversations_path()).load();
    println!("  ok   Conversations loaded: {} topic(s)", conversations.len());

    // Ollama reachability + model availability
    let backend = OllamaBackend::new(&config.backend.ollama_url);
    match backend.health_check().await {
        Ok(true) => {
            println!("  ok   Ollama reachable at {}", config.backend.ollama_url);
            match backend.list_models().await {
                Ok(models) if models.iter().any(|m| m.starts_with(&config.model)) => {
                    println!("  ok   Model \"{}\" available", config.model);
                }
                Ok(_) => {
                    println!(
                        "  warn Model \"{}\" not pulled — run `ollama pull {}`",
                        config.model, config.model
                    );
                    issues += 1;
                }
                Err(e) => {
                    println!("  warn Could not list models: {e}");
                    issues += 1;
                }
            }
        }
        _ => {
            println!(
                "  FAIL Ollama unreachable at {} — is `ollama serve` running?",
                config.backend.ollama_url
            );
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
