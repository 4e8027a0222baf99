//! `confab onboard` — First-time setup.

use confab_config::AppConfig;

pub async fn run() -> confab_core::Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Confab — First-Time Setup");
    println!("=========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    let config = AppConfig::default();
    let data_dir = config.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        println!("  Created data directory: {}", data_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete and re-run onboard.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("  1. Make sure Ollama is running: ollama serve");
        println!("  2. Pull the default model:      ollama pull {}", config.model);
        println!("  3. Start chatting:              confab chat");
    }

    Ok(())
}
