//! `confab topics` — List saved conversation topics.

use confab_config::AppConfig;
use confab_core::error::Error;
use confab_store::ConversationStore;

pub async fn run() -> confab_core::Result<()> {
    let config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;

    let conversations = ConversationStore::new(config.conversations_path()).load();
    if conversations.is_empty() {
        println!("No saved topics yet. Start one with `confab chat`.");
        return Ok(());
    }

    println!("Saved topics ({}):", conversations.len());
    for conv in &conversations {
        println!("  {}  ({} turns)", conv.title, conv.turns.len());
    }

    Ok(())
}
