//! `confab chat` — Interactive or single-message chat mode.

use confab_config::AppConfig;
use confab_core::error::Error;
use confab_core::message::{ConversationId, Turn};
use confab_providers::OllamaBackend;
use confab_session::{ContextBuilder, ConversationManager};
use confab_store::{ConversationStore, FlatLog};
use confab_voice::GoogleTts;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Assemble a fully wired manager from the loaded config.
pub fn build_manager(config: &AppConfig) -> ConversationManager {
    let backend = Arc::new(OllamaBackend::new(&config.backend.ollama_url));

    let context =
        ContextBuilder::new(&config.assistant.persona).with_recent_limit(config.memory.recent_pairs);

    let mut manager = ConversationManager::new(
        ConversationStore::new(config.conversations_path()),
        FlatLog::new(config.flat_log_path()),
        backend,
        context,
        &config.model,
    )
    .with_temperature(config.temperature)
    .with_voice_lang(&config.voice.lang);

    if let Some(max_tokens) = config.max_tokens {
        manager = manager.with_max_tokens(max_tokens);
    }

    if config.voice.enabled {
        manager = manager.with_voice(Arc::new(GoogleTts::new(config.audio_dir())));
    }

    manager
}

pub async fn run(message: Option<String>, voice: bool) -> confab_core::Result<()> {
    let config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;
    let mut manager = build_manager(&config);

    if let Some(msg) = message {
        // Single message mode: one turn, still persisted like any other
        let outcome = manager.handle_message(&msg, voice, Vec::new(), None).await;
        if let Some(turn) = outcome.session.last() {
            println!("{}", turn.assistant);
        }
        if let Some(audio) = outcome.audio {
            eprintln!("  (audio: {})", audio.display());
        }
        return Ok(());
    }

    interactive(&config, &mut manager, voice).await
}

async fn interactive(
    config: &AppConfig,
    manager: &mut ConversationManager,
    voice: bool,
) -> confab_core::Result<()> {
    println!();
    println!("  Confab — {} on {}", config.model, config.backend.ollama_url);
    println!("  Topics saved: {}", manager.titles().len());
    println!();
    println!("  /new            start a fresh topic");
    println!("  /topics         list saved topics");
    println!("  /open <title>   resume a topic by title");
    println!("  exit            quit");
    println!();

    let mut session: Vec<Turn> = Vec::new();
    let mut active_id: Option<ConversationId> = None;

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" => break,
            "/new" => {
                session.clear();
                active_id = None;
                println!("  (new topic)");
                continue;
            }
            "/topics" => {
                let titles = manager.titles();
                if titles.is_empty() {
                    println!("  (no saved topics)");
                }
                for title in titles {
                    println!("  - {title}");
                }
                continue;
            }
            _ => {}
        }

        if let Some(title) = input.strip_prefix("/open ") {
            let (turns, id) = manager.select_topic(title.trim());
            if id.is_none() {
                println!("  (no topic titled \"{}\")", title.trim());
                continue;
            }
            println!("  (resumed \"{}\", {} turns)", title.trim(), turns.len());
            session = turns;
            active_id = id;
            continue;
        }

        eprint!("  ...");
        let outcome = manager
            .handle_message(input, voice, std::mem::take(&mut session), active_id.take())
            .await;
        eprint!("\r      \r");

        if let Some(turn) = outcome.session.last() {
            println!("  Confab > {}", turn.assistant);
        }
        if let Some(audio) = &outcome.audio {
            eprintln!("  (audio: {})", audio.display());
        }
        println!();

        session = outcome.session;
        active_id = outcome.conversation_id;
    }

    Ok(())
}
