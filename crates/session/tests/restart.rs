//! Memory must survive a process restart: a fresh manager pointed at the
//! same data directory sees every stored topic and feeds the old turns
//! back to the backend as the memory block.

use confab_core::backend::{ChatBackend, ChatReply, ChatRequest};
use confab_core::error::BackendError;
use confab_core::message::ChatMessage;
use confab_session::{ContextBuilder, ConversationManager};
use confab_store::{ConversationStore, FlatLog};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct RecordingBackend {
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingBackend {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, BackendError> {
        self.seen.lock().unwrap().push(request.messages);
        Ok(ChatReply {
            content: "noted".into(),
            model: request.model,
            usage: None,
        })
    }
}

fn manager_in(dir: &TempDir, backend: Arc<dyn ChatBackend>) -> ConversationManager {
    ConversationManager::new(
        ConversationStore::new(dir.path().join("conversations.json")),
        FlatLog::new(dir.path().join("train.jsonl")),
        backend,
        ContextBuilder::new("persona"),
        "test-model",
    )
}

#[tokio::test]
async fn conversations_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    // First "process": create two topics
    {
        let mut mgr = manager_in(&dir, Arc::new(RecordingBackend::new()));
        mgr.handle_message("my dog is named Rex", false, vec![], None).await;
        mgr.handle_message("I live in Lisbon", false, vec![], None).await;
    }

    // Second "process": same directory, fresh manager
    let backend = Arc::new(RecordingBackend::new());
    let mut mgr = manager_in(&dir, backend.clone());

    assert_eq!(mgr.titles(), vec!["my dog is named Rex", "I live in Lisbon"]);

    let (turns, id) = mgr.select_topic("I live in Lisbon");
    assert!(id.is_some());
    assert_eq!(turns.len(), 1);

    // A new message gets the old turns as memory
    mgr.handle_message("what do you know about me?", false, vec![], None).await;

    let seen = backend.seen.lock().unwrap();
    let messages = &seen[0];
    let memory = &messages[1].content;
    assert!(memory.contains("User: my dog is named Rex"));
    assert!(memory.contains("User: I live in Lisbon"));
}

#[tokio::test]
async fn flat_log_accumulates_across_restarts() {
    let dir = TempDir::new().unwrap();

    {
        let mut mgr = manager_in(&dir, Arc::new(RecordingBackend::new()));
        mgr.handle_message("one", false, vec![], None).await;
    }
    {
        let mut mgr = manager_in(&dir, Arc::new(RecordingBackend::new()));
        mgr.handle_message("two", false, vec![], None).await;
    }

    let flat = std::fs::read_to_string(dir.path().join("train.jsonl")).unwrap();
    let records: Vec<serde_json::Value> = flat
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["instruction"], "one");
    assert_eq!(records[0]["output"], "noted");
    assert_eq!(records[1]["instruction"], "two");
}
