//! The conversation manager — the per-message state machine.
//!
//! For each user message: trim and short-circuit blanks, assemble the
//! context window, call the backend (failures become reply text, not
//! errors), update or create the matching conversation record, persist
//! the whole snapshot, append to the flat log, and optionally synthesize
//! voice. The chat transcript is the single channel for all failure
//! information — there is no separate error surface.
//!
//! The manager owns the in-memory snapshot and takes `&mut self` per
//! message; hosts are responsible for serializing calls (the gateway
//! wraps the manager in a `tokio::sync::RwLock`). No locking happens
//! here.

use crate::context::ContextBuilder;
use crate::title::derive_title;
use confab_core::backend::{ChatBackend, ChatRequest};
use confab_core::message::{ChatMessage, Conversation, ConversationId, Turn};
use confab_core::voice::VoiceSynthesizer;
use confab_store::{ConversationStore, FlatLog};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything one `handle_message` call produces.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The updated current-session turns (input session + the new pair)
    pub session: Vec<Turn>,

    /// Path of the synthesized audio artifact, when requested and successful
    pub audio: Option<PathBuf>,

    /// The conversation the message landed in (None only for blank input
    /// with no active conversation)
    pub conversation_id: Option<ConversationId>,

    /// The full, refreshed ordered list of all topic titles
    pub titles: Vec<String>,
}

/// Orchestrates context assembly, backend calls, and persistence around
/// the owned conversation snapshot.
pub struct ConversationManager {
    store: ConversationStore,
    flat_log: FlatLog,
    backend: Arc<dyn ChatBackend>,
    voice: Option<Arc<dyn VoiceSynthesizer>>,
    context: ContextBuilder,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    voice_lang: String,

    /// The process-wide snapshot: loaded once at construction, mutated in
    /// place, rewritten to disk after every mutation.
    snapshot: Vec<Conversation>,
}

impl ConversationManager {
    /// Create a manager, loading the snapshot from the store.
    pub fn new(
        store: ConversationStore,
        flat_log: FlatLog,
        backend: Arc<dyn ChatBackend>,
        context: ContextBuilder,
        model: impl Into<String>,
    ) -> Self {
        let snapshot = store.load();
        info!(conversations = snapshot.len(), "Conversation manager ready");
        Self {
            store,
            flat_log,
            backend,
            voice: None,
            context,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            voice_lang: "en".into(),
            snapshot,
        }
    }

    /// Attach a voice synthesizer.
    pub fn with_voice(mut self, voice: Arc<dyn VoiceSynthesizer>) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the language tag passed to the synthesizer.
    pub fn with_voice_lang(mut self, lang: impl Into<String>) -> Self {
        self.voice_lang = lang.into();
        self
    }

    /// The current ordered list of all topic titles.
    pub fn titles(&self) -> Vec<String> {
        self.snapshot.iter().map(|c| c.title.clone()).collect()
    }

    /// Read access to the snapshot (tests, status reporting).
    pub fn snapshot(&self) -> &[Conversation] {
        &self.snapshot
    }

    /// Process one user message end to end.
    ///
    /// Takes the current UI session and the active conversation handle,
    /// returns the updated session, the optional audio artifact, the
    /// resolved conversation id, and the refreshed title list. Backend
    /// faults become reply text; storage and voice faults are logged and
    /// masked. Blank input is a no-op.
    pub async fn handle_message(
        &mut self,
        user_text: &str,
        want_voice: bool,
        mut session: Vec<Turn>,
        active_id: Option<ConversationId>,
    ) -> TurnOutcome {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            debug!("Blank input, nothing to do");
            return TurnOutcome {
                session,
                audio: None,
                conversation_id: active_id,
                titles: self.titles(),
            };
        }

        let messages = self.context.build(&self.snapshot, &session, user_text);
        let reply = self.reply_or_error(messages).await;

        session.push(Turn::new(user_text, reply.clone()));

        let conversation_id = self.upsert(active_id, &session);

        // Persist the whole snapshot. A write fault is reported but does
        // not abort the turn: the transcript is the only error surface.
        if let Err(e) = self.store.save(&self.snapshot) {
            error!(error = %e, "Failed to persist conversations");
        }

        // Flat-log only the single new pair, never the whole history.
        // Training-data capture must not block the chat path.
        if let Err(e) = self.flat_log.append(user_text, &reply) {
            warn!(error = %e, "Failed to append flat log record");
        }

        let audio = if want_voice {
            self.synthesize_or_skip(&reply).await
        } else {
            None
        };

        TurnOutcome {
            session,
            audio,
            conversation_id: Some(conversation_id),
            titles: self.titles(),
        }
    }

    /// Look up a stored conversation by title.
    ///
    /// Linear scan, first match wins — titles are not guaranteed unique
    /// and the ambiguity is accepted. Unknown or empty titles return an
    /// empty session and no id.
    pub fn select_topic(&self, title: &str) -> (Vec<Turn>, Option<ConversationId>) {
        if title.is_empty() {
            return (Vec::new(), None);
        }

        match self.snapshot.iter().find(|c| c.title == title) {
            Some(conv) => (conv.turns.clone(), Some(conv.id.clone())),
            None => (Vec::new(), None),
        }
    }

    /// Call the backend; a fault becomes reply text, not an error.
    ///
    /// This is the backend-failure policy branch: the error string is
    /// recorded in the conversation and persisted like any other reply.
    async fn reply_or_error(&self, messages: Vec<ChatMessage>) -> String {
        let mut request = ChatRequest::new(&self.model, messages);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        match self.backend.chat(request).await {
            Ok(reply) => reply.content,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Backend call failed");
                format!("Backend error: {e}")
            }
        }
    }

    /// Update the active conversation, or create a new one when there is
    /// no active handle (or the handle no longer matches anything).
    ///
    /// Updates replace the turns wholesale with the full session and
    /// recompute the title; they never append to stored turns directly.
    fn upsert(&mut self, active_id: Option<ConversationId>, session: &[Turn]) -> ConversationId {
        if let Some(id) = active_id {
            if let Some(conv) = self.snapshot.iter_mut().find(|c| c.id == id) {
                conv.turns = session.to_vec();
                conv.title = derive_title(&conv.turns);
                debug!(id = %id, turns = session.len(), "Conversation updated");
                return id;
            }
            debug!(id = %id, "Active id not found in snapshot, creating new conversation");
        }

        let conv = Conversation::new(derive_title(session), session.to_vec());
        let id = conv.id.clone();
        info!(id = %id, title = %conv.title, "Conversation created");
        self.snapshot.push(conv);
        id
    }

    /// Voice-failure policy branch: synthesis faults are masked entirely.
    async fn synthesize_or_skip(&self, reply: &str) -> Option<PathBuf> {
        let voice = self.voice.as_ref()?;

        match voice.synthesize(reply, &self.voice_lang).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(synthesizer = voice.name(), error = %e, "Voice synthesis failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use confab_core::backend::ChatReply;
    use confab_core::error::{BackendError, VoiceError};
    use tempfile::TempDir;

    /// A mock backend that returns a fixed reply and records the last
    /// request's message count.
    struct MockBackend {
        reply: String,
        seen_messages: std::sync::Mutex<Vec<ChatMessage>>,
    }

    impl MockBackend {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                seen_messages: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn chat(&self, request: ChatRequest) -> Result<ChatReply, BackendError> {
            *self.seen_messages.lock().unwrap() = request.messages;
            Ok(ChatReply {
                content: self.reply.clone(),
                model: request.model,
                usage: None,
            })
        }
    }

    /// A backend that always fails.
    struct BrokenBackend;

    #[async_trait::async_trait]
    impl ChatBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatReply, BackendError> {
            Err(BackendError::Network("connection refused".into()))
        }
    }

    /// A synthesizer that always fails.
    struct BrokenVoice;

    #[async_trait::async_trait]
    impl VoiceSynthesizer for BrokenVoice {
        fn name(&self) -> &str {
            "broken-voice"
        }

        async fn synthesize(&self, _text: &str, _lang: &str) -> Result<PathBuf, VoiceError> {
            Err(VoiceError::Network("no route".into()))
        }
    }

    fn manager_with(dir: &TempDir, backend: Arc<dyn ChatBackend>) -> ConversationManager {
        ConversationManager::new(
            ConversationStore::new(dir.path().join("conversations.json")),
            FlatLog::new(dir.path().join("train.jsonl")),
            backend,
            ContextBuilder::new("test persona"),
            "test-model",
        )
    }

    #[tokio::test]
    async fn first_message_creates_a_conversation() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("Hello!")));

        let outcome = mgr.handle_message("Hi", false, vec![], None).await;

        assert_eq!(outcome.session.len(), 1);
        assert_eq!(outcome.session[0].user, "Hi");
        assert_eq!(outcome.session[0].assistant, "Hello!");
        assert!(outcome.conversation_id.is_some());
        assert_eq!(outcome.titles, vec!["Hi"]);

        // Persisted immediately
        let reloaded = ConversationStore::new(dir.path().join("conversations.json")).load();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].title, "Hi");
        assert_eq!(reloaded[0].turns.len(), 1);
    }

    #[tokio::test]
    async fn followup_replaces_turns_wholesale() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let first = mgr.handle_message("original question", false, vec![], None).await;
        let id = first.conversation_id.clone().unwrap();

        let second = mgr
            .handle_message("more", false, first.session, Some(id.clone()))
            .await;

        assert_eq!(second.conversation_id, Some(id.clone()));
        assert_eq!(second.session.len(), 2);

        let stored = mgr.snapshot().iter().find(|c| c.id == id).unwrap();
        assert_eq!(stored.turns.len(), 2);
        assert_eq!(stored.turns, second.session);
        // Title still reflects the first turn
        assert_eq!(stored.title, "original question");
        assert_eq!(mgr.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn stale_handle_creates_a_fresh_conversation() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let ghost = ConversationId::from("no-such-conversation");
        let outcome = mgr.handle_message("hello", false, vec![], Some(ghost.clone())).await;

        let id = outcome.conversation_id.unwrap();
        assert_ne!(id, ghost);
        assert_eq!(mgr.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn backend_fault_becomes_reply_text_and_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(BrokenBackend));

        let outcome = mgr.handle_message("hello", false, vec![], None).await;

        let reply = &outcome.session.last().unwrap().assistant;
        assert!(reply.contains("Backend error"), "got: {reply}");
        assert!(reply.contains("connection refused"));

        // Still persisted to the store...
        let reloaded = ConversationStore::new(dir.path().join("conversations.json")).load();
        assert_eq!(reloaded[0].turns[0].assistant, *reply);

        // ...and to the flat log
        let flat = std::fs::read_to_string(dir.path().join("train.jsonl")).unwrap();
        assert!(flat.contains("connection refused"));
    }

    #[tokio::test]
    async fn save_fault_does_not_abort_the_turn() {
        let dir = TempDir::new().unwrap();
        // A plain file where the store expects a parent directory makes
        // every save fail while the rest of the turn stays healthy.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut mgr = ConversationManager::new(
            ConversationStore::new(blocker.join("conversations.json")),
            FlatLog::new(dir.path().join("train.jsonl")),
            Arc::new(MockBackend::new("still fine")),
            ContextBuilder::new("test persona"),
            "test-model",
        );

        let outcome = mgr.handle_message("hello", false, vec![], None).await;

        assert_eq!(outcome.session.len(), 1);
        assert_eq!(outcome.session[0].assistant, "still fine");
        assert!(outcome.conversation_id.is_some());
        assert_eq!(outcome.titles, vec!["hello"]);
        assert_eq!(mgr.snapshot().len(), 1);

        // The flat log still received the pair
        let flat = std::fs::read_to_string(dir.path().join("train.jsonl")).unwrap();
        assert!(flat.contains(r#""instruction":"hello""#));
    }

    #[tokio::test]
    async fn blank_input_is_a_complete_no_op() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));
        mgr.handle_message("seed topic", false, vec![], None).await;
        let titles_before = mgr.titles();

        let outcome = mgr.handle_message("   \t  ", false, vec![], None).await;

        assert!(outcome.session.is_empty());
        assert!(outcome.audio.is_none());
        assert!(outcome.conversation_id.is_none());
        assert_eq!(outcome.titles, titles_before);
        assert_eq!(mgr.snapshot().len(), 1);
        // No new flat log records either
        let flat = std::fs::read_to_string(dir.path().join("train.jsonl")).unwrap();
        assert_eq!(flat.lines().count(), 1);
    }

    #[tokio::test]
    async fn blank_input_keeps_the_active_handle() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));
        let id = ConversationId::from("still-active");

        let outcome = mgr.handle_message("", false, vec![], Some(id.clone())).await;
        assert_eq!(outcome.conversation_id, Some(id));
    }

    #[tokio::test]
    async fn input_is_trimmed_before_everything() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let outcome = mgr.handle_message("  spaced out  ", false, vec![], None).await;
        assert_eq!(outcome.session[0].user, "spaced out");
        assert_eq!(outcome.titles, vec!["spaced out"]);
    }

    #[tokio::test]
    async fn context_includes_session_and_new_message() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new("ok"));
        let mut mgr = manager_with(&dir, backend.clone());

        let session = vec![Turn::new("earlier", "reply")];
        mgr.handle_message("now", false, session, None).await;

        let seen = backend.seen_messages.lock().unwrap().clone();
        // persona + session user + session assistant + new user
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].content, "test persona");
        assert_eq!(seen[1].content, "earlier");
        assert_eq!(seen[2].content, "reply");
        assert_eq!(seen[3].content, "now");
    }

    #[tokio::test]
    async fn stored_history_reaches_the_backend_as_memory() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new("ok"));
        let mut mgr = manager_with(&dir, backend.clone());

        mgr.handle_message("remember me", false, vec![], None).await;
        // New session, no handle — a different topic
        mgr.handle_message("second topic", false, vec![], None).await;

        let seen = backend.seen_messages.lock().unwrap().clone();
        // persona + memory block + new user message
        assert_eq!(seen.len(), 3);
        assert!(seen[1].content.contains("User: remember me"));
    }

    #[tokio::test]
    async fn select_topic_returns_stored_turns() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let created = mgr.handle_message("pick me", false, vec![], None).await;
        let (turns, id) = mgr.select_topic("pick me");

        assert_eq!(id, created.conversation_id);
        assert_eq!(turns, created.session);
    }

    #[tokio::test]
    async fn select_topic_unknown_or_empty_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));
        mgr.handle_message("exists", false, vec![], None).await;

        assert_eq!(mgr.select_topic("no such title"), (Vec::new(), None));
        assert_eq!(mgr.select_topic(""), (Vec::new(), None));
    }

    #[tokio::test]
    async fn select_topic_first_match_wins_on_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let first = mgr.handle_message("same words", false, vec![], None).await;
        let _second = mgr.handle_message("same words", false, vec![], None).await;
        assert_eq!(mgr.snapshot().len(), 2);

        let (_, id) = mgr.select_topic("same words");
        assert_eq!(id, first.conversation_id);
    }

    #[tokio::test]
    async fn voice_fault_is_masked() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")))
            .with_voice(Arc::new(BrokenVoice));

        let outcome = mgr.handle_message("speak up", true, vec![], None).await;

        assert!(outcome.audio.is_none());
        // The turn still went through normally
        assert_eq!(outcome.session.len(), 1);
        assert_eq!(mgr.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn no_synthesizer_means_no_audio_even_when_requested() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        let outcome = mgr.handle_message("speak up", true, vec![], None).await;
        assert!(outcome.audio.is_none());
    }

    #[tokio::test]
    async fn titles_accumulate_in_creation_order() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_with(&dir, Arc::new(MockBackend::new("ok")));

        mgr.handle_message("first", false, vec![], None).await;
        mgr.handle_message("second", false, vec![], None).await;
        mgr.handle_message("third", false, vec![], None).await;

        assert_eq!(mgr.titles(), vec!["first", "second", "third"]);
    }
}
