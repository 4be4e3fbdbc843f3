use crate::api::ChatApiProvider;
use crate::config::ProviderConfig;
use crate::models::{
    ChatMessage, DifficultyLevel, InterviewRecord, InterviewType, RecentInterviewSummary, User,
};
use crate::prompts;
use crate::score;
use crate::session::ChatSession;
use crate::storage::RecordStore;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use uuid::Uuid;

/// The discrete stage of the interview lifecycle currently active. The
/// controller owns the single authoritative `Phase` value; the front end
/// renders whatever the current phase affords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Login,
    SelectingType,
    SelectingDifficulty,
    StartingInterview,
    Ready,
    Error,
}

/// Drives the interview lifecycle: login, type/difficulty selection, the
/// exchange loop, and persistence of completed sessions.
///
/// Single-flow by construction (`&mut self` commands); the `busy` flag is
/// what the front end uses to block a second send while one is outstanding.
pub struct InterviewController {
    records: RecordStore,
    provider: Arc<dyn ChatApiProvider>,
    config: ProviderConfig,
    api_key: Option<String>,

    phase: Phase,
    current_user: Option<User>,
    messages: Vec<ChatMessage>,
    session: Option<ChatSession>,
    selected_type: Option<InterviewType>,
    selected_difficulty: Option<DifficultyLevel>,
    busy: bool,
    awaiting_final_summary: bool,
    error: Option<String>,
    login_error: Option<String>,
    api_key_missing: bool,
    recent_interviews: Vec<RecentInterviewSummary>,
}

impl InterviewController {
    pub fn new(
        records: RecordStore,
        provider: Arc<dyn ChatApiProvider>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            records,
            provider,
            config,
            api_key: None,
            phase: Phase::Initializing,
            current_user: None,
            messages: Vec::new(),
            session: None,
            selected_type: None,
            selected_difficulty: None,
            busy: false,
            awaiting_final_summary: false,
            error: None,
            login_error: None,
            api_key_missing: false,
            recent_interviews: Vec::new(),
        }
    }

    /// Startup: resolves the backend credential (absence is fatal), loads
    /// recent summaries and any persisted current user.
    pub async fn initialize(&mut self) {
        self.busy = true;
        self.error = None;

        match self.config.resolve_api_key() {
            Ok(key) => {
                self.api_key = Some(key);
                self.api_key_missing = false;
            }
            Err(e) => {
                log::error!("API key resolution failed: {:?}", e);
                self.error = Some(
                    "API key is not configured. Please configure it to use the AI features."
                        .to_string(),
                );
                self.api_key_missing = true;
                self.phase = Phase::Error;
                self.busy = false;
                return;
            }
        }

        self.refresh_recent_summaries().await;

        match self.records.load_current_user().await {
            Ok(Some(user)) => {
                log::info!("Resuming session for '{}'", user.name);
                self.current_user = Some(user);
                self.phase = Phase::SelectingType;
            }
            Ok(None) => {
                self.phase = Phase::Login;
            }
            Err(e) => {
                log::error!("Failed to load current user: {:?}", e);
                self.error = Some(format!("Failed to access saved session: {}", e));
                self.phase = Phase::Login;
            }
        }
        self.busy = false;
    }

    /// Login submission. Validation failures keep the phase unchanged and
    /// set `login_error`; success persists the user and advances.
    pub async fn login(&mut self, name: &str, age_input: &str) {
        if self.phase != Phase::Login {
            return;
        }
        self.login_error = None;

        let name = name.trim();
        if name.is_empty() {
            self.login_error = Some("Name cannot be empty.".to_string());
            return;
        }
        let age = match age_input.trim().parse::<i64>() {
            Ok(age) if (5..=120).contains(&age) => age as u8,
            _ => {
                self.login_error = Some("Please enter a valid age (5-120).".to_string());
                return;
            }
        };

        let user = User { name: name.to_string(), age };
        if let Err(e) = self.records.save_current_user(&user).await {
            // Non-fatal: the session continues unpersisted.
            log::error!("Failed to persist current user: {:?}", e);
            self.error = Some(format!("Failed to save login locally: {}", e));
        }
        self.current_user = Some(user);
        self.phase = Phase::SelectingType;
    }

    pub fn select_type(&mut self, interview_type: InterviewType) {
        if self.phase != Phase::SelectingType {
            return;
        }
        self.selected_type = Some(interview_type);
        self.phase = Phase::SelectingDifficulty;
    }

    pub fn back_to_type_selection(&mut self) {
        if self.phase != Phase::SelectingDifficulty {
            return;
        }
        self.selected_difficulty = None;
        self.phase = Phase::SelectingType;
    }

    /// Difficulty choice; synchronously begins session creation and the
    /// opening exchange. Success lands in `Ready`, failure in `Error`.
    pub async fn select_difficulty(&mut self, difficulty: DifficultyLevel) {
        if self.phase != Phase::SelectingDifficulty {
            return;
        }
        let Some(user) = self.current_user.clone() else {
            self.error = Some("User not logged in. Please login first.".to_string());
            self.phase = Phase::Login;
            return;
        };
        self.selected_difficulty = Some(difficulty);
        self.phase = Phase::StartingInterview;
        self.busy = true;
        self.error = None;
        self.messages.clear();

        let Some(interview_type) = self.selected_type else {
            self.error = Some("Interview type not selected. Please restart.".to_string());
            self.phase = Phase::Error;
            self.busy = false;
            return;
        };
        let Some(api_key) = self.api_key.clone() else {
            self.error = Some("API key is not configured.".to_string());
            self.phase = Phase::Error;
            self.busy = false;
            return;
        };

        let mut session = ChatSession::open(
            self.provider.clone(),
            self.config.clone(),
            api_key,
            prompts::INITIAL_SYSTEM_INSTRUCTION,
        );

        // Placeholder the opening reply lands in.
        self.messages.push(ChatMessage::ai(""));

        let opening = prompts::opening_prompt(&user, interview_type, difficulty);
        match session.send(&opening).await {
            Ok(reply) => {
                if let Some(msg) = self.messages.last_mut() {
                    msg.text = reply;
                }
                self.session = Some(session);
                self.phase = Phase::Ready;
            }
            Err(e) => {
                log::error!("Failed to start interview: {:?}", e);
                self.error = Some(format!("Failed to start interview. Error: {}.", e));
                self.phase = Phase::Error;
            }
        }
        self.busy = false;
    }

    /// Sends a free-form user message and streams the reply into the
    /// transcript.
    pub async fn send_message(&mut self, text: &str) {
        self.send_message_with(text, |_| {}).await;
    }

    /// Like [`send_message`], invoking `on_delta` after each received
    /// fragment (once the in-memory transcript has been updated) so a
    /// display can redraw incrementally.
    ///
    /// [`send_message`]: InterviewController::send_message
    pub async fn send_message_with<F: FnMut(&str)>(&mut self, text: &str, on_delta: F) {
        self.run_exchange(text, false, on_delta).await;
    }

    /// Requests the final overall summary, then persists the interview
    /// record built from the full transcript. Phase stays `Ready`.
    pub async fn end_interview(&mut self) {
        self.end_interview_with(|_| {}).await;
    }

    pub async fn end_interview_with<F: FnMut(&str)>(&mut self, on_delta: F) {
        if self.phase != Phase::Ready || self.busy || self.awaiting_final_summary {
            return;
        }
        self.awaiting_final_summary = true;
        let final_text = self
            .run_exchange(prompts::FINAL_SUMMARY_REQUEST_PROMPT, true, on_delta)
            .await;
        if let Some(final_text) = final_text {
            self.save_interview_record(&final_text).await;
        }
        self.awaiting_final_summary = false;
    }

    /// Clears in-memory session state; persisted history is untouched.
    pub fn restart(&mut self) {
        self.messages.clear();
        self.selected_type = None;
        self.selected_difficulty = None;
        self.session = None;
        self.error = None;
        self.busy = false;
        self.awaiting_final_summary = false;
        self.phase = if self.current_user.is_some() {
            Phase::SelectingType
        } else {
            Phase::Login
        };
    }

    /// Clears the current-user pointer and all in-memory session state,
    /// then recomputes recent summaries. History survives logout.
    pub async fn logout(&mut self) {
        if let Err(e) = self.records.clear_current_user().await {
            log::error!("Failed to clear current user: {:?}", e);
            self.error = Some(format!("Failed to clear saved login: {}", e));
        }
        self.current_user = None;
        self.restart();
        self.refresh_recent_summaries().await;
        self.phase = Phase::Login;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // --- accessors for the interaction surface ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_awaiting_final_summary(&self) -> bool {
        self.awaiting_final_summary
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn api_key_missing(&self) -> bool {
        self.api_key_missing
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn selected_type(&self) -> Option<InterviewType> {
        self.selected_type
    }

    pub fn selected_difficulty(&self) -> Option<DifficultyLevel> {
        self.selected_difficulty
    }

    pub fn recent_interviews(&self) -> &[RecentInterviewSummary] {
        &self.recent_interviews
    }

    // --- internals ---

    /// One streamed exchange: appends the user message and an AI placeholder,
    /// then overwrites the placeholder as fragments arrive. Returns the
    /// accumulated reply text, or `None` when the command was ignored.
    async fn run_exchange<F: FnMut(&str)>(
        &mut self,
        text: &str,
        is_summary_request: bool,
        mut on_delta: F,
    ) -> Option<String> {
        if self.phase != Phase::Ready
            || self.busy
            || self.api_key_missing
            || self.current_user.is_none()
        {
            return None;
        }
        // Single-flight: the session is taken for the duration of the
        // exchange, so a re-entrant send cannot race the transcript.
        let mut session = self.session.take()?;
        self.busy = true;
        self.error = None;

        self.messages.push(ChatMessage::user(text));
        self.messages.push(ChatMessage::ai(""));

        let mut accumulated = String::new();
        let mut failed = false;

        match session.send_streaming(text).await {
            Ok(mut stream) => {
                while let Some(delta) = stream.next().await {
                    match delta {
                        Ok(chunk) => {
                            accumulated.push_str(&chunk);
                            if let Some(msg) = self.messages.last_mut() {
                                msg.text.push_str(&chunk);
                            }
                            on_delta(&chunk);
                        }
                        Err(e) => {
                            log::error!("Stream failed mid-exchange: {:?}", e);
                            self.fail_exchange(&mut accumulated, &e);
                            failed = true;
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to open exchange: {:?}", e);
                self.fail_exchange(&mut accumulated, &e);
                failed = true;
            }
        }

        if !failed {
            session.finish_streaming(&accumulated);
            if accumulated.is_empty() && !is_summary_request {
                if let Some(msg) = self.messages.last_mut() {
                    msg.text = prompts::EMPTY_REPLY_NOTICE.to_string();
                }
            }
        }

        self.session = Some(session);
        self.busy = false;
        Some(accumulated)
    }

    /// Marks the in-progress placeholder as an error message and sets the
    /// banner. The phase does not change; the user may keep sending.
    fn fail_exchange(&mut self, accumulated: &mut String, e: &anyhow::Error) {
        let error_message = format!("AI Error: {}", e);
        self.error = Some(error_message.clone());
        *accumulated = format!("{} {}", prompts::ERROR_REPLY_PREFIX, error_message);
        if let Some(msg) = self.messages.last_mut() {
            msg.text = accumulated.clone();
            msg.is_error = Some(true);
        }
    }

    async fn save_interview_record(&mut self, final_text: &str) {
        let (Some(user), Some(interview_type), Some(difficulty)) = (
            self.current_user.clone(),
            self.selected_type,
            self.selected_difficulty,
        ) else {
            return;
        };

        let parsed = score::parse_summary(final_text);
        let record = InterviewRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.name,
            user_age_at_interview: user.age,
            interview_type,
            difficulty_level: difficulty,
            timestamp: Utc::now(),
            messages: self.messages.clone(),
            final_summary_text: Some(parsed.summary_text),
            overall_score: parsed.score,
        };

        match self.records.append_record(&record).await {
            Ok(()) => {
                self.error = Some(if final_text.starts_with(prompts::ERROR_REPLY_PREFIX) {
                    "Interview attempt (with AI error) saved locally.".to_string()
                } else {
                    "Interview summary and score saved locally!".to_string()
                });
                self.refresh_recent_summaries().await;
            }
            Err(e) => {
                log::error!("Failed to save interview record: {:?}", e);
                self.error = Some("Failed to save interview record to local storage.".to_string());
            }
        }
    }

    async fn refresh_recent_summaries(&mut self) {
        match self.records.list_recent_summaries().await {
            Ok(summaries) => self.recent_interviews = summaries,
            Err(e) => {
                log::error!("Failed to load recent interview summaries: {:?}", e);
                self.recent_interviews = Vec::new();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatTurn, DeltaStream};
    use crate::models::Sender;
    use crate::storage::MemoryStore;
    use anyhow::Result;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const TEST_KEY_VAR: &str = "MOCK_INTERVIEWER_TEST_KEY";

    enum Reply {
        Text(&'static str),
        Fail(&'static str),
        Empty,
    }

    // Plays back a fixed script of replies; streamed replies are chunked at
    // word boundaries so the accumulation path is exercised.
    struct MockProvider {
        replies: Mutex<VecDeque<Reply>>,
    }

    impl MockProvider {
        fn scripted(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into()) })
        }

        fn next_reply(&self) -> Reply {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Fail("script exhausted"))
        }
    }

    #[async_trait::async_trait]
    impl ChatApiProvider for MockProvider {
        async fn send_chat_request(
            &self,
            _config: &ProviderConfig,
            _api_key: &str,
            _turns: &[ChatTurn],
        ) -> Result<String> {
            match self.next_reply() {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail(m) => Err(anyhow::anyhow!(m)),
                Reply::Empty => Ok(String::new()),
            }
        }

        async fn send_chat_stream_request(
            &self,
            _config: &ProviderConfig,
            _api_key: &str,
            _turns: &[ChatTurn],
        ) -> Result<DeltaStream> {
            let chunks: Vec<Result<String>> = match self.next_reply() {
                Reply::Text(t) => t.split_inclusive(' ').map(|s| Ok(s.to_string())).collect(),
                Reply::Fail(m) => return Err(anyhow::anyhow!(m)),
                Reply::Empty => Vec::new(),
            };
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn test_config(key_ref: &str) -> ProviderConfig {
        ProviderConfig {
            api_url: "http://localhost:1".to_string(),
            model: "mock-model".to_string(),
            api_key_ref: Some(key_ref.to_string()),
        }
    }

    fn controller_with(
        replies: Vec<Reply>,
        store: Arc<MemoryStore>,
    ) -> InterviewController {
        std::env::set_var(TEST_KEY_VAR, "test-key");
        InterviewController::new(
            RecordStore::new(store),
            MockProvider::scripted(replies),
            test_config(&format!("env:{}", TEST_KEY_VAR)),
        )
    }

    async fn ready_controller(
        replies: Vec<Reply>,
        store: Arc<MemoryStore>,
    ) -> InterviewController {
        let mut replies = replies;
        replies.insert(0, Reply::Text("Hello Ada! Let's begin. What is a hash map?"));
        let mut ctrl = controller_with(replies, store);
        ctrl.initialize().await;
        ctrl.login("Ada", "28").await;
        ctrl.select_type(InterviewType::Coding);
        ctrl.select_difficulty(DifficultyLevel::Easy).await;
        assert_eq!(ctrl.phase(), Phase::Ready);
        ctrl
    }

    #[tokio::test]
    async fn missing_credential_is_fatal() {
        let mut ctrl = InterviewController::new(
            RecordStore::new(Arc::new(MemoryStore::new())),
            MockProvider::scripted(vec![]),
            test_config("env:MOCK_INTERVIEWER_NO_SUCH_KEY"),
        );
        ctrl.initialize().await;
        assert_eq!(ctrl.phase(), Phase::Error);
        assert!(ctrl.api_key_missing());
        assert!(ctrl.error().is_some());
    }

    #[tokio::test]
    async fn login_validation_keeps_phase() {
        let mut ctrl = controller_with(vec![], Arc::new(MemoryStore::new()));
        ctrl.initialize().await;
        assert_eq!(ctrl.phase(), Phase::Login);

        for (name, age) in [("", "28"), ("   ", "28"), ("Ada", "4"), ("Ada", "121"), ("Ada", "abc")]
        {
            ctrl.login(name, age).await;
            assert_eq!(ctrl.phase(), Phase::Login, "({:?}, {:?})", name, age);
            assert!(ctrl.login_error().is_some());
        }
    }

    #[tokio::test]
    async fn valid_login_persists_user_and_advances() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller_with(vec![], store.clone());
        ctrl.initialize().await;
        ctrl.login("  Ada  ", " 28 ").await;

        assert_eq!(ctrl.phase(), Phase::SelectingType);
        assert!(ctrl.login_error().is_none());
        assert_eq!(ctrl.current_user().map(|u| u.name.as_str()), Some("Ada"));

        let persisted = RecordStore::new(store).load_current_user().await.unwrap();
        assert_eq!(persisted, Some(User { name: "Ada".to_string(), age: 28 }));
    }

    #[tokio::test]
    async fn persisted_user_skips_login() {
        let store = Arc::new(MemoryStore::new());
        RecordStore::new(store.clone())
            .save_current_user(&User { name: "Ada".to_string(), age: 28 })
            .await
            .unwrap();

        let mut ctrl = controller_with(vec![], store);
        ctrl.initialize().await;
        assert_eq!(ctrl.phase(), Phase::SelectingType);
    }

    #[tokio::test]
    async fn type_selection_is_reversible() {
        let mut ctrl = controller_with(vec![], Arc::new(MemoryStore::new()));
        ctrl.initialize().await;
        ctrl.login("Ada", "28").await;
        ctrl.select_type(InterviewType::SystemDesign);
        assert_eq!(ctrl.phase(), Phase::SelectingDifficulty);
        ctrl.back_to_type_selection();
        assert_eq!(ctrl.phase(), Phase::SelectingType);
        assert_eq!(ctrl.selected_difficulty(), None);
    }

    #[tokio::test]
    async fn session_start_failure_is_terminal() {
        let mut ctrl = controller_with(
            vec![Reply::Fail("connection refused")],
            Arc::new(MemoryStore::new()),
        );
        ctrl.initialize().await;
        ctrl.login("Ada", "28").await;
        ctrl.select_type(InterviewType::Coding);
        ctrl.select_difficulty(DifficultyLevel::Hard).await;

        assert_eq!(ctrl.phase(), Phase::Error);
        assert!(ctrl.error().unwrap().starts_with("Failed to start interview."));
    }

    #[tokio::test]
    async fn full_interview_flow_saves_one_record() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = ready_controller(
            vec![
                Reply::Text("**Technical Evaluation**: solid. Score for this question: 7/10. Next question..."),
                Reply::Text("A strong session overall. Overall Score: 8/10. Well done, Ada."),
            ],
            store.clone(),
        )
        .await;
        assert_eq!(ctrl.messages().len(), 1); // opening AI message

        let mut seen = String::new();
        ctrl.send_message_with("I'd use a hash map", |chunk| seen.push_str(chunk)).await;
        assert!(seen.contains("Technical Evaluation"));
        assert_eq!(ctrl.messages().len(), 3);
        assert_eq!(ctrl.messages()[1].sender, Sender::User);
        assert_eq!(ctrl.messages()[2].text, seen);

        ctrl.end_interview().await;
        assert_eq!(ctrl.phase(), Phase::Ready);
        assert!(!ctrl.is_awaiting_final_summary());
        assert_eq!(ctrl.error(), Some("Interview summary and score saved locally!"));
        // Transcript: opening AI, user, AI feedback, summary request, AI summary.
        assert_eq!(ctrl.messages().len(), 5);

        let history = RecordStore::new(store).load_history("Ada").await.unwrap();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.overall_score, Some(8));
        assert_eq!(record.user_age_at_interview, 28);
        assert_eq!(record.messages.len(), ctrl.messages().len());
        assert!(record.final_summary_text.as_deref().unwrap().contains("Overall Score: 8/10"));

        // The saved session shows up in the recent projection.
        assert_eq!(ctrl.recent_interviews().len(), 1);
        assert_eq!(ctrl.recent_interviews()[0].last_overall_score, Some(8));
    }

    #[tokio::test]
    async fn mid_conversation_failure_keeps_phase_ready() {
        let mut ctrl = ready_controller(
            vec![Reply::Fail("boom"), Reply::Text("Back on track.")],
            Arc::new(MemoryStore::new()),
        )
        .await;

        ctrl.send_message("first try").await;
        assert_eq!(ctrl.phase(), Phase::Ready);
        assert!(!ctrl.is_busy());
        let failed = ctrl.messages().last().unwrap();
        assert_eq!(failed.is_error, Some(true));
        assert!(failed.text.starts_with(prompts::ERROR_REPLY_PREFIX));
        assert!(ctrl.error().unwrap().starts_with("AI Error:"));

        // The user may continue sending after a failed exchange.
        ctrl.send_message("second try").await;
        assert_eq!(ctrl.messages().last().unwrap().text, "Back on track.");
        assert!(ctrl.error().is_none());
    }

    #[tokio::test]
    async fn empty_stream_gets_fallback_notice() {
        let mut ctrl =
            ready_controller(vec![Reply::Empty], Arc::new(MemoryStore::new())).await;
        ctrl.send_message("anything there?").await;
        assert_eq!(ctrl.messages().last().unwrap().text, prompts::EMPTY_REPLY_NOTICE);
    }

    #[tokio::test]
    async fn sends_outside_ready_are_ignored() {
        let mut ctrl = controller_with(vec![], Arc::new(MemoryStore::new()));
        ctrl.initialize().await;
        ctrl.send_message("too early").await;
        assert!(ctrl.messages().is_empty());
        ctrl.end_interview().await;
        assert!(ctrl.messages().is_empty());
    }

    #[tokio::test]
    async fn restart_clears_session_but_not_history() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = ready_controller(
            vec![Reply::Text("Summary. Overall Score: 6/10.")],
            store.clone(),
        )
        .await;
        ctrl.end_interview().await;

        let records = RecordStore::new(store);
        let before = records.load_history("Ada").await.unwrap().len();
        assert_eq!(before, 1);

        ctrl.restart();
        assert_eq!(ctrl.phase(), Phase::SelectingType);
        assert!(ctrl.messages().is_empty());
        assert_eq!(ctrl.selected_type(), None);
        assert_eq!(records.load_history("Ada").await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn failed_summary_still_saves_attempt() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = ready_controller(vec![Reply::Fail("timeout")], store.clone()).await;
        ctrl.end_interview().await;

        assert_eq!(ctrl.error(), Some("Interview attempt (with AI error) saved locally."));
        let history = RecordStore::new(store).load_history("Ada").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].overall_score, None);
    }

    #[tokio::test]
    async fn logout_clears_pointer_and_returns_to_login() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = ready_controller(
            vec![Reply::Text("Summary. Overall Score: 9/10.")],
            store.clone(),
        )
        .await;
        ctrl.end_interview().await;
        ctrl.logout().await;

        assert_eq!(ctrl.phase(), Phase::Login);
        assert!(ctrl.current_user().is_none());
        assert!(ctrl.messages().is_empty());

        let records = RecordStore::new(store);
        assert!(records.load_current_user().await.unwrap().is_none());
        // History survives logout and still feeds the summaries.
        assert_eq!(records.load_history("Ada").await.unwrap().len(), 1);
        assert_eq!(ctrl.recent_interviews().len(), 1);
    }
}
