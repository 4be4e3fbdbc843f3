// Headless mock interview engine: phase controller, conversation session,
// score parsing, and local record persistence. The binary in main.rs is a
// thin terminal front end over the controller.

// Declare the modules
pub mod api;
pub mod config;
pub mod controller;
pub mod models;
pub mod prompts;
pub mod score;
pub mod session;
pub mod storage;

pub use api::{ChatApiProvider, OpenAICompatibleProvider};
pub use config::ProviderConfig;
pub use controller::{InterviewController, Phase};
pub use models::{
    ChatMessage, DifficultyLevel, InterviewRecord, InterviewType, RecentInterviewSummary, Sender,
    User,
};
pub use score::{parse_summary, ParsedSummary};
pub use session::ChatSession;
pub use storage::{KeyValueStore, MemoryStore, RecordStore, SqliteStore};
