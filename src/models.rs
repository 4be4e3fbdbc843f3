use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// The person currently running interviews. Persisted as the single
// "current user" pointer; overwritten on each login.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub age: u8, // valid range 5-120, enforced at login
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

// One entry in the interview transcript. Immutable once appended, except
// for the in-place text update while a reply is still streaming.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    #[serde(default = "Uuid::new_v4")] // Generate a new UUID if missing during deserialization
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none", default)]
    pub is_error: Option<bool>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), Sender::User)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text.into(), Sender::Ai)
    }

    fn new(text: String, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender,
            timestamp: Utc::now(),
            is_error: None,
        }
    }
}

// Closed selection set; serialized by display label so stored records stay
// readable as plain JSON.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterviewType {
    #[serde(rename = "Coding Questions")]
    Coding,
    #[serde(rename = "System Design")]
    SystemDesign,
    #[serde(rename = "General Mix")]
    GeneralMix,
}

impl InterviewType {
    pub const ALL: [InterviewType; 3] = [
        InterviewType::Coding,
        InterviewType::SystemDesign,
        InterviewType::GeneralMix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InterviewType::Coding => "Coding Questions",
            InterviewType::SystemDesign => "System Design",
            InterviewType::GeneralMix => "General Mix",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyLevel {
    Easy,
    Intermediate,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Hard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Hard => "Hard",
        }
    }
}

// A completed (or aborted) interview session: full transcript plus the
// parsed overall score. Appended to the user's history, never mutated.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: String,
    pub user_id: String, // user's name
    pub user_age_at_interview: u8,
    pub interview_type: InterviewType,
    pub difficulty_level: DifficultyLevel,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub final_summary_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub overall_score: Option<u8>,
}

// Read-only projection of one user's most recent interview, shown on the
// login screen. Recomputed on demand from the full history store.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecentInterviewSummary {
    pub user_name: String,
    pub user_age_at_interview: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_overall_score: Option<u8>,
    pub last_interview_timestamp: DateTime<Utc>,
}
