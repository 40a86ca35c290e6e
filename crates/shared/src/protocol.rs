use serde::{Deserialize, Serialize};

use crate::domain::lenient_text;

pub const ACTIVITIES_PATH: &str = "activities";
pub const SIGNUP_SEGMENT: &str = "signup";
pub const PARTICIPANTS_SEGMENT: &str = "participants";
pub const EMAIL_QUERY_KEY: &str = "email";

/// Requests the board issues against the activities API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientRequest {
    LoadActivities,
    Signup { activity: String, email: String },
    RemoveParticipant { activity: String, email: String },
}

impl ClientRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadActivities => "load_activities",
            Self::Signup { .. } => "signup",
            Self::RemoveParticipant { .. } => "remove_participant",
        }
    }
}

/// Success body of a signup or removal: `{"message": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}
