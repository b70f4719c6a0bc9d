//! Relevance feedback on recommendation cards.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const FEEDBACK_PATH: &str = "/feedback";
pub const FEEDBACK_HISTORY_PATH: &str = "/api/feedback";
pub const EMPTY_HISTORY: &str = "No feedback captured yet.";
pub const HISTORY_UNAVAILABLE: &str = "Unable to load feedback history.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackVerdict {
    #[serde(rename = "Relevant")]
    Relevant,
    #[serde(rename = "Not relevant")]
    NotRelevant,
}

impl FeedbackVerdict {
    pub fn label(self) -> &'static str {
        match self {
            FeedbackVerdict::Relevant => "Relevant",
            FeedbackVerdict::NotRelevant => "Not relevant",
        }
    }

    /// Value of the button's `data-feedback` attribute.
    pub fn action(self) -> &'static str {
        match self {
            FeedbackVerdict::Relevant => "like",
            FeedbackVerdict::NotRelevant => "dislike",
        }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRequest {
    pub role: String,
    pub feedback: FeedbackVerdict,
}

/// Strings as sent, other scalars in their JSON form, `null` as empty.
fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub role: String,
    /// Kept as sent by the backend; anything but "Relevant" renders neutral.
    #[serde(default, deserialize_with = "de_text")]
    pub feedback: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FeedbackEntry {
    pub fn is_relevant(&self) -> bool {
        self.feedback == FeedbackVerdict::Relevant.label()
    }

    /// Calendar date of `created_at`. Accepts RFC 3339, naive ISO timestamps
    /// and plain dates; anything else is shown as sent.
    pub fn display_date(&self) -> String {
        let Some(raw) = self.created_at.as_deref().map(str::trim) else {
            return String::new();
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return ts.date_naive().to_string();
        }
        if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
            return ts.date_naive().to_string();
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
                return ts.date().to_string();
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.to_string();
        }
        raw.to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackHistoryResponse {
    #[serde(default)]
    pub history: Vec<FeedbackEntry>,
}

pub const FEEDBACK_SAVED: &str = "Feedback saved.";
pub const FEEDBACK_NOT_SAVED: &str = "Could not save feedback.";

/// Response of `POST /feedback`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackAck {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl FeedbackAck {
    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// The alert text to show: `Ok` when the feedback was stored, `Err`
    /// when the body reports an error or `success: false`.
    pub fn verdict(&self) -> Result<&str, &str> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.trim().is_empty()) {
            return Err(error);
        }
        if self.success == Some(false) {
            return Err(self.message().unwrap_or(FEEDBACK_NOT_SAVED));
        }
        Ok(self.message().unwrap_or(FEEDBACK_SAVED))
    }
}

/// Single-use feedback buttons. Each rendered button id maps to the request
/// it submits; the first click consumes the binding.
#[derive(Debug, Default)]
pub struct FeedbackBindings {
    bindings: Mutex<HashMap<String, FeedbackRequest>>,
}

impl FeedbackBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every binding with the buttons of a fresh render.
    pub fn rebind(&self, buttons: Vec<(String, FeedbackRequest)>) {
        if let Ok(mut bindings) = self.bindings.lock() {
            *bindings = buttons.into_iter().collect();
        }
    }

    pub fn take(&self, button_id: &str) -> Option<FeedbackRequest> {
        self.bindings.lock().ok()?.remove(button_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
