use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub String);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Create,
    Save,
    FirstPublish,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Save => "SAVE",
            Self::FirstPublish => "FIRST_PUBLISH",
        }
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATE" => Ok(Self::Create),
            "SAVE" => Ok(Self::Save),
            "FIRST_PUBLISH" => Ok(Self::FirstPublish),
            other => Err(format!("unknown action type `{other}`")),
        }
    }
}

/// One row of the append-only editorial activity log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorialEvent {
    pub note_id: NoteId,
    pub editor_email: Option<String>,
    pub action_type: ActionType,
    pub event_timestamp: DateTime<Utc>,
    pub story_url: Option<String>,
    pub segment: Option<String>,
    pub source: Option<String>,
    pub title_word_count: Option<i64>,
    pub body_word_count: Option<i64>,
}

impl EditorialEvent {
    /// Editor identity usable for attribution. Empty and missing emails are
    /// treated the same way: no attribution.
    pub fn editor(&self) -> Option<&str> {
        self.editor_email.as_deref().map(str::trim).filter(|email| !email.is_empty())
    }

    pub fn day(&self) -> NaiveDate {
        self.event_timestamp.date_naive()
    }

    /// Non-empty section label, if the event carries one.
    pub fn section(&self) -> Option<&str> {
        self.segment.as_deref().map(str::trim).filter(|segment| !segment.is_empty())
    }

    pub fn url(&self) -> Option<&str> {
        self.story_url.as_deref().filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::ActionType;

    #[test]
    fn action_type_round_trips_through_log_encoding() {
        for action in [ActionType::Create, ActionType::Save, ActionType::FirstPublish] {
            assert_eq!(action.as_str().parse::<ActionType>(), Ok(action));
        }
        assert!("PUBLISH".parse::<ActionType>().is_err());
    }
}
