use serde::{Deserialize, Serialize};

/// Signals emitted after a successful mutation. Receivers drop whatever they
/// cached and re-read on their own schedule; nothing is pushed to open views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewEvent {
    ExperienceCreated { id: i64 },
    HelpfulIncremented { id: i64 },
    ExperienceDeleted { id: i64 },
}
