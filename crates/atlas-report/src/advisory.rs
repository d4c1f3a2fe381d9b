//! Client-side courtesy checks: submission cooldown, one vote per record,
//! and a crude spam filter.
//!
//! None of these are correctness guarantees. The state lives wherever the
//! caller keeps it (a browser, a session, a test) and is passed in explicitly.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Minimum time between two submissions from the same guard.
pub const SUBMISSION_COOLDOWN: TimeDelta = TimeDelta::minutes(5);

/// Minimum narrative length accepted by the form.
pub const MIN_NARRATIVE_CHARS: usize = 20;

pub const SPAM_KEYWORDS: &[&str] = &[
    "http://",
    "https://",
    "www.",
    "click here",
    "buy now",
    "casino",
    "viagra",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisoryRejection {
    #[error("Please wait {remaining_minutes} minute(s) before submitting another experience.")]
    Cooldown { remaining_minutes: i64 },

    #[error("Your submission contains prohibited content. Please remove any links or promotional text.")]
    Spam,

    #[error(
        "Please provide more detailed information about your experience (at least {min} characters)."
    )]
    NarrativeTooShort { min: usize },

    #[error("Difficulty must be between 1 and 5.")]
    DifficultyOutOfRange,

    #[error("You have already voted on this experience")]
    AlreadyVoted { id: i64 },
}

/// Remembers when the last successful submission happened.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    last_submission_at: Option<DateTime<Utc>>,
    cooldown: TimeDelta,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::with_cooldown(SUBMISSION_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: TimeDelta) -> Self {
        Self {
            last_submission_at: None,
            cooldown,
        }
    }

    pub fn last_submission_at(&self) -> Option<DateTime<Utc>> {
        self.last_submission_at
    }

    pub fn check(&self, now: DateTime<Utc>) -> Result<(), AdvisoryRejection> {
        let Some(last) = self.last_submission_at else {
            return Ok(());
        };

        let elapsed = now - last;
        if elapsed >= self.cooldown {
            return Ok(());
        }

        let remaining_ms = (self.cooldown - elapsed).num_milliseconds();
        Err(AdvisoryRejection::Cooldown {
            remaining_minutes: (remaining_ms + 59_999) / 60_000,
        })
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_submission_at = Some(now);
    }
}

/// Ids this actor has already marked helpful.
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    voted: HashSet<i64>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, id: i64) -> bool {
        self.voted.contains(&id)
    }

    pub fn check(&self, id: i64) -> Result<(), AdvisoryRejection> {
        if self.has_voted(id) {
            return Err(AdvisoryRejection::AlreadyVoted { id });
        }
        Ok(())
    }

    pub fn record(&mut self, id: i64) {
        self.voted.insert(id);
    }
}

/// Reject links and promotional phrases anywhere in the narrative or tips.
pub fn check_spam(entry_experience: &str, tips: &str) -> Result<(), AdvisoryRejection> {
    let combined = format!("{entry_experience} {tips}").to_lowercase();
    if SPAM_KEYWORDS.iter().any(|kw| combined.contains(kw)) {
        return Err(AdvisoryRejection::Spam);
    }
    Ok(())
}
