//! Boundary operations over the experience store.
//!
//! Writes run validate → sanitize → persist → invalidate and fail loudly.
//! Reads degrade: a storage fault is logged and an empty list or zeroed
//! stats come back instead, so there is always something to render.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use atlas_db::Database;
use atlas_db::models::{ExperienceRow, StatsRow};
use atlas_db::queries::parse_timestamp;
use atlas_report::advisory::{SubmissionGuard, VoteLedger};
use atlas_report::{ReportForm, prepare};
use atlas_types::api::{ActionResult, FeedQuery, NewExperience};
use atlas_types::events::ViewEvent;
use atlas_types::models::{Experience, ExperienceStats};

use crate::error::ExperienceError;
use crate::feed::{ExperienceView, matches_query};
use crate::invalidation::Views;

/// Shown to users when a write fails for a storage reason.
pub const CREATE_FAILED: &str = "Failed to create experience";

pub struct ExperienceService {
    db: Database,
    views: Views,
}

impl ExperienceService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            views: Views::new(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    // -- Writes --

    /// Returns the new record's id.
    pub fn try_create(&self, data: &NewExperience) -> Result<i64, ExperienceError> {
        let clean = prepare(data).map_err(|report| {
            debug!("Rejected submission: {}", report);
            ExperienceError::Validation(report.messages())
        })?;

        let id = self.db.insert_experience(&clean)?;
        info!(
            "Experience {} created ({}, {})",
            id,
            clean.country_code(),
            clean.experience_type()
        );

        self.views.invalidate(ViewEvent::ExperienceCreated { id });
        Ok(id)
    }

    pub fn create_experience(&self, data: &NewExperience) -> ActionResult {
        Self::create_outcome(self.try_create(data))
    }

    /// Boundary form of a create result: validation messages pass through,
    /// storage faults become a generic message.
    pub fn create_outcome(result: Result<i64, ExperienceError>) -> ActionResult {
        match result {
            Ok(_) => ActionResult::ok(),
            Err(ExperienceError::Validation(messages)) => {
                ActionResult::failed_with(messages.join(", "))
            }
            Err(ExperienceError::Persistence(e)) => {
                error!("Error creating experience: {:#}", e);
                ActionResult::failed_with(CREATE_FAILED)
            }
        }
    }

    /// Unknown ids succeed without effect.
    pub fn increment_helpful(&self, id: i64) -> ActionResult {
        match self.db.increment_helpful(id) {
            Ok(_) => {
                self.views.invalidate(ViewEvent::HelpfulIncremented { id });
                ActionResult::ok()
            }
            Err(e) => {
                error!("Error incrementing helpful count for {}: {:#}", id, e);
                ActionResult::failed()
            }
        }
    }

    /// Unknown ids succeed without effect.
    pub fn delete_experience(&self, id: i64) -> ActionResult {
        match self.db.delete_experience(id) {
            Ok(deleted) => {
                if deleted {
                    info!("Experience {} deleted", id);
                }
                self.views.invalidate(ViewEvent::ExperienceDeleted { id });
                ActionResult::ok()
            }
            Err(e) => {
                error!("Error deleting experience {}: {:#}", id, e);
                ActionResult::failed()
            }
        }
    }

    // -- Form workflow --

    /// Submit a filled-in form. The cooldown and content checks run first
    /// against the caller's guard, which is only advanced on success.
    pub fn submit_report(
        &self,
        form: ReportForm,
        guard: &mut SubmissionGuard,
        now: DateTime<Utc>,
    ) -> ActionResult {
        if let Err(rejection) = guard.check(now).and_then(|_| form.check()) {
            warn!("Submission rejected: {}", rejection);
            return ActionResult::failed_with(rejection.to_string());
        }

        let conflicts = form.report().conflicts();
        if !conflicts.is_empty() {
            let fields: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
            warn!(
                "Report fields contain section labels and will not decode cleanly: {}",
                fields.join(", ")
            );
        }

        let result = self.create_experience(&form.into_submission());
        if result.success {
            guard.record(now);
        }
        result
    }

    /// Vote once per ledger. The ledger is only updated on success.
    pub fn vote_helpful(&self, id: i64, ledger: &mut VoteLedger) -> ActionResult {
        if let Err(rejection) = ledger.check(id) {
            return ActionResult::failed_with(rejection.to_string());
        }

        let result = self.increment_helpful(id);
        if result.success {
            ledger.record(id);
        }
        result
    }

    // -- Reads --

    /// Newest first, at most 100. Empty on storage failure.
    pub fn get_experiences(&self) -> Vec<Experience> {
        match self.db.list_experiences() {
            Ok(rows) => rows.into_iter().filter_map(experience_from_row).collect(),
            Err(e) => {
                error!("Error fetching experiences: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Computed from the store on every call. Zeroed on storage failure.
    pub fn get_experience_stats(&self) -> ExperienceStats {
        self.get_experience_stats_at(Utc::now())
    }

    /// `this_month` counts records in the calendar month containing `now`.
    pub fn get_experience_stats_at(&self, now: DateTime<Utc>) -> ExperienceStats {
        match self.db.experience_stats_at(now) {
            Ok(row) => stats_from_row(row),
            Err(e) => {
                error!("Error fetching stats: {:#}", e);
                ExperienceStats::default()
            }
        }
    }

    /// Listing with decoded reports, filtered by country and visa type.
    pub fn feed(&self, query: &FeedQuery) -> Vec<ExperienceView> {
        self.get_experiences()
            .into_iter()
            .filter(|exp| matches_query(exp, query))
            .map(ExperienceView::from)
            .collect()
    }
}

fn experience_from_row(row: ExperienceRow) -> Option<Experience> {
    let experience_type = match row.experience_type.parse() {
        Ok(t) => t,
        Err(e) => {
            warn!("Skipping experience {}: {}", row.id, e);
            return None;
        }
    };

    // The schema keeps the count non-negative.
    let helpful_count = u64::try_from(row.helpful_count).unwrap_or_else(|_| {
        warn!("Corrupt helpful_count {} on experience {}", row.helpful_count, row.id);
        0
    });

    let created_at = timestamp_or_default(&row.created_at, "created_at", row.id);
    let updated_at = timestamp_or_default(&row.updated_at, "updated_at", row.id);

    Some(Experience {
        id: row.id,
        country_code: row.country_code,
        country_name: row.country_name,
        experience_type,
        title: row.title,
        description: row.description,
        author_name: row.author_name,
        author_email: row.author_email,
        helpful_count,
        created_at,
        updated_at,
    })
}

fn timestamp_or_default(raw: &str, column: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt {} '{}' on experience {}", column, raw, id);
        DateTime::default()
    })
}

fn stats_from_row(row: StatsRow) -> ExperienceStats {
    let count = |n: i64| u64::try_from(n).unwrap_or(0);
    ExperienceStats {
        total: count(row.total),
        countries: count(row.countries),
        helpful_votes: count(row.helpful_votes),
        this_month: count(row.this_month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(helpful_count: i64) -> ExperienceRow {
        ExperienceRow {
            id: 7,
            country_code: "JP".into(),
            country_name: "Japan".into(),
            experience_type: "Visa Free".into(),
            title: "Visa Free - Japan".into(),
            description: "Quick stamp at Narita.".into(),
            author_name: None,
            author_email: None,
            helpful_count,
            created_at: "2024-05-01 08:30:00.000".into(),
            updated_at: "2024-05-02 09:00:00.000".into(),
        }
    }

    #[test]
    fn large_helpful_counts_are_kept() {
        let count = i64::from(u32::MAX) + 5;
        let exp = experience_from_row(row(count)).unwrap();
        assert_eq!(exp.helpful_count, 4_294_967_300);
    }

    #[test]
    fn unknown_type_row_is_skipped() {
        let mut bad = row(0);
        bad.experience_type = "Transit Only".into();
        assert!(experience_from_row(bad).is_none());
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let mut bad = row(0);
        bad.updated_at = "yesterday".into();
        let exp = experience_from_row(bad).unwrap();
        assert_eq!(exp.updated_at, DateTime::<Utc>::default());
        assert_eq!(exp.created_at.to_rfc3339(), "2024-05-01T08:30:00+00:00");
    }
}
