use serde::Serialize;

use atlas_report::ExperienceReport;
use atlas_report::display::{DifficultyTier, difficulty_label};
use atlas_report::sanitize::escape_html;
use atlas_types::api::FeedQuery;
use atlas_types::models::Experience;

/// Filter value meaning "no filter".
const ALL: &str = "all";

/// A record together with the report fields unpacked from its description.
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: Experience,
    pub report: ExperienceReport,
    pub difficulty_label: &'static str,
    pub difficulty_tier: DifficultyTier,
    pub author: String,
}

impl From<Experience> for ExperienceView {
    fn from(experience: Experience) -> Self {
        let report = ExperienceReport::decode(&experience.description);
        Self {
            difficulty_label: difficulty_label(report.difficulty),
            difficulty_tier: DifficultyTier::from(report.difficulty),
            author: experience.author_display().to_string(),
            report,
            experience,
        }
    }
}

/// Exact match on country name and visa type; absent, empty or "all" means
/// no filter. Stored names are escaped, so the query is escaped the same way.
pub fn matches_query(exp: &Experience, query: &FeedQuery) -> bool {
    if let Some(country) = active(&query.country) {
        if exp.country_name != escape_html(country) {
            return false;
        }
    }
    if let Some(visa_type) = active(&query.visa_type) {
        if exp.experience_type.as_str() != visa_type {
            return false;
        }
    }
    true
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}
