use atlas_types::api::NewExperience;
use serde::{Deserialize, Serialize};

use crate::advisory::{AdvisoryRejection, MIN_NARRATIVE_CHARS, check_spam};
use crate::codec::ExperienceReport;

/// Country code used when no country was picked.
pub const UNKNOWN_COUNTRY_CODE: &str = "XX";

/// What the submission form collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub country: String,
    pub travel_date: String,
    pub visa_type: String,
    #[serde(default)]
    pub processing_time: String,
    pub difficulty: u8,
    #[serde(default)]
    pub has_green_card: bool,
    pub entry_experience: String,
    #[serde(default)]
    pub tips: String,
    #[serde(default)]
    pub author_name: String,
}

impl ReportForm {
    /// Form-level checks run before anything is sent.
    pub fn check(&self) -> Result<(), AdvisoryRejection> {
        check_spam(&self.entry_experience, &self.tips)?;

        if self.entry_experience.chars().count() < MIN_NARRATIVE_CHARS {
            return Err(AdvisoryRejection::NarrativeTooShort {
                min: MIN_NARRATIVE_CHARS,
            });
        }

        if !(1..=5).contains(&self.difficulty) {
            return Err(AdvisoryRejection::DifficultyOutOfRange);
        }

        Ok(())
    }

    pub fn report(&self) -> ExperienceReport {
        ExperienceReport {
            travel_date: self.travel_date.clone(),
            visa_type: self.visa_type.clone(),
            processing_time: self.processing_time.clone(),
            difficulty: Some(self.difficulty),
            has_green_card: self.has_green_card,
            entry_experience: self.entry_experience.clone(),
            tips: self.tips.clone(),
        }
    }

    /// Build the boundary submission: derived code and title, packed
    /// description, and "Anonymous" for a missing name.
    pub fn into_submission(self) -> NewExperience {
        let description = self.report().encode();
        let author_name = match self.author_name.trim() {
            "" => "Anonymous".to_string(),
            name => name.to_string(),
        };

        NewExperience {
            country_code: derive_country_code(&self.country),
            title: format!("{} - {}", self.visa_type, self.country),
            experience_type: self.visa_type,
            country_name: self.country,
            description,
            author_name: Some(author_name),
            author_email: None,
        }
    }
}

/// First two characters of the country name, upper-cased.
///
/// This is a display hint, not an ISO lookup: "Austria" and "Australia" both
/// map to "AU".
pub fn derive_country_code(country_name: &str) -> String {
    let code: String = country_name.trim().chars().take(2).collect();
    if code.is_empty() {
        return UNKNOWN_COUNTRY_CODE.to_string();
    }
    code.to_uppercase()
}
