use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visa outcome reported for a country. The set is closed: unknown labels are
/// rejected at the boundary, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceType {
    #[serde(rename = "Visa Free")]
    VisaFree,
    #[serde(rename = "E-Visa")]
    EVisa,
    #[serde(rename = "Visa Required")]
    VisaRequired,
    #[serde(rename = "Visa on Arrival")]
    VisaOnArrival,
    #[serde(rename = "Not Recognized")]
    NotRecognized,
}

impl ExperienceType {
    pub const ALL: [ExperienceType; 5] = [
        Self::VisaFree,
        Self::EVisa,
        Self::VisaRequired,
        Self::VisaOnArrival,
        Self::NotRecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisaFree => "Visa Free",
            Self::EVisa => "E-Visa",
            Self::VisaRequired => "Visa Required",
            Self::VisaOnArrival => "Visa on Arrival",
            Self::NotRecognized => "Not Recognized",
        }
    }
}

impl fmt::Display for ExperienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown experience type: {0:?}")]
pub struct UnknownExperienceType(pub String);

impl FromStr for ExperienceType {
    type Err = UnknownExperienceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownExperienceType(s.to_string()))
    }
}

/// A persisted community report.
///
/// `country_code` is a display hint derived from the country name, not a
/// verified ISO code. `description` holds the packed report fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub country_code: String,
    pub country_name: String,
    pub experience_type: ExperienceType,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub helpful_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    /// Name shown next to the report; contributions without a name are anonymous.
    pub fn author_display(&self) -> &str {
        self.author_name.as_deref().unwrap_or("Anonymous")
    }
}

/// Aggregates over the whole record set, computed per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceStats {
    pub total: u64,
    pub countries: u64,
    pub helpful_votes: u64,
    pub this_month: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_type_parses_every_label() {
        for t in ExperienceType::ALL {
            assert_eq!(t.as_str().parse::<ExperienceType>(), Ok(t));
        }
        assert!("visa free".parse::<ExperienceType>().is_err());
        assert!("Transit".parse::<ExperienceType>().is_err());
    }

    #[test]
    fn experience_type_serializes_as_label() {
        let json = serde_json::to_string(&ExperienceType::VisaOnArrival).unwrap();
        assert_eq!(json, "\"Visa on Arrival\"");
    }

    #[test]
    fn stats_use_camel_case_keys() {
        let json = serde_json::to_value(ExperienceStats::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "total": 0, "countries": 0, "helpfulVotes": 0, "thisMonth": 0 })
        );
    }
}
