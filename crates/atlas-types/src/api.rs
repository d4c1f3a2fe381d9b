use serde::{Deserialize, Serialize};

// -- Experiences --

/// Raw submission as received at the boundary. `experience_type` stays a
/// string here so that unknown values surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewExperience {
    pub country_code: String,
    pub country_name: String,
    pub experience_type: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

/// Outcome of a mutating boundary operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            error: None,
        }
    }

    pub fn failed_with(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

// -- Feed --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub country: Option<String>,
    pub visa_type: Option<String>,
}
