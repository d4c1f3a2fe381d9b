//! Field constraints checked before a submission is cleaned and stored.
//!
//! | Field | Constraint |
//! |-------|------------|
//! | `country_code` | `^[A-Z]{2}$` |
//! | `country_name` | 2–100 chars |
//! | `experience_type` | one of [`ExperienceType::ALL`] |
//! | `title` | 5–200 chars |
//! | `description` | 10–5000 chars |
//! | `author_name` | optional, 2–50 chars |
//! | `author_email` | optional, `local@domain.tld` |
//!
//! Lengths count characters, not bytes.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use atlas_types::api::NewExperience;
use atlas_types::models::ExperienceType;
use regex::Regex;

pub const COUNTRY_NAME_CHARS: RangeInclusive<usize> = 2..=100;
pub const TITLE_CHARS: RangeInclusive<usize> = 5..=200;
pub const DESCRIPTION_CHARS: RangeInclusive<usize> = 10..=5000;
pub const AUTHOR_NAME_CHARS: RangeInclusive<usize> = 2..=50;

static COUNTRY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("Invalid country code regex"));

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidCountryCode,
    CountryNameLength,
    InvalidExperienceType,
    TitleLength,
    DescriptionLength,
    AuthorNameLength,
    InvalidEmail,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidCountryCode => "Invalid country code",
            Self::CountryNameLength => "Country name must be between 2 and 100 characters",
            Self::InvalidExperienceType => "Invalid experience type",
            Self::TitleLength => "Title must be between 5 and 200 characters",
            Self::DescriptionLength => "Description must be between 10 and 5000 characters",
            Self::AuthorNameLength => "Author name must be between 2 and 50 characters",
            Self::InvalidEmail => "Invalid email format",
        })
    }
}

/// Every constraint a submission violates, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    fn push_if(&mut self, failed: bool, issue: ValidationIssue) {
        if failed {
            self.issues.push(issue);
        }
    }
}

impl From<ValidationIssue> for ValidationReport {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(", "))
    }
}

/// Check a raw submission. Collects all violations instead of stopping at
/// the first; has no side effects.
pub fn validate(input: &NewExperience) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.push_if(
        !COUNTRY_CODE_REGEX.is_match(&input.country_code),
        ValidationIssue::InvalidCountryCode,
    );
    report.push_if(
        !chars_within(&input.country_name, COUNTRY_NAME_CHARS),
        ValidationIssue::CountryNameLength,
    );
    report.push_if(
        input.experience_type.parse::<ExperienceType>().is_err(),
        ValidationIssue::InvalidExperienceType,
    );
    report.push_if(!chars_within(&input.title, TITLE_CHARS), ValidationIssue::TitleLength);
    report.push_if(
        !chars_within(&input.description, DESCRIPTION_CHARS),
        ValidationIssue::DescriptionLength,
    );

    if let Some(name) = provided(&input.author_name) {
        report.push_if(
            !chars_within(name, AUTHOR_NAME_CHARS),
            ValidationIssue::AuthorNameLength,
        );
    }
    if let Some(email) = provided(&input.author_email) {
        report.push_if(!EMAIL_REGEX.is_match(email), ValidationIssue::InvalidEmail);
    }

    report
}

/// Length bounds only, applied again after escaping may have grown the text.
pub(crate) fn validate_lengths(input: &NewExperience) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.push_if(
        !chars_within(&input.country_name, COUNTRY_NAME_CHARS),
        ValidationIssue::CountryNameLength,
    );
    report.push_if(!chars_within(&input.title, TITLE_CHARS), ValidationIssue::TitleLength);
    report.push_if(
        !chars_within(&input.description, DESCRIPTION_CHARS),
        ValidationIssue::DescriptionLength,
    );
    if let Some(name) = provided(&input.author_name) {
        report.push_if(
            !chars_within(name, AUTHOR_NAME_CHARS),
            ValidationIssue::AuthorNameLength,
        );
    }

    report
}

/// Empty optional strings count as not provided.
pub(crate) fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn chars_within(text: &str, bounds: RangeInclusive<usize>) -> bool {
    bounds.contains(&text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewExperience {
        NewExperience {
            country_code: "FR".into(),
            country_name: "France".into(),
            experience_type: "Visa Free".into(),
            title: "Visa Free - France".into(),
            description: "Smooth entry, no questions asked.".into(),
            author_name: Some("Lena".into()),
            author_email: Some("lena@example.org".into()),
        }
    }

    #[test]
    fn accepts_valid_submission() {
        let report = validate(&valid());
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn reports_every_violation() {
        let input = NewExperience {
            country_code: "usa".into(),
            title: String::new(),
            description: "short".into(),
            ..valid()
        };
        let report = validate(&input);
        assert!(!report.is_valid());
        assert_eq!(
            report.issues(),
            &[
                ValidationIssue::InvalidCountryCode,
                ValidationIssue::TitleLength,
                ValidationIssue::DescriptionLength,
            ]
        );
        assert_eq!(
            report.to_string(),
            "Invalid country code, Title must be between 5 and 200 characters, \
             Description must be between 10 and 5000 characters"
        );
    }

    #[test]
    fn rejects_unknown_experience_type() {
        for bad in ["visa free", "Transit Visa", ""] {
            let input = NewExperience {
                experience_type: bad.into(),
                ..valid()
            };
            assert_eq!(validate(&input).issues(), &[ValidationIssue::InvalidExperienceType]);
        }
        let input = NewExperience {
            experience_type: "Visa on Arrival".into(),
            ..valid()
        };
        assert!(validate(&input).is_valid());
    }

    #[test]
    fn country_code_must_be_two_uppercase_letters() {
        for bad in ["fr", "F", "FRA", "F1", ""] {
            let input = NewExperience {
                country_code: bad.into(),
                ..valid()
            };
            assert_eq!(validate(&input).issues(), &[ValidationIssue::InvalidCountryCode]);
        }
    }

    #[test]
    fn optional_fields_checked_only_when_present() {
        let input = NewExperience {
            author_name: None,
            author_email: Some(String::new()),
            ..valid()
        };
        assert!(validate(&input).is_valid());

        let input = NewExperience {
            author_name: Some("L".into()),
            author_email: Some("not-an-email".into()),
            ..valid()
        };
        assert_eq!(
            validate(&input).issues(),
            &[ValidationIssue::AuthorNameLength, ValidationIssue::InvalidEmail]
        );
    }

    #[test]
    fn lengths_count_characters() {
        // 5000 two-byte characters is within bounds.
        let input = NewExperience {
            description: "é".repeat(5000),
            ..valid()
        };
        assert!(validate(&input).is_valid());

        let input = NewExperience {
            description: "é".repeat(5001),
            ..valid()
        };
        assert_eq!(validate(&input).issues(), &[ValidationIssue::DescriptionLength]);
    }
}
