use atlas_types::api::NewExperience;
use atlas_types::models::ExperienceType;

use crate::validate::{ValidationIssue, ValidationReport, provided, validate, validate_lengths};

/// Escape the markup metacharacters `<`, `>`, `"` and `'`.
///
/// `/` is left alone: packed descriptions and ordinary text such as "5/5" or
/// "N/A" need it verbatim.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Clean a submission for storage: escape every free-text field, upper-case
/// the country code and turn empty optional fields into `None`.
pub fn sanitize(input: &NewExperience) -> NewExperience {
    NewExperience {
        country_code: input.country_code.to_uppercase(),
        country_name: escape_html(&input.country_name),
        experience_type: input.experience_type.clone(),
        title: escape_html(&input.title),
        description: escape_html(&input.description),
        author_name: provided(&input.author_name).map(escape_html),
        author_email: provided(&input.author_email).map(escape_html),
    }
}

/// A submission that passed validation and was sanitized. The only way to
/// build one is [`prepare`], so holding one means it is safe to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanExperience {
    country_code: String,
    country_name: String,
    experience_type: ExperienceType,
    title: String,
    description: String,
    author_name: Option<String>,
    author_email: Option<String>,
}

impl CleanExperience {
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    pub fn experience_type(&self) -> ExperienceType {
        self.experience_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.author_email.as_deref()
    }
}

/// Validate, then sanitize.
///
/// Escaping can lengthen text, so length bounds are checked a second time on
/// the sanitized output; a record that no longer fits is rejected.
pub fn prepare(input: &NewExperience) -> Result<CleanExperience, ValidationReport> {
    let report = validate(input);
    if !report.is_valid() {
        return Err(report);
    }

    let clean = sanitize(input);
    let report = validate_lengths(&clean);
    if !report.is_valid() {
        return Err(report);
    }

    let experience_type = clean
        .experience_type
        .parse::<ExperienceType>()
        .map_err(|_| ValidationReport::from(ValidationIssue::InvalidExperienceType))?;

    Ok(CleanExperience {
        country_code: clean.country_code,
        country_name: clean.country_name,
        experience_type,
        title: clean.title,
        description: clean.description,
        author_name: clean.author_name,
        author_email: clean.author_email,
    })
}
