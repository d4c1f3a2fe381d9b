//! Pure submission logic: checking, cleaning and packing community reports
//! before they reach the store, and unpacking them again for display.

pub mod advisory;
pub mod codec;
pub mod display;
pub mod form;
pub mod sanitize;
pub mod validate;

pub use codec::ExperienceReport;
pub use form::ReportForm;
pub use sanitize::{CleanExperience, prepare, sanitize};
pub use validate::{ValidationIssue, ValidationReport, validate};
