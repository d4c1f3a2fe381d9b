use thiserror::Error;

/// Why a write did not happen.
#[derive(Debug, Error)]
pub enum ExperienceError {
    /// One or more field constraints failed. Messages are safe to show users.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// Storage fault. Details stay in the logs.
    #[error("Persistence error: {0}")]
    Persistence(#[from] anyhow::Error),
}
