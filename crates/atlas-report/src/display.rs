use serde::Serialize;

/// Human label for a difficulty rating. Reports without a rating read as
/// "Moderate", the midpoint of the scale.
pub fn difficulty_label(difficulty: Option<u8>) -> &'static str {
    match difficulty {
        None | Some(3) => "Moderate",
        Some(1) => "Very Easy",
        Some(2) => "Easy",
        Some(4) => "Difficult",
        Some(_) => "Very Difficult",
    }
}

/// Coarse bucket used to colour a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Moderate,
    Hard,
}

impl From<Option<u8>> for DifficultyTier {
    fn from(difficulty: Option<u8>) -> Self {
        match difficulty {
            None | Some(3) => Self::Moderate,
            Some(d) if d <= 2 => Self::Easy,
            Some(_) => Self::Hard,
        }
    }
}
