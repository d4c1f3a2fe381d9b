//! Packs a structured report into the single `description` column and reads
//! it back out.
//!
//! Layout (labels are literal and case-sensitive):
//!
//! ```text
//! Travel Date: <travel_date>
//! Visa Type: <visa_type>
//! Processing Time: <processing_time | N/A>
//! Difficulty: <1-5>/5
//! Has Green Card: <Yes | No>
//!
//! Entry/Exit Experience:
//! <entry_experience>
//!
//! Tips & Advice:
//! <tips>
//! ```
//!
//! The tips section is left out when there are no tips. Field text is not
//! escaped: a narrative containing a section label decodes incorrectly, see
//! [`ExperienceReport::conflicts`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const TRAVEL_DATE_LABEL: &str = "Travel Date";
pub const VISA_TYPE_LABEL: &str = "Visa Type";
pub const PROCESSING_TIME_LABEL: &str = "Processing Time";

const ENTRY_HEADER: &str = "Entry/Exit Experience:";
const TIPS_HEADER: &str = "Tips & Advice:";
const GREEN_CARD_YES: &str = "Has Green Card: Yes";

/// Written when no processing time was given.
pub const NOT_APPLICABLE: &str = "N/A";

/// Difficulty the submission form starts at.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// Sequences that break decoding when they appear inside field text.
const RESERVED: &[&str] = &[
    "Travel Date: ",
    "Visa Type: ",
    "Processing Time: ",
    "Difficulty: ",
    "Has Green Card: ",
    ENTRY_HEADER,
    TIPS_HEADER,
    "\n\n",
];

static DIFFICULTY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Difficulty: (\d)/5").expect("Invalid difficulty regex"));

static ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Entry/Exit Experience:\n(.*?)(?:\n\nTips & Advice:|\z)")
        .expect("Invalid entry experience regex")
});

static TIPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Tips & Advice:\n(.*)\z").expect("Invalid tips regex"));

/// The structured fields collected by the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceReport {
    /// `YYYY-MM` as picked on the form.
    pub travel_date: String,
    pub visa_type: String,
    pub processing_time: String,
    /// `None` when a stored blob carries no difficulty line.
    pub difficulty: Option<u8>,
    pub has_green_card: bool,
    pub entry_experience: String,
    pub tips: String,
}

impl ExperienceReport {
    /// Render the packed blob.
    ///
    /// Narrative and tips are trimmed, an empty processing time becomes
    /// `N/A`, and difficulty is clamped to 1..=5 so the line always parses.
    pub fn encode(&self) -> String {
        let processing_time = match self.processing_time.trim() {
            "" => NOT_APPLICABLE,
            time => time,
        };
        let difficulty = self.difficulty.unwrap_or(DEFAULT_DIFFICULTY).clamp(1, 5);
        let green_card = if self.has_green_card { "Yes" } else { "No" };

        let mut out = format!(
            "{TRAVEL_DATE_LABEL}: {}\n\
             {VISA_TYPE_LABEL}: {}\n\
             {PROCESSING_TIME_LABEL}: {}\n\
             Difficulty: {}/5\n\
             Has Green Card: {}\n\
             \n\
             {ENTRY_HEADER}\n\
             {}",
            self.travel_date,
            self.visa_type,
            processing_time,
            difficulty,
            green_card,
            self.entry_experience.trim(),
        );

        let tips = self.tips.trim();
        if !tips.is_empty() {
            out.push_str("\n\n");
            out.push_str(TIPS_HEADER);
            out.push('\n');
            out.push_str(tips);
        }

        out
    }

    /// Recover every field from a blob. Each field is searched independently,
    /// so a partially matching blob still yields whatever it contains.
    pub fn decode(blob: &str) -> Self {
        Self {
            travel_date: extract_labeled_line(blob, TRAVEL_DATE_LABEL).to_string(),
            visa_type: extract_labeled_line(blob, VISA_TYPE_LABEL).to_string(),
            processing_time: extract_labeled_line(blob, PROCESSING_TIME_LABEL).to_string(),
            difficulty: extract_difficulty(blob),
            has_green_card: has_green_card(blob),
            entry_experience: extract_entry_experience(blob).to_string(),
            tips: extract_tips(blob).to_string(),
        }
    }

    /// Fields whose text would not survive an encode/decode cycle.
    pub fn conflicts(&self) -> Vec<ReportField> {
        let single_line = [
            (ReportField::TravelDate, &self.travel_date),
            (ReportField::VisaType, &self.visa_type),
            (ReportField::ProcessingTime, &self.processing_time),
        ];
        let multi_line = [
            (ReportField::EntryExperience, &self.entry_experience),
            (ReportField::Tips, &self.tips),
        ];

        let mut conflicts = Vec::new();
        for (field, text) in single_line {
            if text.contains('\n') || contains_reserved(text) {
                conflicts.push(field);
            }
        }
        for (field, text) in multi_line {
            if contains_reserved(text) {
                conflicts.push(field);
            }
        }
        conflicts
    }
}

fn contains_reserved(text: &str) -> bool {
    RESERVED.iter().any(|seq| text.contains(seq))
}

/// Free-text report field, named for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    TravelDate,
    VisaType,
    ProcessingTime,
    EntryExperience,
    Tips,
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TravelDate => "travel date",
            Self::VisaType => "visa type",
            Self::ProcessingTime => "processing time",
            Self::EntryExperience => "entry/exit experience",
            Self::Tips => "tips",
        })
    }
}

/// Remainder of the first line starting with `"<label>: "`, or `""`.
pub fn extract_labeled_line<'a>(blob: &'a str, label: &str) -> &'a str {
    blob.lines()
        .find_map(|line| line.strip_prefix(label)?.strip_prefix(": "))
        .unwrap_or("")
}

pub fn extract_difficulty(blob: &str) -> Option<u8> {
    DIFFICULTY_REGEX
        .captures(blob)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn has_green_card(blob: &str) -> bool {
    blob.contains(GREEN_CARD_YES)
}

/// Narrative between the entry header and the tips section (or the end).
pub fn extract_entry_experience(blob: &str) -> &str {
    ENTRY_REGEX
        .captures(blob)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str().trim())
}

pub fn extract_tips(blob: &str) -> &str {
    TIPS_REGEX
        .captures(blob)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ExperienceReport {
        ExperienceReport {
            travel_date: "2024-03".into(),
            visa_type: "E-Visa".into(),
            processing_time: "3 days".into(),
            difficulty: Some(4),
            has_green_card: true,
            entry_experience: "Officer asked for my return ticket.\nTook ten minutes.".into(),
            tips: "Print the e-visa approval.".into(),
        }
    }

    #[test]
    fn encode_matches_layout() {
        let blob = report().encode();
        assert_eq!(
            blob,
            "Travel Date: 2024-03\n\
             Visa Type: E-Visa\n\
             Processing Time: 3 days\n\
             Difficulty: 4/5\n\
             Has Green Card: Yes\n\
             \n\
             Entry/Exit Experience:\n\
             Officer asked for my return ticket.\nTook ten minutes.\n\
             \n\
             Tips & Advice:\n\
             Print the e-visa approval."
        );
    }

    #[test]
    fn decode_recovers_encoded_fields() {
        let original = report();
        assert_eq!(ExperienceReport::decode(&original.encode()), original);
    }

    #[test]
    fn slashes_survive_roundtrip() {
        let mut r = report();
        r.entry_experience = "Rated it 5/5, fees N/A at the border.".into();
        r.tips = "Use the e/visa portal, not the agency site.".into();
        assert_eq!(ExperienceReport::decode(&r.encode()), r);
    }

    #[test]
    fn empty_tips_omit_section() {
        let mut r = report();
        r.tips = String::new();
        let blob = r.encode();
        assert!(!blob.contains("Tips & Advice:"));
        assert!(blob.ends_with("Took ten minutes."));

        let decoded = ExperienceReport::decode(&blob);
        assert_eq!(decoded.tips, "");
        assert_eq!(decoded, r);
        assert_eq!(ExperienceReport::decode(&decoded.encode()), decoded);
    }

    #[test]
    fn empty_processing_time_becomes_not_applicable() {
        let mut r = report();
        r.processing_time = "  ".into();
        let decoded = ExperienceReport::decode(&r.encode());
        assert_eq!(decoded.processing_time, NOT_APPLICABLE);
    }

    #[test]
    fn green_card_no() {
        let mut r = report();
        r.has_green_card = false;
        let blob = r.encode();
        assert!(blob.contains("Has Green Card: No\n"));
        assert!(!has_green_card(&blob));
    }

    #[test]
    fn missing_difficulty_is_unknown() {
        let blob = "Travel Date: 2023-11\nVisa Type: Visa Free\n\nEntry/Exit Experience:\nFine.";
        assert_eq!(extract_difficulty(blob), None);
        assert_eq!(extract_difficulty("Difficulty: x/5"), None);
        assert_eq!(extract_difficulty("Difficulty: 2/5"), Some(2));
    }

    #[test]
    fn out_of_range_difficulty_is_clamped() {
        let mut r = report();
        r.difficulty = Some(9);
        assert_eq!(extract_difficulty(&r.encode()), Some(5));
        r.difficulty = None;
        assert_eq!(extract_difficulty(&r.encode()), Some(DEFAULT_DIFFICULTY));
    }

    #[test]
    fn labeled_line_is_anchored_to_line_start() {
        let blob = "Note: Visa Type: fake\nVisa Type: Visa on Arrival\n";
        assert_eq!(extract_labeled_line(blob, VISA_TYPE_LABEL), "Visa on Arrival");
        assert_eq!(extract_labeled_line(blob, TRAVEL_DATE_LABEL), "");
    }

    #[test]
    fn decodes_blob_with_trailing_blank_lines() {
        // Older submissions ended with an empty separator when tips were blank.
        let blob = "Travel Date: 2022-07\n\
                    Visa Type: Visa Required\n\
                    Processing Time: 2 weeks\n\
                    Difficulty: 5/5\n\
                    Has Green Card: No\n\
                    \n\
                    Entry/Exit Experience:\n\
                    Consulate kept my passport for a week.\n\
                    \n";
        let decoded = ExperienceReport::decode(blob);
        assert_eq!(decoded.entry_experience, "Consulate kept my passport for a week.");
        assert_eq!(decoded.tips, "");
        assert_eq!(decoded.difficulty, Some(5));
        assert_eq!(decoded.processing_time, "2 weeks");
    }

    #[test]
    fn unstructured_text_decodes_to_empty_fields() {
        let decoded = ExperienceReport::decode("Just a plain note about my trip.");
        assert_eq!(decoded, ExperienceReport::default());
    }

    #[test]
    fn embedded_tips_header_truncates_narrative() {
        let mut r = report();
        r.entry_experience = "Line one.\n\nTips & Advice:\nnot really tips".into();
        r.tips = String::new();

        assert_eq!(r.conflicts(), vec![ReportField::EntryExperience]);
        let decoded = ExperienceReport::decode(&r.encode());
        assert_eq!(decoded.entry_experience, "Line one.");
        assert_eq!(decoded.tips, "not really tips");
    }

    #[test]
    fn conflicts_flag_newlines_in_single_line_fields() {
        let mut r = report();
        assert!(r.conflicts().is_empty());
        r.processing_time = "3 days\nVisa Type: other".into();
        assert_eq!(r.conflicts(), vec![ReportField::ProcessingTime]);
    }

    mod roundtrip {
        use proptest::prelude::*;

        use super::*;

        const VISA_TYPES: &[&str] = &["Visa Free", "E-Visa", "Visa Required", "Visa on Arrival"];

        /// One line of text with no colon, so it can never form a label.
        const LINE: &str = "[A-Za-z0-9][A-Za-z0-9 ,.()/'-]{0,24}";
        const NARRATIVE_LINE: &str = "[A-Za-z0-9][A-Za-z0-9 ,.!?/'-]{0,40}[A-Za-z0-9.!]";

        /// Trimmed multi-line text without blank lines or labels.
        fn arb_narrative() -> impl Strategy<Value = String> {
            prop::collection::vec(NARRATIVE_LINE, 1..4).prop_map(|lines| lines.join("\n"))
        }

        prop_compose! {
            fn arb_report()(
                travel_date in "[0-9]{4}-[0-9]{2}",
                visa_type in prop::sample::select(VISA_TYPES),
                processing_time in LINE,
                difficulty in prop::option::of(1u8..=5),
                has_green_card in any::<bool>(),
                entry_experience in arb_narrative(),
                tips in prop::option::of(arb_narrative()),
            ) -> ExperienceReport {
                ExperienceReport {
                    travel_date,
                    visa_type: visa_type.to_string(),
                    processing_time,
                    difficulty,
                    has_green_card,
                    entry_experience,
                    tips: tips.unwrap_or_default(),
                }
            }
        }

        /// What a decode is expected to give back for `r`.
        fn normalized(r: &ExperienceReport) -> ExperienceReport {
            let processing_time = match r.processing_time.trim() {
                "" => NOT_APPLICABLE.to_string(),
                time => time.to_string(),
            };
            ExperienceReport {
                processing_time,
                difficulty: Some(r.difficulty.unwrap_or(DEFAULT_DIFFICULTY)),
                entry_experience: r.entry_experience.trim().to_string(),
                tips: r.tips.trim().to_string(),
                ..r.clone()
            }
        }

        proptest! {
            #[test]
            fn decode_inverts_encode(r in arb_report()) {
                prop_assert!(r.conflicts().is_empty());
                prop_assert_eq!(ExperienceReport::decode(&r.encode()), normalized(&r));
            }

            #[test]
            fn blank_tips_collapse_to_empty(r in arb_report(), blank in "[ \t\n]{0,3}") {
                let r = ExperienceReport { tips: blank, ..r };
                let blob = r.encode();
                prop_assert!(!blob.contains(TIPS_HEADER));

                let decoded = ExperienceReport::decode(&blob);
                prop_assert_eq!(decoded.tips.as_str(), "");
                prop_assert_eq!(decoded.encode(), blob);
                prop_assert_eq!(ExperienceReport::decode(&decoded.encode()), decoded);
            }
        }
    }
}
