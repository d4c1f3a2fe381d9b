/// Row as stored in `experiences`. Timestamps are UTC text in
/// [`crate::queries::TIMESTAMP_FORMAT`]; conversion to API models happens in
/// the service layer.
#[derive(Debug, Clone)]
pub struct ExperienceRow {
    pub id: i64,
    pub country_code: String,
    pub country_name: String,
    pub experience_type: String,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub helpful_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Raw aggregates for the stats view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsRow {
    pub total: i64,
    pub countries: i64,
    pub helpful_votes: i64,
    pub this_month: i64,
}
