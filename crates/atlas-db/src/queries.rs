use crate::Database;
use crate::models::{ExperienceRow, StatsRow};
use anyhow::{Result, anyhow};
use atlas_report::CleanExperience;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

/// Stored timestamp layout. Sorts lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Maximum rows returned by a listing.
pub const LIST_LIMIT: u32 = 100;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Also accepts SQLite's `datetime('now')` layout
/// for rows written by hand.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map(|ndt| ndt.and_utc())
        .ok()
}

impl Database {
    // -- Writes --

    /// Insert a cleaned record with `helpful_count = 0`. Returns the new id.
    pub fn insert_experience(&self, exp: &CleanExperience) -> Result<i64> {
        self.insert_experience_at(exp, Utc::now())
    }

    pub fn insert_experience_at(&self, exp: &CleanExperience, at: DateTime<Utc>) -> Result<i64> {
        let ts = format_timestamp(at);
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO experiences (
                    country_code, country_name, experience_type, title, description,
                    author_name, author_email, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    exp.country_code(),
                    exp.country_name(),
                    exp.experience_type().as_str(),
                    exp.title(),
                    exp.description(),
                    exp.author_name(),
                    exp.author_email(),
                    ts,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Add one helpful vote in a single statement, so concurrent votes on the
    /// same row never lose updates. Returns false if no row matched.
    pub fn increment_helpful(&self, id: i64) -> Result<bool> {
        self.increment_helpful_at(id, Utc::now())
    }

    pub fn increment_helpful_at(&self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let ts = format_timestamp(at);
        let changed = self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE experiences
                 SET helpful_count = helpful_count + 1,
                     updated_at = ?2
                 WHERE id = ?1",
                rusqlite::params![id, ts],
            )?;
            Ok(n)
        })?;

        if changed == 0 {
            debug!("Helpful vote for missing experience {}", id);
        }
        Ok(changed > 0)
    }

    /// Returns false if no row matched.
    pub fn delete_experience(&self, id: i64) -> Result<bool> {
        let changed = self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM experiences WHERE id = ?1", [id])?;
            Ok(n)
        })?;

        if changed == 0 {
            debug!("Delete for missing experience {}", id);
        }
        Ok(changed > 0)
    }

    // -- Reads --

    /// Newest first, at most [`LIST_LIMIT`] rows.
    pub fn list_experiences(&self) -> Result<Vec<ExperienceRow>> {
        self.with_conn(|conn| query_experiences(conn, LIST_LIMIT))
    }

    pub fn get_experience(&self, id: i64) -> Result<Option<ExperienceRow>> {
        self.with_conn(|conn| query_experience_by_id(conn, id))
    }

    pub fn experience_stats(&self) -> Result<StatsRow> {
        self.experience_stats_at(Utc::now())
    }

    /// Aggregates with "this month" taken as the calendar month containing `now`.
    pub fn experience_stats_at(&self, now: DateTime<Utc>) -> Result<StatsRow> {
        let (month_start, next_month_start) = month_bounds(now)?;
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT COUNT(*),
                        COUNT(DISTINCT country_code),
                        COALESCE(SUM(helpful_count), 0),
                        COALESCE(SUM(CASE WHEN created_at >= ?1 AND created_at < ?2 THEN 1 ELSE 0 END), 0)
                 FROM experiences",
                rusqlite::params![month_start, next_month_start],
                |row| {
                    Ok(StatsRow {
                        total: row.get(0)?,
                        countries: row.get(1)?,
                        helpful_votes: row.get(2)?,
                        this_month: row.get(3)?,
                    })
                },
            )?;
            Ok(row)
        })
    }
}

const EXPERIENCE_COLUMNS: &str = "id, country_code, country_name, experience_type, title, description,
     author_name, author_email, helpful_count, created_at, updated_at";

fn map_experience(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExperienceRow> {
    Ok(ExperienceRow {
        id: row.get(0)?,
        country_code: row.get(1)?,
        country_name: row.get(2)?,
        experience_type: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        author_name: row.get(6)?,
        author_email: row.get(7)?,
        helpful_count: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn query_experiences(conn: &Connection, limit: u32) -> Result<Vec<ExperienceRow>> {
    // id breaks ties between rows created in the same millisecond
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPERIENCE_COLUMNS}
         FROM experiences
         ORDER BY created_at DESC, id DESC
         LIMIT ?1"
    ))?;

    let rows = stmt
        .query_map([limit], map_experience)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_experience_by_id(conn: &Connection, id: i64) -> Result<Option<ExperienceRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = ?1"
    ))?;

    let row = stmt.query_row([id], map_experience).optional()?;
    Ok(row)
}

/// `[first of month, first of next month)` as stored-timestamp strings.
fn month_bounds(now: DateTime<Utc>) -> Result<(String, String)> {
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("Invalid month start for {}", now))?;
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("Invalid month end for {}", now))?;

    Ok((
        format_timestamp(start.and_utc()),
        format_timestamp(end.and_utc()),
    ))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
