use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (experiences)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE experiences (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                country_code    TEXT NOT NULL,
                country_name    TEXT NOT NULL,
                experience_type TEXT NOT NULL CHECK (experience_type IN (
                    'Visa Free', 'E-Visa', 'Visa Required', 'Visa on Arrival', 'Not Recognized'
                )),
                title           TEXT NOT NULL,
                description     TEXT NOT NULL CHECK (length(description) BETWEEN 10 AND 5000),
                author_name     TEXT,
                author_email    TEXT,
                helpful_count   INTEGER NOT NULL DEFAULT 0 CHECK (helpful_count >= 0),
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_experiences_country
                ON experiences(country_code);

            CREATE INDEX idx_experiences_created
                ON experiences(created_at DESC);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
