use crate::error::SyncError;
use crate::provider::ProgressSync;
use chrono::Local;
use directories::ProjectDirs;
use itertools::Itertools;
use rusqlite::{params, Connection, Result};
use std::path::PathBuf;

/// Aggregated outcomes for one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOutcomeSummary {
    pub progress_id: u64,
    pub attempts: i64,
    pub successes: i64,
}

/// Local SQLite progress store.
///
/// Stands in for the remote progress service: every reported quality
/// score becomes an outcome row, and plan chapters advance in a small
/// side table.
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    pub fn new() -> Result<Self> {
        let db_path = Self::db_path().unwrap_or_else(|| PathBuf::from("spelldrill_progress.db"));
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("failed to create state dir: {}", e)),
                )
            })?;
        }
        Self::open_at(db_path)
    }

    pub fn open_at<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.into())?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS word_outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                progress_id INTEGER NOT NULL,
                quality INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_word_outcomes_progress ON word_outcomes(progress_id)",
            [],
        )?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS plan_chapters (
                plan_id INTEGER PRIMARY KEY,
                current_chapter INTEGER NOT NULL DEFAULT 1
            )
            "#,
            [],
        )?;

        Ok(ProgressDb { conn })
    }

    /// Database file under `$HOME/.local/state/spelldrill`, falling
    /// back to the platform-specific local data dir.
    fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("spelldrill");
            Some(state_dir.join("progress.db"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "spelldrill") {
            Some(proj_dirs.data_local_dir().join("progress.db"))
        } else {
            None
        }
    }

    pub fn current_chapter(&self, plan_id: u64) -> Result<u32> {
        let chapter = self
            .conn
            .query_row(
                "SELECT current_chapter FROM plan_chapters WHERE plan_id = ?1",
                params![plan_id],
                |row| row.get::<_, u32>(0),
            )
            .unwrap_or(1);
        Ok(chapter)
    }

    /// Distinct words that have at least one recorded outcome.
    pub fn learned_word_count(&self) -> Result<u32> {
        self.conn.query_row(
            "SELECT COUNT(DISTINCT progress_id) FROM word_outcomes",
            [],
            |row| row.get(0),
        )
    }

    /// Per-word attempt/success totals, worst accuracy first.
    pub fn summary(&self) -> Result<Vec<WordOutcomeSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT progress_id,
                   COUNT(*) as attempts,
                   SUM(CASE WHEN quality >= 5 THEN 1 ELSE 0 END) as successes
            FROM word_outcomes
            GROUP BY progress_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WordOutcomeSummary {
                progress_id: row.get(0)?,
                attempts: row.get(1)?,
                successes: row.get(2)?,
            })
        })?;

        let summaries: Vec<WordOutcomeSummary> = rows
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .sorted_by(|a, b| {
                let rate_a = a.successes as f64 / a.attempts.max(1) as f64;
                let rate_b = b.successes as f64 / b.attempts.max(1) as f64;
                rate_a
                    .partial_cmp(&rate_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.progress_id.cmp(&b.progress_id))
            })
            .collect();
        Ok(summaries)
    }
}

impl ProgressSync for ProgressDb {
    fn update_progress(&mut self, progress_id: u64, quality: u8) -> std::result::Result<(), SyncError> {
        self.conn.execute(
            "INSERT INTO word_outcomes (progress_id, quality, recorded_at) VALUES (?1, ?2, ?3)",
            params![progress_id, quality, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn advance(&mut self, plan_id: u64) -> std::result::Result<(), SyncError> {
        self.conn.execute(
            r#"
            INSERT INTO plan_chapters (plan_id, current_chapter)
            VALUES (?1, 2)
            ON CONFLICT(plan_id) DO UPDATE SET current_chapter = current_chapter + 1
            "#,
            params![plan_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, ProgressDb) {
        let dir = tempdir().unwrap();
        let db = ProgressDb::open_at(dir.path().join("progress.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn outcomes_accumulate_per_word() {
        let (_dir, mut db) = open_temp();
        db.update_progress(1, 1).unwrap();
        db.update_progress(1, 5).unwrap();
        db.update_progress(2, 5).unwrap();

        let summary = db.summary().unwrap();
        assert_eq!(summary.len(), 2);
        // Word 1 has the worse success rate and sorts first.
        assert_eq!(summary[0].progress_id, 1);
        assert_eq!(summary[0].attempts, 2);
        assert_eq!(summary[0].successes, 1);
        assert_eq!(summary[1].progress_id, 2);
        assert_eq!(db.learned_word_count().unwrap(), 2);
    }

    #[test]
    fn chapter_starts_at_one_and_advances() {
        let (_dir, mut db) = open_temp();
        assert_eq!(db.current_chapter(9).unwrap(), 1);
        db.advance(9).unwrap();
        assert_eq!(db.current_chapter(9).unwrap(), 2);
        db.advance(9).unwrap();
        assert_eq!(db.current_chapter(9).unwrap(), 3);
    }

    #[test]
    fn empty_db_has_empty_summary() {
        let (_dir, db) = open_temp();
        assert!(db.summary().unwrap().is_empty());
        assert_eq!(db.learned_word_count().unwrap(), 0);
    }
}
