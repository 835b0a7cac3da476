// SQLite mirror of the complaint collection
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::{
    is_valid_tracking_id, parse_date, Complaint, ComplaintStatus, IssueCategory,
};
use super::storage::ensure_parent_dir;

/// Column width of DETAILS; longer text is cut when written
pub const MAX_DETAILS_CHARS: usize = 255;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt row for tracking ID {tracking_id}: {reason}")]
    CorruptRow { tracking_id: i64, reason: String },
}

pub type DbResult<T> = Result<T, DbError>;

/// Handle to the embedded database file.
///
/// A connection is opened for each operation and dropped when it finishes.
#[derive(Debug, Clone)]
pub struct ComplaintDb {
    path: PathBuf,
}

// Raw column values before they are checked against the closed enums
struct ComplaintRow {
    tracking_id: i64,
    zone_number: i32,
    details: String,
    submission_date: String,
    category: String,
    status: String,
}

impl ComplaintDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> DbResult<Connection> {
        ensure_parent_dir(&self.path)?;
        Ok(Connection::open(&self.path)?)
    }

    /// Create the COMPLAINTS table if it is missing
    pub fn ensure_schema(&self) -> DbResult<()> {
        let conn = self.open()?;
        create_schema(&conn)
    }

    /// Read every stored complaint, ordered by tracking ID
    pub fn load_all(&self) -> DbResult<Vec<Complaint>> {
        let conn = self.open()?;
        create_schema(&conn)?;

        let mut stmt = conn.prepare(
            "SELECT TRACKING_ID, ZONE_NUMBER, DETAILS, SUBMISSION_DATE, CATEGORY, STATUS
             FROM COMPLAINTS
             ORDER BY TRACKING_ID",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ComplaintRow {
                    tracking_id: row.get(0)?,
                    zone_number: row.get(1)?,
                    details: row.get(2)?,
                    submission_date: row.get(3)?,
                    category: row.get(4)?,
                    status: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(row_to_complaint).collect()
    }

    /// Replace the whole table with the given collection in one transaction
    pub fn replace_all(&self, complaints: &[Complaint]) -> DbResult<()> {
        let mut conn = self.open()?;
        create_schema(&conn)?;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM COMPLAINTS", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO COMPLAINTS
                    (TRACKING_ID, ZONE_NUMBER, DETAILS, SUBMISSION_DATE, CATEGORY, STATUS)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for complaint in complaints {
                insert.execute(params![
                    complaint.tracking_id(),
                    complaint.zone_number(),
                    truncate_details(complaint.details()),
                    complaint.formatted_date(),
                    complaint.category().as_str(),
                    complaint.status().as_str(),
                ])?;
            }
        }
        tx.commit()?;

        log::debug!(
            "Flushed {} complaints to {}",
            complaints.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS COMPLAINTS (
            TRACKING_ID INTEGER PRIMARY KEY,
            ZONE_NUMBER INTEGER NOT NULL,
            DETAILS VARCHAR(255) NOT NULL,
            SUBMISSION_DATE VARCHAR(50) NOT NULL,
            CATEGORY VARCHAR(50) NOT NULL,
            STATUS VARCHAR(50) NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn row_to_complaint(row: ComplaintRow) -> DbResult<Complaint> {
    let corrupt = |reason: String| DbError::CorruptRow {
        tracking_id: row.tracking_id,
        reason,
    };

    let tracking_id = u32::try_from(row.tracking_id)
        .ok()
        .filter(|id| is_valid_tracking_id(*id))
        .ok_or_else(|| corrupt("tracking ID out of range".to_string()))?;
    let submission_date = parse_date(&row.submission_date)
        .map_err(|e| corrupt(format!("bad date '{}': {}", row.submission_date, e)))?;
    let category = row
        .category
        .parse::<IssueCategory>()
        .map_err(|e| corrupt(format!("{}", e)))?;
    let status = row
        .status
        .parse::<ComplaintStatus>()
        .map_err(|e| corrupt(format!("{}", e)))?;

    Ok(Complaint::from_parts(
        tracking_id,
        row.zone_number,
        row.details,
        category,
        status,
        submission_date,
    ))
}

fn truncate_details(details: &str) -> &str {
    match details.char_indices().nth(MAX_DETAILS_CHARS) {
        Some((byte_index, _)) => &details[..byte_index],
        None => details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn complaint(id: u32, category: IssueCategory, status: ComplaintStatus) -> Complaint {
        let date = NaiveDate::from_ymd_opt(2025, 3, id)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        let details = format!("Complaint {}", id);
        Complaint::from_parts(id, 10 + id as i32, details, category, status, date)
    }

    #[test]
    fn test_db_init() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
        db.ensure_schema().unwrap();
        // Idempotent
        db.ensure_schema().unwrap();

        let conn = Connection::open(db.path()).unwrap();
        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'COMPLAINTS'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 1);
    }

    #[test]
    fn test_empty_table_loads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));

        assert!(db.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
        let complaints = vec![
            complaint(1, IssueCategory::TrashCollection, ComplaintStatus::Submitted),
            complaint(2, IssueCategory::WaterOutage, ComplaintStatus::InReview),
            complaint(3, IssueCategory::OtherMunicipal, ComplaintStatus::Closed),
        ];

        db.replace_all(&complaints).unwrap();

        assert_eq!(db.load_all().unwrap(), complaints);
    }

    #[test]
    fn test_replace_all_drops_previous_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));

        db.replace_all(&[
            complaint(1, IssueCategory::TrashCollection, ComplaintStatus::Submitted),
            complaint(2, IssueCategory::StreetLighting, ComplaintStatus::Submitted),
        ])
        .unwrap();
        db.replace_all(&[complaint(2, IssueCategory::StreetLighting, ComplaintStatus::Closed)])
            .unwrap();

        let loaded = db.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tracking_id(), 2);
        assert_eq!(loaded[0].status(), ComplaintStatus::Closed);
    }

    #[test]
    fn test_details_truncated_to_column_width() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
        let long_details = "é".repeat(300);
        let date = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let original = Complaint::from_parts(
            1,
            1,
            long_details,
            IssueCategory::ExcessiveNoise,
            ComplaintStatus::Submitted,
            date,
        );

        db.replace_all(std::slice::from_ref(&original)).unwrap();

        let loaded = db.load_all().unwrap();
        assert_eq!(loaded[0].details().chars().count(), MAX_DETAILS_CHARS);
        assert_eq!(loaded[0].submission_date(), original.submission_date());
    }

    #[test]
    fn test_unknown_category_is_corrupt_row() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
        db.ensure_schema().unwrap();

        let conn = Connection::open(db.path()).unwrap();
        conn.execute(
            "INSERT INTO COMPLAINTS
             VALUES (?1, 2, 'Pothole', '2025-01-01 10:00:00', ?2, 'SUBMITTED')",
            params![4, "POTHOLES"],
        )
        .unwrap();

        match db.load_all() {
            Err(DbError::CorruptRow { tracking_id, .. }) => assert_eq!(tracking_id, 4),
            other => panic!("expected corrupt row, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_ids_are_corrupt_rows() {
        for bad_id in [0, -3, i64::from(u32::MAX), i64::from(u32::MAX) + 1] {
            let temp_dir = TempDir::new().unwrap();
            let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
            db.ensure_schema().unwrap();

            let conn = Connection::open(db.path()).unwrap();
            conn.execute(
                "INSERT INTO COMPLAINTS
                 VALUES (?1, 1, 'x', '2025-01-01 10:00:00', ?2, 'SUBMITTED')",
                params![bad_id, "OTHER_MUNICIPAL"],
            )
            .unwrap();

            match db.load_all() {
                Err(DbError::CorruptRow { tracking_id, .. }) => assert_eq!(tracking_id, bad_id),
                other => panic!("expected corrupt row for {}, got {:?}", bad_id, other),
            }
        }
    }

    #[test]
    fn test_truncate_details_keeps_short_text() {
        assert_eq!(truncate_details("short"), "short");
        assert_eq!(truncate_details(&"x".repeat(256)).len(), 255);
    }
}
