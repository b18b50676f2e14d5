use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::activity::{hhmm, Activity};
use crate::repository::traits::{ensure_valid, not_found, ActivityRepository};

const COLUMNS: &str = "id, title, subject, date, time, duration, notes, completed, completed_at, \
                       user_id, created_at, updated_at";

/// Relational backend: an `activities` table keyed by id and scoped by `user_id`.
pub struct SqliteActivityRepository {
    conn: Connection,
}

impl SqliteActivityRepository {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened activity database");
        Self::wrap(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::wrap(Connection::open_in_memory()?)
    }

    fn wrap(conn: Connection) -> Result<Self, StorageError> {
        migrate(&conn)?;
        Ok(Self { conn })
    }
}

fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            id TEXT NOT NULL PRIMARY KEY,
            title TEXT NOT NULL,
            subject TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            duration INTEGER NOT NULL CHECK (duration > 0),
            notes TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS activities_user_date ON activities (user_id, date);
        "#,
    )?;
    Ok(())
}

/// Columns as SQLite hands them back, before parsing.
struct ActivityRow {
    id: String,
    title: String,
    subject: String,
    date: String,
    time: String,
    duration: u32,
    notes: Option<String>,
    completed: bool,
    completed_at: Option<String>,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl ActivityRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            subject: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            duration: row.get(5)?,
            notes: row.get(6)?,
            completed: row.get(7)?,
            completed_at: row.get(8)?,
            user_id: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<ActivityRow> for Activity {
    type Error = StorageError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, raw: &str| StorageError::Corrupt(format!("bad {} '{}'", what, raw));

        let activity = Activity {
            id: Uuid::parse_str(&row.id).map_err(|_| corrupt("id", &row.id))?,
            date: NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|_| corrupt("date", &row.date))?,
            time: hhmm::parse(&row.time).ok_or_else(|| corrupt("time", &row.time))?,
            completed_at: row
                .completed_at
                .as_deref()
                .map(|raw| parse_timestamp(raw).ok_or_else(|| corrupt("completed_at", raw)))
                .transpose()?,
            created_at: parse_timestamp(&row.created_at)
                .ok_or_else(|| corrupt("created_at", &row.created_at))?,
            updated_at: parse_timestamp(&row.updated_at)
                .ok_or_else(|| corrupt("updated_at", &row.updated_at))?,
            title: row.title,
            subject: row.subject,
            duration: row.duration,
            notes: row.notes,
            completed: row.completed,
            owner_id: row.user_id,
        };
        ensure_valid(&activity)?;
        Ok(activity)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ActivityRepository for SqliteActivityRepository {
    fn list(&self, owner: &str) -> Result<Vec<Activity>, StorageError> {
        let sql = format!(
            "SELECT {} FROM activities WHERE user_id = ?1 ORDER BY date ASC, created_at ASC",
            COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![owner], ActivityRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(owner, count = rows.len(), "selected activities");
        rows.into_iter().map(Activity::try_from).collect()
    }

    fn insert(&self, activity: Activity) -> Result<Activity, StorageError> {
        ensure_valid(&activity)?;
        let sql = format!(
            "INSERT INTO activities ({cols}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING {cols}",
            cols = COLUMNS
        );
        let row = self.conn.query_row(
            &sql,
            params![
                activity.id.to_string(),
                activity.title,
                activity.subject,
                activity.date.format("%Y-%m-%d").to_string(),
                activity.time.format(hhmm::FORMAT).to_string(),
                activity.duration,
                activity.notes,
                activity.completed,
                activity.completed_at.map(format_timestamp),
                activity.owner_id,
                format_timestamp(activity.created_at),
                format_timestamp(activity.updated_at),
            ],
            ActivityRow::read,
        )?;
        Activity::try_from(row)
    }

    fn update(&self, activity: &Activity) -> Result<(), StorageError> {
        ensure_valid(activity)?;
        let changed = self.conn.execute(
            "UPDATE activities SET completed = ?1, completed_at = ?2, updated_at = ?3 \
             WHERE id = ?4 AND user_id = ?5",
            params![
                activity.completed,
                activity.completed_at.map(format_timestamp),
                format_timestamp(activity.updated_at),
                activity.id.to_string(),
                activity.owner_id,
            ],
        )?;
        if changed == 0 {
            return Err(not_found(activity));
        }
        debug!(id = %activity.id, completed = activity.completed, "updated activity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::NewActivity;
    use chrono::NaiveTime;

    fn activity(owner: &str, date: &str, time: &str) -> Activity {
        let input = NewActivity::new(
            "Flashcards",
            "Spanish",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            20,
        )
        .unwrap()
        .with_notes("verbs");
        Activity::new(input, owner, Utc::now())
    }

    #[test]
    fn test_insert_returns_stored_row() {
        let repo = SqliteActivityRepository::open_in_memory().unwrap();
        let new = activity("alice", "2025-03-10", "07:15");
        let stored = repo.insert(new.clone()).unwrap();

        assert_eq!(stored.id, new.id);
        assert_eq!(stored.time, new.time);
        assert_eq!(stored.notes.as_deref(), Some("verbs"));
        assert!(!stored.completed);
    }

    #[test]
    fn test_list_orders_by_date_and_filters_owner() {
        let repo = SqliteActivityRepository::open_in_memory().unwrap();
        repo.insert(activity("alice", "2025-03-12", "08:00")).unwrap();
        repo.insert(activity("bob", "2025-03-01", "08:00")).unwrap();
        repo.insert(activity("alice", "2025-03-02", "08:00")).unwrap();

        let dates: Vec<String> = repo
            .list("alice")
            .unwrap()
            .iter()
            .map(|a| a.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2025-03-02", "2025-03-12"]);
    }

    #[test]
    fn test_update_matches_id_and_owner() {
        let repo = SqliteActivityRepository::open_in_memory().unwrap();
        let stored = repo.insert(activity("alice", "2025-03-10", "09:00")).unwrap();
        let done = stored.toggled(Utc::now());
        repo.update(&done).unwrap();

        let listed = repo.list("alice").unwrap();
        assert!(listed[0].completed);
        assert!(listed[0].completed_at.is_some());

        let mut foreign = done.toggled(Utc::now());
        foreign.owner_id = "mallory".to_string();
        assert!(matches!(repo.update(&foreign), Err(StorageError::NotFound(_))));
        assert!(repo.list("alice").unwrap()[0].completed);
    }
}
