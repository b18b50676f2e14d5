use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::model::activity::Activity;
use crate::repository::traits::{ensure_valid, not_found, ActivityRepository};

/// Key under which the whole collection is kept.
pub const ACTIVITIES_KEY: &str = "activities";

/// Local key-value store: one JSON document holding every activity.
///
/// The document is read once when the repository opens and rewritten in full
/// after each mutation. The cached copy only changes once the write landed.
pub struct FileActivityRepository {
    file_path: PathBuf,
    activities: RefCell<Vec<Activity>>,
}

impl FileActivityRepository {
    pub fn open(base_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(base_dir)?;
        let file_path = base_dir.join(format!("{}.json", ACTIVITIES_KEY));

        if !file_path.exists() {
            write_activities(&file_path, &[])?;
        }

        let activities = read_activities(&file_path)?;
        for activity in &activities {
            ensure_valid(activity)?;
        }
        debug!(path = %file_path.display(), count = activities.len(), "loaded local activities");

        Ok(Self {
            file_path,
            activities: RefCell::new(activities),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn commit(&self, activities: Vec<Activity>) -> Result<(), StorageError> {
        write_activities(&self.file_path, &activities)?;
        debug!(path = %self.file_path.display(), count = activities.len(), "wrote local activities");
        *self.activities.borrow_mut() = activities;
        Ok(())
    }
}

fn read_activities(path: &Path) -> Result<Vec<Activity>, StorageError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes the whole document next to `path` and renames it into place, so
/// readers see either the old or the new collection.
fn write_activities(path: &Path, activities: &[Activity]) -> Result<(), StorageError> {
    let tmp_path = path.with_extension("json.tmp");
    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, activities)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl ActivityRepository for FileActivityRepository {
    fn list(&self, owner: &str) -> Result<Vec<Activity>, StorageError> {
        let mut owned: Vec<Activity> = self
            .activities
            .borrow()
            .iter()
            .filter(|a| a.owner_id == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.date);
        Ok(owned)
    }

    fn insert(&self, activity: Activity) -> Result<Activity, StorageError> {
        ensure_valid(&activity)?;
        let mut activities = self.activities.borrow().clone();
        activities.push(activity.clone());
        self.commit(activities)?;
        Ok(activity)
    }

    fn update(&self, activity: &Activity) -> Result<(), StorageError> {
        ensure_valid(activity)?;
        let mut activities = self.activities.borrow().clone();
        let pos = activities
            .iter()
            .position(|a| a.id == activity.id && a.owner_id == activity.owner_id)
            .ok_or_else(|| not_found(activity))?;
        activities[pos] = activity.clone();
        self.commit(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::NewActivity;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("studyplan-test-{}", Uuid::new_v4()))
    }

    fn activity(owner: &str, day: u32) -> Activity {
        let input = NewActivity::new(
            "Reading",
            "History",
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            45,
        )
        .unwrap();
        Activity::new(input, owner, Utc::now())
    }

    #[test]
    fn test_open_creates_empty_document() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        assert!(repo.path().exists());
        assert!(repo.list("local").unwrap().is_empty());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        let later = repo.insert(activity("local", 12)).unwrap();
        let earlier = repo.insert(activity("local", 3)).unwrap();
        repo.update(&later.toggled(Utc::now())).unwrap();

        let reopened = FileActivityRepository::open(&dir).unwrap();
        let listed = reopened.list("local").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, earlier.id);
        assert_eq!(listed[1].id, later.id);
        assert!(listed[1].completed);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_inserted_time_matches_reloaded_time() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        let input = NewActivity::new(
            "Flashcards",
            "Japanese",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            crate::time::parse_time("09:30:45").unwrap(),
            20,
        )
        .unwrap();
        let stored = repo.insert(Activity::new(input, "local", Utc::now())).unwrap();

        let reopened = FileActivityRepository::open(&dir).unwrap();
        let reloaded = &reopened.list("local").unwrap()[0];
        assert_eq!(reloaded.time, stored.time);
        assert_eq!(stored.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_list_and_update_are_owner_scoped() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        let mine = repo.insert(activity("alice", 1)).unwrap();
        repo.insert(activity("bob", 2)).unwrap();

        assert_eq!(repo.list("alice").unwrap().len(), 1);

        let mut stolen = mine.toggled(Utc::now());
        stolen.owner_id = "bob".to_string();
        assert!(matches!(repo.update(&stolen), Err(StorageError::NotFound(id)) if id == mine.id));
        assert!(!repo.list("alice").unwrap()[0].completed);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_write_replaces_document_without_leftovers() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        repo.insert(activity("local", 4)).unwrap();
        repo.insert(activity("local", 5)).unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["activities.json".to_string()]);
        assert_eq!(read_activities(repo.path()).unwrap().len(), 2);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_failed_write_keeps_previous_document() {
        let dir = scratch_dir();
        let repo = FileActivityRepository::open(&dir).unwrap();
        let kept = repo.insert(activity("local", 4)).unwrap();

        // A directory where the temp file goes makes the next write fail.
        fs::create_dir_all(dir.join("activities.json.tmp")).unwrap();
        assert!(repo.insert(activity("local", 5)).is_err());
        assert_eq!(repo.list("local").unwrap().len(), 1);

        let on_disk = read_activities(repo.path()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].id, kept.id);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_rejects_corrupt_document() {
        let dir = scratch_dir();
        let mut bad = activity("local", 1);
        bad.completed = true;
        fs::create_dir_all(&dir).unwrap();
        write_activities(&dir.join("activities.json"), &[bad]).unwrap();

        assert!(matches!(
            FileActivityRepository::open(&dir),
            Err(StorageError::Corrupt(_))
        ));
        fs::remove_dir_all(dir).ok();
    }
}
