use crate::error::StorageError;
use crate::model::activity::Activity;

/// Persistence capability behind the activity store.
///
/// Every operation is scoped to one owner: `list` only returns that owner's
/// activities, and `update` only touches a row whose id and owner both match.
pub trait ActivityRepository {
    /// All activities of `owner`, ordered by date ascending.
    fn list(&self, owner: &str) -> Result<Vec<Activity>, StorageError>;
    /// Persists a new activity and returns the row as stored.
    fn insert(&self, activity: Activity) -> Result<Activity, StorageError>;
    fn update(&self, activity: &Activity) -> Result<(), StorageError>;
}

impl<R: ActivityRepository + ?Sized> ActivityRepository for Box<R> {
    fn list(&self, owner: &str) -> Result<Vec<Activity>, StorageError> {
        (**self).list(owner)
    }

    fn insert(&self, activity: Activity) -> Result<Activity, StorageError> {
        (**self).insert(activity)
    }

    fn update(&self, activity: &Activity) -> Result<(), StorageError> {
        (**self).update(activity)
    }
}

pub(crate) fn not_found(activity: &Activity) -> StorageError {
    StorageError::NotFound(activity.id)
}

pub(crate) fn ensure_valid(activity: &Activity) -> Result<(), StorageError> {
    activity.check().map_err(StorageError::Corrupt)
}
