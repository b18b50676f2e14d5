use chrono::{Local, NaiveDate, Utc, Weekday};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::activity::{Activity, NewActivity, Session};
use crate::model::stats::{DailyHours, Summary, WeekdayHours};
use crate::repository::ActivityRepository;
use crate::service::notify::{Notice, Notifier};
use crate::service::stats;

/// Owns the current user's activities and mediates every read and write to
/// the repository.
///
/// The in-memory collection only changes after the repository confirmed a
/// write. Storage failures are logged, reported once through the notifier
/// and otherwise swallowed.
pub struct StudyStore<R: ActivityRepository, N: Notifier> {
    repo: R,
    notifier: N,
    session: Option<Session>,
    activities: Vec<Activity>,
}

impl<R: ActivityRepository, N: Notifier> StudyStore<R, N> {
    /// A signed-out store with an empty collection.
    pub fn new(repo: R, notifier: N) -> Self {
        Self {
            repo,
            notifier,
            session: None,
            activities: Vec::new(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Starts `session` and loads its activities. A different user never
    /// sees the previous user's collection, even when loading fails.
    pub fn sign_in(&mut self, session: Session) {
        info!(user = %session.user_id, "session started");
        if self.session.as_ref() != Some(&session) {
            self.activities.clear();
        }
        self.session = Some(session);
        self.refresh();
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.user_id, "session ended");
        }
        self.activities.clear();
    }

    /// Reloads the collection from storage. Without a session the
    /// collection is cleared.
    pub fn refresh(&mut self) {
        let Some(session) = &self.session else {
            debug!("refresh without session, clearing activities");
            self.activities.clear();
            return;
        };

        match self.repo.list(&session.user_id) {
            Ok(activities) => {
                debug!(user = %session.user_id, count = activities.len(), "activities loaded");
                self.activities = activities;
            }
            Err(e) => {
                self.report(
                    "loading activities",
                    &e,
                    Notice::destructive("Error", "Could not load your activities"),
                );
            }
        }
    }

    /// Persists a new activity and appends it once storage accepted it.
    /// Returns `None` when signed out or when storage failed.
    pub fn create(&mut self, input: NewActivity) -> Option<Activity> {
        let Some(session) = &self.session else {
            warn!(title = input.title(), "create ignored without session");
            return None;
        };

        let activity = Activity::new(input, &session.user_id, Utc::now());
        match self.repo.insert(activity) {
            Ok(stored) => {
                info!(id = %stored.id, title = %stored.title, "activity created");
                self.activities.push(stored.clone());
                self.notifier
                    .notify(Notice::normal("Saved", "Activity saved successfully"));
                Some(stored)
            }
            Err(e) => {
                self.report(
                    "creating activity",
                    &e,
                    Notice::destructive("Error", "Could not save the activity"),
                );
                None
            }
        }
    }

    /// Flips the completion state of `id`. Returns the new state, or `None`
    /// when nothing changed (unknown id, signed out, storage failure).
    pub fn toggle_completion(&mut self, id: &Uuid) -> Option<bool> {
        self.session.as_ref()?;
        let pos = self.activities.iter().position(|a| a.id == *id)?;

        let updated = self.activities[pos].toggled(Utc::now());
        match self.repo.update(&updated) {
            Ok(()) => {
                info!(id = %updated.id, completed = updated.completed, "activity toggled");
                let completed = updated.completed;
                self.activities[pos] = updated;
                Some(completed)
            }
            Err(e) => {
                self.report(
                    "updating activity",
                    &e,
                    Notice::destructive("Error", "Could not update the activity"),
                );
                None
            }
        }
    }

    fn report(&self, action: &str, err: &StorageError, notice: Notice) {
        error!(error = %err, "{} failed", action);
        self.notifier.notify(notice);
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get(&self, id: &Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == *id)
    }

    pub fn activities_for_date(&self, date: NaiveDate) -> Vec<&Activity> {
        stats::activities_for_date(&self.activities, date)
    }

    pub fn completed_count(&self) -> usize {
        stats::completed_count(&self.activities)
    }

    pub fn total_study_hours(&self) -> f64 {
        stats::total_study_hours(&self.activities)
    }

    pub fn completion_rate(&self) -> f64 {
        stats::completion_rate(&self.activities)
    }

    pub fn next_activity(&self) -> Option<&Activity> {
        stats::next_activity(&self.activities, Local::now().naive_local())
    }

    pub fn best_study_day_of_week(&self) -> Weekday {
        stats::best_study_day_of_week(&self.activities)
    }

    pub fn weekly_stats(&self) -> WeekdayHours {
        stats::weekly_stats(&self.activities)
    }

    pub fn summary(&self) -> Summary {
        stats::summary(&self.activities)
    }

    pub fn recent_daily_hours(&self, end: NaiveDate, days: u32) -> Vec<DailyHours> {
        stats::recent_daily_hours(&self.activities, end, days)
    }

    pub fn sorted_newest_first(&self) -> Vec<&Activity> {
        stats::sorted_newest_first(&self.activities)
    }
}
