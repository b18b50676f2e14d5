//! Read-only derivations over a snapshot of activities.
//!
//! Everything here is a plain function of its arguments; "now" and "today"
//! are passed in so results do not depend on the wall clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::model::activity::Activity;
use crate::model::stats::{DailyHours, Summary, WeekdayHours};

pub fn activities_for_date(activities: &[Activity], date: NaiveDate) -> Vec<&Activity> {
    activities.iter().filter(|a| a.date == date).collect()
}

pub fn completed_count(activities: &[Activity]) -> usize {
    activities.iter().filter(|a| a.completed).count()
}

/// Completed minutes, in hours.
pub fn total_study_hours(activities: &[Activity]) -> f64 {
    let minutes: u64 = activities
        .iter()
        .filter(|a| a.completed)
        .map(|a| a.duration as u64)
        .sum();
    minutes as f64 / 60.0
}

/// Percentage (0-100) of completed activities; 0 for an empty collection.
pub fn completion_rate(activities: &[Activity]) -> f64 {
    if activities.is_empty() {
        return 0.0;
    }
    completed_count(activities) as f64 / activities.len() as f64 * 100.0
}

/// Earliest incomplete activity starting strictly after `now`.
/// On equal start times the one earlier in the collection wins.
pub fn next_activity(activities: &[Activity], now: NaiveDateTime) -> Option<&Activity> {
    activities
        .iter()
        .filter(|a| !a.completed && a.starts_at() > now)
        .min_by_key(|a| a.starts_at())
}

pub fn weekly_stats(activities: &[Activity]) -> WeekdayHours {
    let mut stats = WeekdayHours::default();
    for activity in activities.iter().filter(|a| a.completed) {
        stats.add(activity.date.weekday(), activity.duration);
    }
    stats
}

/// Weekday with the most completed study time across the whole collection.
pub fn best_study_day_of_week(activities: &[Activity]) -> Weekday {
    weekly_stats(activities).best()
}

pub fn summary(activities: &[Activity]) -> Summary {
    let completed = completed_count(activities);
    Summary {
        total: activities.len(),
        completed,
        pending: activities.len() - completed,
    }
}

/// Completed hours for each of the `days` dates ending at `end`, oldest first.
pub fn recent_daily_hours(activities: &[Activity], end: NaiveDate, days: u32) -> Vec<DailyHours> {
    (0..days as i64)
        .rev()
        .map(|back| {
            let date = end - Duration::days(back);
            let hours = activities
                .iter()
                .filter(|a| a.completed && a.date == date)
                .map(Activity::hours)
                .sum();
            DailyHours {
                date,
                weekday: date.weekday(),
                hours,
            }
        })
        .collect()
}

/// Study list order: latest date and time first.
pub fn sorted_newest_first(activities: &[Activity]) -> Vec<&Activity> {
    let mut sorted: Vec<&Activity> = activities.iter().collect();
    sorted.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::NewActivity;
    use chrono::{NaiveTime, Utc};

    fn at(date: &str, time: &str, duration: u32, completed: bool) -> Activity {
        let input = NewActivity::new(
            "Session",
            "Physics",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            duration,
        )
        .unwrap();
        let activity = Activity::new(input, "local", Utc::now());
        if completed {
            activity.toggled(Utc::now())
        } else {
            activity
        }
    }

    fn moment(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(&[]), 0.0);

        let activities = vec![
            at("2025-03-10", "09:00", 30, true),
            at("2025-03-11", "09:00", 30, false),
            at("2025-03-12", "09:00", 30, false),
            at("2025-03-13", "09:00", 30, false),
        ];
        assert_eq!(completion_rate(&activities), 25.0);
        assert_eq!(completed_count(&activities), 1);
    }

    #[test]
    fn test_total_study_hours_ignores_incomplete() {
        let activities = vec![
            at("2025-03-10", "09:00", 90, true),
            at("2025-03-10", "14:00", 300, false),
        ];
        assert_eq!(total_study_hours(&activities), 1.5);
    }

    #[test]
    fn test_next_activity_picks_earliest_future() {
        let activities = vec![
            at("2025-01-02", "09:00", 60, false),
            at("2025-01-01", "09:00", 60, false),
            at("2024-12-31", "09:00", 60, false),
        ];
        let next = next_activity(&activities, moment("2024-12-31T12:00")).unwrap();
        assert_eq!(next.date.to_string(), "2025-01-01");
    }

    #[test]
    fn test_next_activity_skips_past_and_completed() {
        let activities = vec![
            at("2025-01-01", "09:00", 60, true),
            at("2024-06-01", "09:00", 60, false),
        ];
        assert!(next_activity(&activities, moment("2024-12-31T12:00")).is_none());

        let exactly_now = vec![at("2024-12-31", "12:00", 60, false)];
        assert!(next_activity(&exactly_now, moment("2024-12-31T12:00")).is_none());
    }

    #[test]
    fn test_next_activity_tie_keeps_collection_order() {
        let activities = vec![
            at("2025-01-01", "09:00", 30, false),
            at("2025-01-01", "09:00", 45, false),
        ];
        let next = next_activity(&activities, moment("2024-12-31T12:00")).unwrap();
        assert_eq!(next.id, activities[0].id);
    }

    #[test]
    fn test_activities_for_date_matches_date_only() {
        let activities = vec![
            at("2025-03-10", "08:00", 30, false),
            at("2025-03-11", "08:00", 30, false),
            at("2025-03-10", "22:00", 30, true),
        ];
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let found = activities_for_date(&activities, date);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, activities[0].id);
        assert_eq!(found[1].id, activities[2].id);
    }

    #[test]
    fn test_best_study_day_of_week() {
        // 2025-03-09 is a Sunday, 2025-03-11 a Tuesday.
        let activities = vec![
            at("2025-03-09", "09:00", 60, true),
            at("2025-03-11", "09:00", 45, true),
            at("2025-03-18", "09:00", 45, true),
            at("2025-03-12", "09:00", 600, false),
        ];
        assert_eq!(best_study_day_of_week(&activities), Weekday::Tue);
        assert_eq!(best_study_day_of_week(&[]), Weekday::Sun);

        let stats = weekly_stats(&activities);
        assert_eq!(stats.get(Weekday::Tue), 1.5);
        assert_eq!(stats.get(Weekday::Wed), 0.0);
    }

    #[test]
    fn test_best_day_tie_with_uneven_session_counts() {
        // Six 10-minute Sunday sessions against one 60-minute Monday session.
        let mut activities: Vec<Activity> = (0..6)
            .map(|i| at("2025-03-09", &format!("{:02}:00", 8 + i), 10, true))
            .collect();
        activities.push(at("2025-03-10", "09:00", 60, true));

        let stats = weekly_stats(&activities);
        assert_eq!(stats.minutes(Weekday::Sun), 60);
        assert_eq!(stats.minutes(Weekday::Mon), 60);
        assert_eq!(best_study_day_of_week(&activities), Weekday::Sun);
    }

    #[test]
    fn test_recent_daily_hours_window() {
        let activities = vec![
            at("2025-03-10", "09:00", 30, true),
            at("2025-03-10", "19:00", 90, true),
            at("2025-03-08", "09:00", 60, false),
            at("2025-03-01", "09:00", 60, true),
        ];
        let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let window = recent_daily_hours(&activities, end, 7);

        assert_eq!(window.len(), 7);
        assert_eq!(window[0].date.to_string(), "2025-03-04");
        assert_eq!(window[6].date, end);
        assert_eq!(window[6].weekday, Weekday::Mon);
        assert_eq!(window[6].hours, 2.0);
        assert_eq!(window.iter().map(|d| d.hours).sum::<f64>(), 2.0);
    }

    #[test]
    fn test_summary_and_sorting() {
        let activities = vec![
            at("2025-03-10", "09:00", 30, true),
            at("2025-03-12", "07:00", 30, false),
            at("2025-03-12", "21:00", 30, false),
        ];
        assert_eq!(
            summary(&activities),
            Summary { total: 3, completed: 1, pending: 2 }
        );

        let sorted = sorted_newest_first(&activities);
        assert_eq!(sorted[0].id, activities[2].id);
        assert_eq!(sorted[2].id, activities[0].id);
    }
}
