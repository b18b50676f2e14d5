use chrono::{Duration, NaiveDate};
use ratatui::widgets::TableState;
use studyplan_core::{Activity, ActivityRepository, StudyStore, YearMonth};

use crate::tui::StatusLine;

/// State of the calendar screen: the month on display, the selected day and
/// the selected activity within that day.
pub struct App<R: ActivityRepository> {
    pub store: StudyStore<R, StatusLine>,
    pub status: StatusLine,
    pub month: YearMonth,
    pub cursor: NaiveDate,
    pub today: NaiveDate,
    pub state: TableState,
}

impl<R: ActivityRepository> App<R> {
    pub fn new(store: StudyStore<R, StatusLine>, status: StatusLine, today: NaiveDate) -> Self {
        let mut app = App {
            store,
            status,
            month: YearMonth::containing(today),
            cursor: today,
            today,
            state: TableState::default(),
        };
        app.reset_selection();
        app
    }

    pub fn day_activities(&self) -> Vec<&Activity> {
        self.store.activities_for_date(self.cursor)
    }

    pub fn selected_activity(&self) -> Option<&Activity> {
        let i = self.state.selected()?;
        self.day_activities().get(i).copied()
    }

    pub fn move_days(&mut self, days: i64) {
        self.set_cursor(self.cursor + Duration::days(days));
    }

    pub fn next_month(&mut self) {
        self.set_cursor(self.month.next().first_day());
    }

    pub fn previous_month(&mut self) {
        self.set_cursor(self.month.previous().first_day());
    }

    pub fn jump_to_today(&mut self) {
        self.set_cursor(self.today);
    }

    fn set_cursor(&mut self, date: NaiveDate) {
        self.cursor = date;
        self.month = YearMonth::containing(date);
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        let count = self.day_activities().len();
        self.state.select(if count == 0 { None } else { Some(0) });
    }

    pub fn select_next_activity(&mut self) {
        let count = self.day_activities().len();
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn select_previous_activity(&mut self) {
        let count = self.day_activities().len();
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        self.status.clear();
        if let Some(id) = self.selected_activity().map(|a| a.id) {
            self.store.toggle_completion(&id);
        }
    }

    pub fn refresh(&mut self) {
        self.status.clear();
        let selected = self.state.selected();
        self.store.refresh();
        let count = self.day_activities().len();
        self.state.select(match selected {
            Some(i) if i < count => Some(i),
            _ if count > 0 => Some(0),
            _ => None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use studyplan_core::{NewActivity, Session, SqliteActivityRepository};

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn app_with(dates: &[&str], today: &str) -> App<SqliteActivityRepository> {
        let status = StatusLine::default();
        let repo = SqliteActivityRepository::open_in_memory().unwrap();
        let mut store = StudyStore::new(repo, status.clone());
        store.sign_in(Session::new("local"));
        for (i, date) in dates.iter().enumerate() {
            let input = NewActivity::new(
                &format!("Block {}", i),
                "Biology",
                day(date),
                NaiveTime::from_hms_opt(9 + i as u32, 0, 0).unwrap(),
                30,
            )
            .unwrap();
            store.create(input).unwrap();
        }
        status.clear();
        App::new(store, status, day(today))
    }

    #[test]
    fn test_starts_on_today() {
        let app = app_with(&["2025-03-10", "2025-03-10"], "2025-03-10");
        assert_eq!(app.month, YearMonth::new(2025, 2).unwrap());
        assert_eq!(app.day_activities().len(), 2);
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_cursor_crosses_months() {
        let mut app = app_with(&[], "2025-03-31");
        app.move_days(1);
        assert_eq!(app.cursor, day("2025-04-01"));
        assert_eq!(app.month, YearMonth::new(2025, 3).unwrap());

        app.previous_month();
        app.previous_month();
        assert_eq!(app.cursor, day("2025-02-01"));

        app.jump_to_today();
        assert_eq!(app.cursor, day("2025-03-31"));
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_selection_cycles_and_toggles() {
        let mut app = app_with(&["2025-03-10", "2025-03-10", "2025-03-11"], "2025-03-10");
        app.select_next_activity();
        app.select_next_activity();
        assert_eq!(app.state.selected(), Some(0));
        app.select_previous_activity();
        assert_eq!(app.state.selected(), Some(1));

        app.toggle_selected();
        assert!(app.selected_activity().unwrap().completed);
        assert!(!app.day_activities()[0].completed);
        assert!(app.status.current().is_none());
    }
}
