use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, Weekday};

/// Weekdays in display order, Sunday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Completed study time bucketed by weekday, Sunday first.
///
/// Totals are kept in whole minutes so equal study time compares equal no
/// matter how it was split into sessions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayHours {
    minutes: [u64; 7],
}

impl WeekdayHours {
    pub fn add(&mut self, day: Weekday, minutes: u32) {
        self.minutes[day.num_days_from_sunday() as usize] += minutes as u64;
    }

    pub fn minutes(&self, day: Weekday) -> u64 {
        self.minutes[day.num_days_from_sunday() as usize]
    }

    pub fn get(&self, day: Weekday) -> f64 {
        self.minutes(day) as f64 / 60.0
    }

    /// (weekday, hours) pairs in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEKDAYS.iter().map(move |d| (*d, self.get(*d)))
    }

    /// Weekday with the largest total. Ties go to the earliest weekday.
    pub fn best(&self) -> Weekday {
        let mut best = Weekday::Sun;
        for day in WEEKDAYS {
            if self.minutes(day) > self.minutes(best) {
                best = day;
            }
        }
        best
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hours: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}
