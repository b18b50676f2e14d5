//! Month grids for a seven-column, Sunday-first calendar.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    /// Padding before the 1st of the month.
    Empty,
    Day(u32),
}

/// A month of a year. `month0` is zero-based (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month0: u32,
}

impl YearMonth {
    pub fn new(year: i32, month0: u32) -> Result<Self> {
        if month0 > 11 {
            return Err(anyhow!("Month index out of range: {}", month0));
        }
        // Reject years chrono cannot represent.
        NaiveDate::from_ymd_opt(year, month0 + 1, 1)
            .ok_or_else(|| anyhow!("Year out of range: {}", year))?;
        Ok(Self { year, month0 })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    /// The month before, or `self` at the earliest representable month.
    pub fn previous(&self) -> Self {
        let candidate = if self.month0 == 0 {
            Self { year: self.year - 1, month0: 11 }
        } else {
            Self { year: self.year, month0: self.month0 - 1 }
        };
        candidate.or_self(*self)
    }

    /// The month after, or `self` at the latest representable month.
    pub fn next(&self) -> Self {
        let candidate = if self.month0 == 11 {
            Self { year: self.year + 1, month0: 0 }
        } else {
            Self { year: self.year, month0: self.month0 + 1 }
        };
        candidate.or_self(*self)
    }

    fn or_self(self, fallback: Self) -> Self {
        match NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1) {
            Some(_) => self,
            None => fallback,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Weekday of the 1st, Sunday = 0.
    pub fn first_weekday(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn days_in_month(&self) -> u32 {
        if self.month0 == 11 {
            return 31;
        }
        NaiveDate::from_ymd_opt(self.year, self.month0 + 2, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// Date of `day` in this month, if the month has such a day.
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    /// "March 2025"
    pub fn name(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }

    pub fn grid(&self) -> Vec<CalendarCell> {
        let leading = self.first_weekday() as usize;
        let mut cells = vec![CalendarCell::Empty; leading];
        cells.extend((1..=self.days_in_month()).map(CalendarCell::Day));
        cells
    }
}

/// Cells for `year` and zero-based `month0`: blanks up to the weekday of the
/// 1st, then one cell per day.
pub fn month_grid(year: i32, month0: u32) -> Result<Vec<CalendarCell>> {
    Ok(YearMonth::new(year, month0)?.grid())
}

/// Splits cells into rows of seven; the last row may be short.
pub fn weeks(cells: &[CalendarCell]) -> Vec<&[CalendarCell]> {
    cells.chunks(7).collect()
}
