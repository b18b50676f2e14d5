pub mod activity;
pub mod stats;

pub use activity::{Activity, NewActivity, Session};
pub use stats::{weekday_name, DailyHours, Summary, WeekdayHours, WEEKDAYS};
