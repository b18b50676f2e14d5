pub mod calendar;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use calendar::{month_grid, CalendarCell, YearMonth, WEEKDAY_LABELS};
pub use config::{Backend, Config, ConfigError, LOCAL_OWNER};
pub use error::{StorageError, ValidationError};
pub use input::{parse_args, expand_key, ActivityForm, ParsedInput};
pub use model::{weekday_name, Activity, DailyHours, NewActivity, Session, Summary, WeekdayHours};
pub use repository::{open_repository, ActivityRepository, FileActivityRepository, SqliteActivityRepository};
pub use service::notify::{Notice, Notifier, Severity, TracingNotifier};
pub use service::study_store::StudyStore;
pub use time::{parse_duration_minutes, parse_human_date, parse_time};
