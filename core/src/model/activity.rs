use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use uuid::Uuid;

use crate::error::ValidationError;

/// One study session, planned or completed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// Minutes, always > 0.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(input: NewActivity, owner_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            subject: input.subject,
            date: input.date,
            time: input.time,
            duration: input.duration,
            notes: input.notes,
            completed: false,
            completed_at: None,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn hours(&self) -> f64 {
        self.duration as f64 / 60.0
    }

    /// Copy of this activity with `completed` flipped. `completed_at` follows
    /// the flag: stamped with `now` when completing, cleared when reopening.
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        let completed = !self.completed;
        Self {
            completed,
            completed_at: completed.then_some(now),
            updated_at: now,
            ..self.clone()
        }
    }

    /// Checks the invariants every stored record must hold.
    pub fn check(&self) -> Result<(), String> {
        if self.duration == 0 {
            return Err(format!("activity {} has zero duration", self.id));
        }
        if self.completed != self.completed_at.is_some() {
            return Err(format!(
                "activity {} has completed={} but completed_at={:?}",
                self.id, self.completed, self.completed_at
            ));
        }
        Ok(())
    }
}

/// Validated input for creating an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    title: String,
    subject: String,
    date: NaiveDate,
    time: NaiveTime,
    duration: u32,
    notes: Option<String>,
}

impl NewActivity {
    pub fn new(
        title: &str,
        subject: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration: u32,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        let subject = subject.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if subject.is_empty() {
            return Err(ValidationError::MissingField("subject"));
        }
        if duration == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        // Times are stored to the minute.
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Ok(Self {
            title: title.to_string(),
            subject: subject.to_string(),
            date,
            time,
            duration,
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        let notes = notes.trim();
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// The authenticated identity that scopes which activities are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

// Times are stored as "HH:MM"; older records with seconds still load.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{}'", raw)))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}
