use std::collections::HashMap;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::model::activity::NewActivity;
use crate::time::{parse_duration_minutes, parse_human_date, parse_time};

/// Field names accepted as `key:value` on the command line.
pub const ACTIVITY_KEYS: [&str; 5] = ["subject", "date", "time", "duration", "notes"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Splits `key:value` pairs from the free words that make up the title.
///
/// Times contain a colon too, so only a key made of letters counts as a key.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()) {
                metadata.insert(key.to_lowercase(), value.to_string());
                continue;
            }
        }
        name_parts.push(arg.as_str());
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Raw registration form: every field as typed, nothing validated yet.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActivityForm {
    pub title: String,
    pub subject: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub notes: String,
}

impl ActivityForm {
    /// Builds a form from command line words. Unknown or ambiguous keys are
    /// returned as warnings rather than failing the whole form.
    pub fn from_args(args: &[String]) -> (Self, Vec<String>) {
        let parsed = parse_args(args);
        let mut form = ActivityForm {
            title: parsed.name,
            ..Default::default()
        };
        let mut warnings = Vec::new();

        for (key, value) in parsed.metadata {
            match expand_key(&key, &ACTIVITY_KEYS) {
                Ok(full_key) => match full_key.as_str() {
                    "subject" => form.subject = value,
                    "date" => form.date = value,
                    "time" => form.time = value,
                    "duration" => form.duration = value,
                    "notes" => form.notes = value,
                    _ => {}
                },
                Err(e) => warnings.push(e.to_string()),
            }
        }

        (form, warnings)
    }

    /// Required fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("subject", &self.subject),
            ("date", &self.date),
            ("time", &self.time),
            ("duration", &self.duration),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self, today: NaiveDate) -> Result<NewActivity> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(anyhow!("Missing required fields: {}", missing.join(", ")));
        }

        let date = parse_human_date(&self.date, today)?;
        let time = parse_time(&self.time)?;
        let duration = parse_duration_minutes(&self.duration)?;

        Ok(NewActivity::new(&self.title, &self.subject, date, time, duration)?.with_notes(&self.notes))
    }
}
