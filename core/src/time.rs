use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use anyhow::{anyhow, Result};

/// Study length in minutes: "90", "90m", "2h" or "1h30m".
pub fn parse_duration_minutes(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    let minutes = if let Ok(plain) = input.parse::<u32>() {
        plain
    } else {
        let (hours, rest) = match input.split_once('h') {
            Some((h, rest)) => (
                h.parse::<u32>().map_err(|_| anyhow!("Invalid duration number: {}", h))?,
                rest,
            ),
            None => (0, input.as_str()),
        };
        let mins = match rest.strip_suffix('m') {
            Some(m) => m.parse::<u32>().map_err(|_| anyhow!("Invalid duration number: {}", m))?,
            None if rest.is_empty() => 0,
            None => return Err(anyhow!("Unknown duration unit in '{}'", input)),
        };
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(mins))
            .ok_or_else(|| anyhow!("Duration too large: {}", input))?
    };

    if minutes == 0 {
        return Err(anyhow!("Duration must be greater than zero"));
    }
    Ok(minutes)
}

/// Time of day: "09:00", "9:00" or "09:00:00".
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| anyhow!("Could not parse time: {}", input))
}

/// Calendar date relative to `today`.
///
/// Accepts `today`, `tomorrow`, `yesterday`, `+3d`, `+2w`, weekday names
/// (`fri`, `2:fri` for the one after next) and `YYYY-MM-DD`.
pub fn parse_human_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "tomorrow" | "tom" => return shift_days(today, 1),
        "yesterday" => return shift_days(today, -1),
        _ => {}
    }

    if let Some(relative) = input.strip_prefix('+') {
        if relative.len() < 2 {
            return Err(anyhow!("Invalid relative format: {}", input));
        }
        let (num_str, unit) = relative.split_at(relative.len() - 1);
        let count: i64 = num_str.parse().map_err(|_| anyhow!("Invalid relative format: {}", input))?;

        return match unit {
            "d" => shift_days(today, count),
            "w" => count
                .checked_mul(7)
                .ok_or_else(|| anyhow!("Date out of range: {}", input))
                .and_then(|days| shift_days(today, days)),
            _ => Err(anyhow!("Unknown unit in relative date: {}", unit)),
        };
    }

    if let Some((count, day_str)) = parse_weekday_token(input) {
        if let Ok(target) = parse_weekday_str(day_str) {
            let mut days_needed = target.num_days_from_sunday() as i64
                - today.weekday().num_days_from_sunday() as i64;
            if days_needed <= 0 {
                days_needed += 7;
            }
            let extra = (count - 1)
                .checked_mul(7)
                .and_then(|weeks| weeks.checked_add(days_needed))
                .ok_or_else(|| anyhow!("Date out of range: {}", input))?;
            return shift_days(today, extra);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn shift_days(today: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("Date out of range: {} days from {}", days, today))
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    match input.split_once(':') {
        Some((count, day)) => count.parse::<i64>().ok().filter(|c| *c > 0).map(|c| (c, day)),
        None => Some((1, input)),
    }
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // A Monday.
    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[rstest]
    #[case("today", "2025-03-10")]
    #[case("tom", "2025-03-11")]
    #[case("yesterday", "2025-03-09")]
    #[case("+3d", "2025-03-13")]
    #[case("+2w", "2025-03-24")]
    #[case("fri", "2025-03-14")]
    #[case("mon", "2025-03-17")]
    #[case("2:wed", "2025-03-19")]
    #[case("2025-12-01", "2025-12-01")]
    fn test_parse_human_date(#[case] input: &str, #[case] expected: &str) {
        let parsed = parse_human_date(input, anchor()).unwrap();
        assert_eq!(parsed.to_string(), expected);
    }

    #[rstest]
    #[case("+d")]
    #[case("+3y")]
    #[case("2025-13-01")]
    #[case("someday")]
    #[case("+9999999999d")]
    #[case("+9223372036854775807d")]
    #[case("+9999999999999999w")]
    #[case("9999999999999999:fri")]
    #[case("1000000000:mon")]
    fn test_parse_human_date_rejects(#[case] input: &str) {
        assert!(parse_human_date(input, anchor()).is_err());
    }

    #[rstest]
    #[case("90", 90)]
    #[case("45m", 45)]
    #[case("2h", 120)]
    #[case("1h30m", 90)]
    #[case(" 1H ", 60)]
    fn test_parse_duration_minutes(#[case] input: &str, #[case] expected: u32) {
        assert_eq!(parse_duration_minutes(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("0h0m")]
    #[case("3x")]
    #[case("h30")]
    fn test_parse_duration_rejects(#[case] input: &str) {
        assert!(parse_duration_minutes(input).is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("9:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_time("21:30:00").unwrap(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_parse_weekday_token() {
        assert_eq!(parse_weekday_token("fri"), Some((1, "fri")));
        assert_eq!(parse_weekday_token("2:fri"), Some((2, "fri")));
        assert_eq!(parse_weekday_token("0:fri"), None);
    }
}
