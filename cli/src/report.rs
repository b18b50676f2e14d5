use chrono::NaiveDate;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

use studyplan_core::calendar::weeks;
use studyplan_core::{
    weekday_name, Activity, ActivityRepository, CalendarCell, Notifier, StudyStore, YearMonth,
    WEEKDAY_LABELS,
};

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Min")]
    duration: u32,
    #[tabled(rename = "Done")]
    done: &'static str,
}

impl ActivityRow {
    fn from_activity(activity: &Activity) -> Self {
        Self {
            id: short_id(activity),
            date: activity.date.format("%Y-%m-%d (%a)").to_string(),
            time: activity.time.format("%H:%M").to_string(),
            subject: activity.subject.clone(),
            title: activity.title.clone(),
            duration: activity.duration,
            done: if activity.completed { "✔" } else { "☐" },
        }
    }
}

#[derive(Tabled)]
struct HoursRow {
    #[tabled(rename = "Day")]
    label: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

pub fn short_id(activity: &Activity) -> String {
    activity.id.to_string()[..8].to_string()
}

fn styled(mut table: Table) -> Table {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

pub fn print_activities(activities: &[&Activity]) {
    if activities.is_empty() {
        println!("No activities found.");
        return;
    }
    let rows: Vec<ActivityRow> = activities.iter().map(|a| ActivityRow::from_activity(a)).collect();
    println!("{}", styled(Table::new(rows)));
}

pub fn print_activity(activity: &Activity) {
    println!("{} (ID: {})", activity.title, activity.id);
    println!("  Subject:  {}", activity.subject);
    println!(
        "  When:     {} at {}",
        activity.date.format("%a %b %-d %Y"),
        activity.time.format("%H:%M")
    );
    println!("  Duration: {} min", activity.duration);
    if let Some(notes) = &activity.notes {
        println!("  Notes:    {}", notes);
    }
}

pub fn print_next(next: Option<&Activity>) {
    match next {
        Some(activity) => {
            println!("Next up:");
            print_activity(activity);
        }
        None => println!("Nothing planned. Add an activity with `studyplan add`."),
    }
}

pub fn print_calendar<R: ActivityRepository, N: Notifier>(
    store: &StudyStore<R, N>,
    month: YearMonth,
    today: NaiveDate,
) {
    println!("{:^28}", month.name());
    let header: Vec<String> = WEEKDAY_LABELS.iter().map(|l| format!("{:>4}", l)).collect();
    println!("{}", header.join(""));

    let grid = month.grid();
    for week in weeks(&grid) {
        let mut line = String::new();
        for cell in week {
            match cell {
                CalendarCell::Empty => line.push_str("    "),
                CalendarCell::Day(day) => {
                    let date = month.date_of(*day);
                    let busy = date.is_some_and(|d| !store.activities_for_date(d).is_empty());
                    let text = format!("{:>3}{}", day, if busy { '*' } else { ' ' });
                    if date == Some(today) {
                        line.push_str(&format!("\x1b[7m{}\x1b[0m", text));
                    } else {
                        line.push_str(&text);
                    }
                }
            }
        }
        println!("{}", line.trim_end());
    }
    println!("\n* has activities");
}

pub fn print_stats<R: ActivityRepository, N: Notifier>(store: &StudyStore<R, N>, today: NaiveDate) {
    let summary = store.summary();
    let weekly = store.weekly_stats();
    let best = store.best_study_day_of_week();

    println!("\x1b[1;36mOverview\x1b[0m");
    println!("  Total study time: {:.1}h", store.total_study_hours());
    println!("  Completion rate:  {:.0}%", store.completion_rate());
    println!(
        "  Activities:       {} total, {} completed, {} pending",
        summary.total, summary.completed, summary.pending
    );
    println!("  Best study day:   {} ({:.1}h)", weekday_name(best), weekly.get(best));

    println!("\n\x1b[1;36mLast 7 days\x1b[0m");
    let recent: Vec<HoursRow> = store
        .recent_daily_hours(today, 7)
        .into_iter()
        .map(|d| HoursRow {
            label: d.date.format("%Y-%m-%d (%a)").to_string(),
            hours: format!("{:.1}", d.hours),
        })
        .collect();
    println!("{}", styled(Table::new(recent)));

    println!("\n\x1b[1;36mBy weekday\x1b[0m");
    let by_day: Vec<HoursRow> = weekly
        .iter()
        .map(|(day, hours)| HoursRow {
            label: weekday_name(day).to_string(),
            hours: format!("{:.1}", hours),
        })
        .collect();
    println!("{}", styled(Table::new(by_day)));
}
