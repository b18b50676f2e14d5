use std::{io, time::Duration as PollInterval};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Gauge, Padding, Paragraph},
};
use studyplan_core::{weekday_name, ActivityRepository, DailyHours, Notifier, StudyStore};

const WINDOW_DAYS: u32 = 7;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    hours: Color,
    done: Color,
    pending: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    hours: Color::Blue,
    done: Color::Green,
    pending: Color::Yellow,
};

/// Which seven-day window the chart shows. The window never runs past today.
pub struct StatsApp {
    pub window_end: NaiveDate,
    pub today: NaiveDate,
}

impl StatsApp {
    pub fn new(today: NaiveDate) -> Self {
        Self { window_end: today, today }
    }

    pub fn next_week(&mut self) {
        self.window_end = (self.window_end + Duration::days(WINDOW_DAYS as i64)).min(self.today);
    }

    pub fn previous_week(&mut self) {
        self.window_end -= Duration::days(WINDOW_DAYS as i64);
    }

    pub fn window_start(&self) -> NaiveDate {
        self.window_end - Duration::days(WINDOW_DAYS as i64 - 1)
    }

    pub fn at_latest(&self) -> bool {
        self.window_end >= self.today
    }
}

pub fn run<R, N>(store: &StudyStore<R, N>, today: NaiveDate) -> Result<()>
where
    R: ActivityRepository,
    N: Notifier,
{
    if store.activities().is_empty() {
        println!("No activities yet. Add one with `studyplan add`.");
        return Ok(());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = StatsApp::new(today);

    loop {
        terminal.draw(|f| ui(f, &app, store))?;

        if event::poll(PollInterval::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('h') => app.previous_week(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_week(),
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui<R: ActivityRepository, N: Notifier>(frame: &mut Frame, app: &StatsApp, store: &StudyStore<R, N>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    // --- Header ---
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(1), Constraint::Length(34)])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled(
        "STUDY STATS",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let range = format!(
        " {} - {} ",
        app.window_start().format("%b %-d"),
        app.window_end.format("%b %-d %Y")
    );
    let nav_text = Line::from(vec![
        Span::styled(" < ", Style::default().fg(THEME.text)),
        Span::styled(range, Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::styled(
            " > ",
            Style::default().fg(if app.at_latest() { THEME.muted } else { THEME.text }),
        ),
    ]);
    let nav = Paragraph::new(nav_text)
        .alignment(Alignment::Right)
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    frame.render_widget(
        Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(THEME.muted)),
        main_layout[0],
    );

    // --- Content ---
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70),
            Constraint::Length(1),
            Constraint::Percentage(30),
        ])
        .split(main_layout[1]);

    let days = store.recent_daily_hours(app.window_end, WINDOW_DAYS);
    draw_chart(frame, &days, content_chunks[0]);
    draw_info_panel(frame, store, content_chunks[2]);

    // --- Footer ---
    let help = Line::from(vec![
        Span::styled("WEEK: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), main_layout[2]);
}

/// Bar heights in tenths of an hour.
fn bar_value(hours: f64) -> u64 {
    (hours * 10.0).round() as u64
}

fn draw_chart(frame: &mut Frame, days: &[DailyHours], area: Rect) {
    let bars: Vec<Bar> = days
        .iter()
        .map(|day| {
            let value = bar_value(day.hours);
            Bar::default()
                .label(day.date.format("%a %-d").to_string())
                .value(value)
                .style(Style::default().fg(THEME.hours))
                .text_value(if value > 0 { format!("{:.1}", day.hours) } else { String::new() })
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted))
                .title(" Hours per day "),
        )
        .bar_width(7)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_info_panel<R: ActivityRepository, N: Notifier>(frame: &mut Frame, store: &StudyStore<R, N>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let summary = store.summary();
    let best = store.best_study_day_of_week();
    let best_hours = store.weekly_stats().get(best);

    let info_text = vec![
        Line::from(Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Studied:   ", Style::default().fg(THEME.muted)),
            Span::styled(
                format!("{:.1}h", store.total_study_hours()),
                Style::default().fg(THEME.hours).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Best day:  ", Style::default().fg(THEME.muted)),
            Span::styled(
                format!("{} ({:.1}h)", weekday_name(best), best_hours),
                Style::default().fg(THEME.text),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total:     ", Style::default().fg(THEME.muted)),
            Span::styled(summary.total.to_string(), Style::default().fg(THEME.text)),
        ]),
        Line::from(vec![
            Span::styled("Completed: ", Style::default().fg(THEME.muted)),
            Span::styled(summary.completed.to_string(), Style::default().fg(THEME.done)),
        ]),
        Line::from(vec![
            Span::styled("Pending:   ", Style::default().fg(THEME.muted)),
            Span::styled(summary.pending.to_string(), Style::default().fg(THEME.pending)),
        ]),
    ];

    let info = Paragraph::new(info_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(" Summary "),
    );
    frame.render_widget(info, chunks[0]);

    let rate = store.completion_rate();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Completion ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        )
        .gauge_style(Style::default().fg(THEME.done))
        .ratio((rate / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", rate));
    frame.render_widget(gauge, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_stops_at_today() {
        let mut app = StatsApp::new(day("2025-03-10"));
        assert_eq!(app.window_start(), day("2025-03-04"));
        assert!(app.at_latest());

        app.previous_week();
        app.previous_week();
        assert_eq!(app.window_end, day("2025-02-24"));
        assert!(!app.at_latest());

        app.next_week();
        app.next_week();
        app.next_week();
        assert_eq!(app.window_end, day("2025-03-10"));
    }

    #[test]
    fn test_bar_value_in_tenths() {
        assert_eq!(bar_value(0.0), 0);
        assert_eq!(bar_value(1.5), 15);
        assert_eq!(bar_value(0.25), 3);
    }
}
