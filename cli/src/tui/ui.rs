use chrono::Datelike;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use studyplan_core::calendar::weeks;
use studyplan_core::{weekday_name, ActivityRepository, CalendarCell, Severity, WEEKDAY_LABELS};
use unicode_width::UnicodeWidthChar;

use crate::tui::app::App;

pub fn draw<R: ActivityRepository>(f: &mut Frame, app: &mut App<R>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(size);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("STUDYPLAN  ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(" < ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.month.name(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" > ", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(30)])
        .split(main_chunks[1]);

    draw_month(f, app, content_chunks[0]);
    draw_day(f, app, content_chunks[1]);
    draw_status(f, app, main_chunks[2]);

    let footer = Paragraph::new(
        "←↓↑→/hjkl: Day | n/p: Month | t: Today | Tab: Select | Space: Done | r: Reload | q: Quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn draw_month<R: ActivityRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let grid = app.month.grid();
    let rows: Vec<Row> = weeks(&grid)
        .into_iter()
        .map(|week| {
            let cells: Vec<Cell> = week
                .iter()
                .map(|cell| match cell {
                    CalendarCell::Empty => Cell::from(""),
                    CalendarCell::Day(day) => {
                        let Some(date) = app.month.date_of(*day) else {
                            return Cell::from("");
                        };
                        let planned = app.store.activities_for_date(date);
                        let mark = if planned.is_empty() { " " } else { "•" };

                        let mut style = Style::default();
                        if !planned.is_empty() {
                            let all_done = planned.iter().all(|a| a.completed);
                            style = style.fg(if all_done { Color::Green } else { Color::Yellow });
                        }
                        if date == app.today {
                            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                        }
                        if date == app.cursor {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Cell::from(format!("{:>2}{}", day, mark)).style(style)
                    }
                })
                .collect();
            Row::new(cells).height(2)
        })
        .collect();

    let widths = [Constraint::Length(4); 7];
    let table = Table::new(rows, widths)
        .header(Row::new(WEEKDAY_LABELS.to_vec()).style(Style::default().fg(Color::Yellow)))
        .block(Block::default().title(" Calendar ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(table, area);
}

fn draw_day<R: ActivityRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = format!(" {} {} ", weekday_name(app.cursor.weekday()), app.cursor.format("%Y-%m-%d"));
    let title_width = chunks[0].width.saturating_sub(24) as usize;

    let rows: Vec<Row> = app
        .day_activities()
        .into_iter()
        .map(|activity| {
            let icon = if activity.completed { "✔" } else { "☐" };
            let title_style = if activity.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Row::new(vec![
                Cell::from(icon),
                Cell::from(activity.time.format("%H:%M").to_string()),
                Cell::from(truncate(&activity.subject, 10)),
                Cell::from(Span::styled(truncate(&activity.title, title_width), title_style)),
            ])
        })
        .collect();

    let empty = rows.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(11),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["", "Time", "Subject", "Title"]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().title(title.clone()).borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    if empty {
        let placeholder = Paragraph::new("No activities on this day.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            );
        f.render_widget(placeholder, chunks[0]);
    } else {
        f.render_stateful_widget(table, chunks[0], &mut app.state);
    }

    draw_detail(f, app, chunks[1]);
}

fn draw_detail<R: ActivityRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL).border_type(BorderType::Rounded);
    let Some(activity) = app.selected_activity() else {
        f.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::Blue);
    let mut text = vec![
        Line::from(vec![
            Span::styled("Title: ", label),
            Span::styled(activity.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![Span::styled("Subject: ", label), Span::raw(activity.subject.as_str())]),
        Line::from(vec![
            Span::styled("Duration: ", label),
            Span::raw(format!("{} min", activity.duration)),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::raw(match activity.completed_at {
                Some(at) => format!("Done {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")),
                None => "Planned".to_string(),
            }),
        ]),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(activity.id.to_string()),
        ]),
    ];

    if let Some(notes) = &activity.notes {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled("Notes:", label)));
        text.push(Line::from(notes.as_str()));
    }

    let detail = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_status<R: ActivityRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let line = match app.status.current() {
        Some(notice) => {
            let color = match notice.severity {
                Severity::Normal => Color::Green,
                Severity::Destructive => Color::Red,
            };
            Line::from(vec![
                Span::styled(format!("{}: ", notice.title), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(notice.description),
            ])
        }
        None => {
            let next = match app.store.next_activity() {
                Some(a) => format!("{} {} {}", a.date.format("%a %b %-d"), a.time.format("%H:%M"), a.title),
                None => "nothing planned".to_string(),
            };
            Line::from(vec![
                Span::styled("Studied ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{:.1}h", app.store.total_study_hours())),
                Span::styled(" | Done ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{:.0}%", app.store.completion_rate())),
                Span::styled(" | Next ", Style::default().fg(Color::DarkGray)),
                Span::raw(next),
            ])
        }
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with '…'.
fn truncate(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate_counts_columns() {
        assert_eq!(truncate("Algebra", 10), "Algebra");
        assert_eq!(truncate("Thermodynamics", 8), "Thermod…");
        assert_eq!(truncate("日本語の勉強", 7), "日本語…");
    }
}
