pub mod app;
pub mod ui;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use studyplan_core::{ActivityRepository, Notice, Notifier, StudyStore, TracingNotifier};

use crate::tui::app::App;

/// Keeps the latest notice for the status bar and logs every notice.
#[derive(Clone, Default)]
pub struct StatusLine {
    last: Rc<RefCell<Option<Notice>>>,
}

impl StatusLine {
    pub fn current(&self) -> Option<Notice> {
        self.last.borrow().clone()
    }

    pub fn clear(&self) {
        self.last.borrow_mut().take();
    }
}

impl Notifier for StatusLine {
    fn notify(&self, notice: Notice) {
        TracingNotifier.notify(notice.clone());
        *self.last.borrow_mut() = Some(notice);
    }
}

pub fn run<R: ActivityRepository>(
    store: StudyStore<R, StatusLine>,
    status: StatusLine,
    today: NaiveDate,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, status, today);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend, R: ActivityRepository>(
    terminal: &mut Terminal<B>,
    app: &mut App<R>,
) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Left | KeyCode::Char('h') => app.move_days(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.move_days(1),
                    KeyCode::Up | KeyCode::Char('k') => app.move_days(-7),
                    KeyCode::Down | KeyCode::Char('j') => app.move_days(7),
                    KeyCode::Char('p') | KeyCode::PageUp => app.previous_month(),
                    KeyCode::Char('n') | KeyCode::PageDown => app.next_month(),
                    KeyCode::Char('t') => app.jump_to_today(),
                    KeyCode::Tab => app.select_next_activity(),
                    KeyCode::BackTab => app.select_previous_activity(),
                    KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
                    KeyCode::Char('r') => app.refresh(),
                    _ => {}
                }
            }
        }
    }
}
