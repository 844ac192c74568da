//! Application loop for the TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::dataset::{self, LoadOptions};
use crate::app::export::{ExportOptions, Exporter};
use crate::app::selection::SelectionState;
use crate::app::session::{SessionSnapshot, SessionStore};
use crate::domain::model::Dataset;
use crate::infra::config::Config;
use crate::ui::components::summary::{SelectionSummary, Summary};
use crate::ui::components::table::{DataTable, DataTableState};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Launch parameters resolved from the command line.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub file: PathBuf,
    pub load: LoadOptions,
    pub page_size: Option<usize>,
    pub use_session: bool,
}

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    options: LaunchOptions,
    config: Config,
    dataset: Dataset,
    table: DataTableState,
    table_component: DataTable,
    selection: SelectionState,
    summary_component: Summary,
    session_store: SessionStore,
    exporter: Exporter,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(options: LaunchOptions) -> Self {
        Self {
            options,
            config: Config::default(),
            dataset: Dataset::default(),
            table: DataTableState::default(),
            table_component: DataTable,
            selection: SelectionState::new(),
            summary_component: Summary::new(),
            session_store: SessionStore::new(PathBuf::from(".")),
            exporter: Exporter::new(),
            status: None,
            should_quit: false,
        }
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        self.bootstrap()?;

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn bootstrap(&mut self) -> Result<()> {
        self.config = Config::load()?;
        self.dataset = dataset::load_csv_path(&self.options.file, &self.options.load)?;

        let page_size = self
            .options
            .page_size
            .unwrap_or(self.config.defaults.page_size);
        self.table = DataTableState::from_dataset(&self.dataset, page_size);

        let root = std::env::current_dir().context("unable to determine working directory")?;
        self.session_store = SessionStore::new(root);

        if self.options.use_session
            && let Some(snapshot) = self.session_store.load()?
        {
            self.restore_session(snapshot);
        }

        self.refresh_summary();
        Ok(())
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(28)])
            .split(layout[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(6)])
            .split(main_chunks[1]);

        self.table_component.render(
            frame,
            main_chunks[0],
            &mut self.table,
            &self.selection,
            self.config.defaults.zebra_stripes,
        );

        self.summary_component.render(frame, right_chunks[0]);

        let hints = Paragraph::new(Line::from(vec![
            Span::styled("j/k", Style::default().fg(Color::Cyan)),
            Span::raw(" move "),
            Span::styled("space", Style::default().fg(Color::Cyan)),
            Span::raw(" toggle · "),
            Span::styled("⇧space", Style::default().fg(Color::Cyan)),
            Span::raw(" extend · "),
            Span::styled("a/A", Style::default().fg(Color::Cyan)),
            Span::raw(" page/all · "),
            Span::styled("h/l", Style::default().fg(Color::Cyan)),
            Span::raw(" pages · "),
            Span::styled("/", Style::default().fg(Color::Cyan)),
            Span::raw(" filter · "),
            Span::styled("ctrl+e", Style::default().fg(Color::Cyan)),
            Span::raw(" export"),
        ]))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, right_chunks[1]);

        self.render_status(frame, layout[1]);
    }

    fn render_status(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = message.unwrap_or_else(|| {
            Line::styled(
                "Ready · click or space to select, hold shift for ranges",
                Style::default().fg(Color::DarkGray),
            )
        });
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Mouse(mouse) => self.handle_mouse_event(mouse)?,
            Event::Resize(..) => {}
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Ok(());
                }
                KeyCode::Char('s') => {
                    self.save_session()?;
                    return Ok(());
                }
                KeyCode::Char('e') => {
                    self.perform_export()?;
                    return Ok(());
                }
                _ => {}
            }
        }

        if self.table.is_filter_active() {
            return self.handle_filter_input(key);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('/') => {
                self.table.begin_filter();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.table.select_next();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.table.select_previous();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.table.previous_page();
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.table.next_page();
            }
            KeyCode::Char(' ') => {
                self.act_on_current(key.modifiers.contains(KeyModifiers::SHIFT));
            }
            KeyCode::Char('a') => {
                self.selection.toggle_rows(self.table.page_rows());
                self.refresh_summary();
            }
            // The shift chord on the header control spans every row, not
            // just the rendered page.
            KeyCode::Char('A') => {
                self.selection.toggle_rows(self.table.all_rows());
                self.refresh_summary();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.table.row_at(mouse.column, mouse.row) {
                    self.table.set_cursor(index);
                    self.act_on_current(mouse.modifiers.contains(KeyModifiers::SHIFT));
                }
            }
            MouseEventKind::ScrollDown => self.table.select_next(),
            MouseEventKind::ScrollUp => self.table.select_previous(),
            _ => {}
        }
        Ok(())
    }

    /// Toggle the row under the cursor, or extend the anchor's state across
    /// the range when the shift modifier is held.
    fn act_on_current(&mut self, extend: bool) {
        let Some(row) = self.table.current_row().cloned() else {
            return;
        };
        if extend {
            self.selection.extend_to(self.table.page_rows(), &row);
        } else {
            self.selection.toggle(&row);
        }
        self.refresh_summary();
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.table.end_filter();
            }
            KeyCode::Backspace => {
                self.table.pop_filter_char();
            }
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.table.push_filter_char(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn perform_export(&mut self) -> Result<()> {
        if self.selection.is_empty() {
            self.set_status(StatusLevel::Error, "No rows selected");
            return Ok(());
        }

        let options = ExportOptions::from_config(&self.config)?;
        let path = self
            .exporter
            .export(&self.dataset, &self.selection, &options)?;
        self.set_status(
            StatusLevel::Success,
            format!("Exported selection to {}", path.display()),
        );
        Ok(())
    }

    fn save_session(&mut self) -> Result<()> {
        let mut selected: Vec<String> =
            self.selection.selected_ids().map(str::to_owned).collect();
        selected.sort();

        let snapshot = SessionSnapshot {
            dataset: self.dataset.name.clone(),
            selected,
            anchor: self.selection.anchor().map(str::to_owned),
            filter: if self.table.filter().is_empty() {
                None
            } else {
                Some(self.table.filter().to_owned())
            },
            page: self.table.page(),
        };
        self.session_store.save(&snapshot)?;
        self.set_status(StatusLevel::Success, "Session saved");
        Ok(())
    }

    fn restore_session(&mut self, snapshot: SessionSnapshot) {
        if snapshot.dataset != self.dataset.name {
            tracing::debug!(
                stored = snapshot.dataset,
                current = self.dataset.name,
                "ignoring session for another dataset"
            );
            return;
        }
        self.selection.restore(snapshot.selected, snapshot.anchor);
        if let Some(filter) = snapshot.filter {
            self.table.set_filter(filter);
        }
        self.table.set_page(snapshot.page);
        self.set_status(StatusLevel::Info, "Session restored");
    }

    fn refresh_summary(&mut self) {
        let page_rows = self.table.page_rows();
        self.summary_component.update(SelectionSummary {
            total_rows: self.table.total_rows(),
            visible_rows: self.table.visible_rows(),
            selected_total: self.selection.len(),
            selected_on_page: self.selection.count_selected(page_rows),
            page: self.table.page(),
            page_count: self.table.page_count(),
            anchor: self.selection.anchor().map(str::to_owned),
        });
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::model::TableRow;

    fn sample_rows() -> Vec<TableRow> {
        ["a", "b", "c", "d"]
            .iter()
            .map(|id| TableRow::new(*id, vec![id.to_string()]))
            .collect()
    }

    #[test]
    fn shift_act_extends_from_anchor() {
        let dataset = Dataset {
            name: "t".into(),
            headers: vec!["id".into()],
            rows: sample_rows(),
        };
        let mut app = UiApp::new(LaunchOptions {
            file: PathBuf::from("unused.csv"),
            load: LoadOptions::default(),
            page_size: None,
            use_session: false,
        });
        app.dataset = dataset.clone();
        app.table = DataTableState::from_dataset(&dataset, 10);

        app.act_on_current(false); // toggle a, anchor = a
        app.table.set_cursor(2);
        app.act_on_current(true); // extend a..c

        for id in ["a", "b", "c"] {
            assert!(app.selection.is_selected(id));
        }
        assert!(!app.selection.is_selected("d"));
        assert_eq!(app.selection.anchor(), Some("c"));
    }
}
