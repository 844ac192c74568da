//! Data table component and view state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::selection::{CheckState, SelectionState};
use crate::domain::model::{Dataset, TableRow};

/// Maintains the navigable view over a dataset: filtering, pagination, and
/// the cursor within the current page.
#[derive(Debug, Default, Clone)]
pub struct DataTableState {
    name: String,
    headers: Vec<String>,
    rows: Vec<TableRow>,
    visible: Vec<TableRow>,
    cursor: usize,
    page: usize,
    page_size: usize,
    filter: String,
    filter_active: bool,
    viewport: Option<Rect>,
}

impl DataTableState {
    /// Construct view state from a loaded dataset.
    pub fn from_dataset(dataset: &Dataset, page_size: usize) -> Self {
        let mut state = Self {
            name: dataset.name.clone(),
            headers: dataset.headers.clone(),
            rows: dataset.rows.clone(),
            visible: Vec::new(),
            cursor: 0,
            page: 0,
            page_size: page_size.max(1),
            filter: String::new(),
            filter_active: false,
            viewport: None,
        };
        state.refresh_visible();
        state
    }

    /// Rows of the current page, in source order. This is the sequence range
    /// gestures resolve against.
    pub fn page_rows(&self) -> &[TableRow] {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.visible.len());
        if start >= end {
            return &[];
        }
        &self.visible[start..end]
    }

    /// Every row that survives the filter, across all pages.
    pub fn all_rows(&self) -> &[TableRow] {
        &self.visible
    }

    /// Row under the cursor, if the page is non-empty.
    pub fn current_row(&self) -> Option<&TableRow> {
        self.page_rows().get(self.cursor)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_rows(&self) -> usize {
        self.visible.len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.page_size.max(1)).max(1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advance the cursor, spilling onto the next page at the boundary.
    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.page_rows().len() {
            self.cursor += 1;
        } else if self.page + 1 < self.page_count() {
            self.page += 1;
            self.cursor = 0;
        }
    }

    /// Move the cursor back, spilling onto the previous page at the boundary.
    pub fn select_previous(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.page > 0 {
            self.page -= 1;
            self.cursor = self.page_rows().len().saturating_sub(1);
        }
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.clamp_cursor();
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.clamp_cursor();
        }
    }

    /// Jump to a page, clamping to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
        self.clamp_cursor();
    }

    /// Activate incremental filter editing.
    pub fn begin_filter(&mut self) {
        self.filter_active = true;
    }

    /// Deactivate the filter editing mode.
    pub fn end_filter(&mut self) {
        self.filter_active = false;
    }

    /// Whether filter mode is currently active.
    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    /// Append a character to the filter string and refresh visibility.
    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.refresh_visible();
    }

    /// Remove the most recent filter character.
    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refresh_visible();
    }

    /// Clear the active filter.
    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.refresh_visible();
        }
    }

    /// Replace the filter contents.
    pub fn set_filter<S: Into<String>>(&mut self, pattern: S) {
        self.filter = pattern.into();
        self.refresh_visible();
    }

    /// Retrieve the active filter string.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Map a terminal row from a mouse event to an index into the current
    /// page, using the viewport recorded during the last render.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let viewport = self.viewport?;
        if column < viewport.x || column >= viewport.x + viewport.width {
            return None;
        }
        // First viewport line is the header row.
        let data_top = viewport.y + 1;
        if row < data_top {
            return None;
        }
        let index = (row - data_top) as usize;
        if index < self.page_rows().len() {
            Some(index)
        } else {
            None
        }
    }

    /// Move the cursor to an index within the current page.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.page_rows().len().saturating_sub(1));
    }

    fn refresh_visible(&mut self) {
        let needle = self.filter.to_ascii_lowercase();
        self.visible = self
            .rows
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row
                        .cells
                        .iter()
                        .any(|cell| cell.to_ascii_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        if self.page >= self.page_count() {
            self.page = self.page_count() - 1;
        }
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let len = self.page_rows().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn record_viewport(&mut self, area: Rect) {
        self.viewport = Some(area);
    }
}

/// Ratatui component responsible for rendering the data table.
#[derive(Debug, Default)]
pub struct DataTable;

impl DataTable {
    /// Render the table into the provided area, recording the data viewport
    /// on the state for mouse hit-testing.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &mut DataTableState,
        selection: &SelectionState,
        zebra_stripes: bool,
    ) {
        let title = format!(
            "{} · page {}/{}",
            state.name(),
            state.page() + 1,
            state.page_count()
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        self.render_filter_line(frame, layout[0], state);
        state.record_viewport(layout[1]);

        if state.page_rows().is_empty() {
            let placeholder = Paragraph::new("No rows match filter").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, layout[1]);
            return;
        }

        let header_mark = match selection.check_state(state.page_rows()) {
            CheckState::All => "[x]",
            CheckState::Some => "[~]",
            CheckState::None => "[ ]",
        };
        let mut header_cells = vec![Cell::from(header_mark)];
        header_cells.extend(
            state
                .headers
                .iter()
                .map(|header| Cell::from(Span::styled(header.clone(), Style::default().fg(Color::Yellow)))),
        );
        let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

        let mut table_rows = Vec::with_capacity(state.page_rows().len());
        for (index, row) in state.page_rows().iter().enumerate() {
            let mark = if selection.is_selected(&row.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let mut cells = vec![Cell::from(mark)];
            cells.extend(row.cells.iter().map(|cell| Cell::from(cell.clone())));

            let mut style = Style::default();
            if selection.is_selected(&row.id) {
                style = style.fg(Color::Cyan);
            }
            if zebra_stripes && index % 2 == 1 {
                style = style.bg(Color::Rgb(24, 24, 24));
            }
            table_rows.push(Row::new(cells).style(style));
        }

        let mut widths = vec![Constraint::Length(3)];
        widths.extend(state.headers.iter().map(|_| Constraint::Min(8)));

        let table = Table::new(table_rows, widths)
            .header(header)
            .column_spacing(1)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );

        let mut table_state = TableState::default();
        table_state.select(Some(state.cursor));
        frame.render_stateful_widget(table, layout[1], &mut table_state);
    }

    fn render_filter_line(&self, frame: &mut Frame<'_>, area: Rect, state: &DataTableState) {
        let filter_text = if state.filter().is_empty() {
            "⌕ filter (press /)".to_string()
        } else {
            format!("⌕ {}", state.filter())
        };

        let mut filter_style = Style::default().fg(Color::Gray);
        if state.is_filter_active() {
            filter_style = filter_style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
        }

        frame.render_widget(Paragraph::new(Line::from(filter_text)).style(filter_style), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn sample_dataset(count: usize) -> Dataset {
        Dataset {
            name: "sample".into(),
            headers: vec!["name".into(), "env".into()],
            rows: (1..=count)
                .map(|n| {
                    let env = if n % 2 == 0 { "prod" } else { "dev" };
                    TableRow::new(n.to_string(), vec![format!("svc-{n}"), env.to_string()])
                })
                .collect(),
        }
    }

    #[test]
    fn pagination_slices_rows() {
        let state = DataTableState::from_dataset(&sample_dataset(7), 3);
        assert_eq!(state.page_count(), 3);
        assert_eq!(state.page_rows().len(), 3);

        let mut state = state;
        state.set_page(2);
        assert_eq!(state.page_rows().len(), 1);
        assert_eq!(state.page_rows()[0].id, "7");
    }

    #[test]
    fn cursor_spills_across_page_boundaries() {
        let mut state = DataTableState::from_dataset(&sample_dataset(4), 3);
        for _ in 0..3 {
            state.select_next();
        }
        assert_eq!(state.page(), 1);
        assert_eq!(state.current_row().unwrap().id, "4");

        state.select_previous();
        assert_eq!(state.page(), 0);
        assert_eq!(state.current_row().unwrap().id, "3");
    }

    #[test]
    fn filter_narrows_visible_rows_and_resets_paging() {
        let mut state = DataTableState::from_dataset(&sample_dataset(10), 3);
        state.set_page(3);
        state.set_filter("prod");
        assert_eq!(state.visible_rows(), 5);
        assert!(state.page() < state.page_count());
        state.clear_filter();
        assert_eq!(state.visible_rows(), 10);
    }

    #[test]
    fn row_hit_testing_uses_recorded_viewport() {
        let mut state = DataTableState::from_dataset(&sample_dataset(5), 10);
        state.record_viewport(Rect::new(1, 2, 40, 10));

        // Header occupies the first viewport line (y == 2); data starts at 3.
        assert_eq!(state.row_at(5, 2), None);
        assert_eq!(state.row_at(5, 3), Some(0));
        assert_eq!(state.row_at(5, 7), Some(4));
        assert_eq!(state.row_at(5, 8), None);
        assert_eq!(state.row_at(0, 3), None);
    }

    #[test]
    fn renders_without_panicking() {
        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut state = DataTableState::from_dataset(&sample_dataset(5), 3);
        let selection = SelectionState::new();
        let component = DataTable;

        terminal
            .draw(|frame| {
                let area = frame.size();
                component.render(frame, area, &mut state, &selection, true);
            })
            .unwrap();
        assert!(state.row_at(2, 3).is_some());
    }
}
