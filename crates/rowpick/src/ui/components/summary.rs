//! Selection summary component.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Aggregated counts displayed beside the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub total_rows: usize,
    pub visible_rows: usize,
    pub selected_total: usize,
    pub selected_on_page: usize,
    pub page: usize,
    pub page_count: usize,
    pub anchor: Option<String>,
}

/// Displays selection statistics for the current view.
#[derive(Debug, Default)]
pub struct Summary {
    latest: Option<SelectionSummary>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored summary with fresh counts.
    pub fn update(&mut self, summary: SelectionSummary) {
        self.latest = Some(summary);
    }

    /// Render the summary inside the provided area.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title("Selection").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let Some(summary) = &self.latest else {
            let placeholder = Paragraph::new("No data loaded")
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        };

        let mut lines = vec![
            count_line("Rows", summary.total_rows.to_string()),
            count_line("Visible", summary.visible_rows.to_string()),
            count_line("Selected", summary.selected_total.to_string()),
            count_line("On page", summary.selected_on_page.to_string()),
            count_line(
                "Page",
                format!("{}/{}", summary.page + 1, summary.page_count),
            ),
        ];
        if let Some(anchor) = &summary.anchor {
            lines.push(count_line("Anchor", anchor.clone()));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
}

fn count_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::Cyan)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn renders_placeholder_and_counts() {
        let backend = TestBackend::new(30, 12);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut summary = Summary::new();
        terminal
            .draw(|frame| summary.render(frame, frame.size()))
            .unwrap();

        summary.update(SelectionSummary {
            total_rows: 10,
            visible_rows: 6,
            selected_total: 3,
            selected_on_page: 2,
            page: 0,
            page_count: 2,
            anchor: Some("api".into()),
        });
        terminal
            .draw(|frame| summary.render(frame, frame.size()))
            .unwrap();
    }
}
