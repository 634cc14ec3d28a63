use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use statusview_core::view::{RowView, TableView, NO_PROJECTS_HINT};

use super::{badge_line, dim, progress_line};

pub struct ProjectTable {
    view: TableView,
    table_state: TableState,
}

impl ProjectTable {
    pub fn new(view: TableView) -> Self {
        let mut table_state = TableState::default();
        if !view.rows.is_empty() {
            table_state.select(Some(0));
        }
        Self { view, table_state }
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    /// Swaps in a rebuilt view, keeping the cursor on the same project when
    /// it is still present.
    pub fn replace(&mut self, view: TableView) {
        let selected = self.selected_row().map(|r| r.project_number.clone());
        let previous_index = self.table_state.selected().unwrap_or(0);
        self.view = view;
        if self.view.rows.is_empty() {
            self.table_state.select(None);
            return;
        }
        let found = selected.is_some_and(|number| self.select_project(&number));
        if !found {
            let index = previous_index.min(self.view.rows.len() - 1);
            self.table_state.select(Some(index));
        }
    }

    pub fn selected_row(&self) -> Option<&RowView> {
        let idx = self.table_state.selected()?;
        self.view.rows.get(idx)
    }

    /// Moves the cursor to `project_number`. Returns `false` if no row has it.
    pub fn select_project(&mut self, project_number: &str) -> bool {
        match self
            .view
            .rows
            .iter()
            .position(|r| r.project_number == project_number)
        {
            Some(idx) => {
                self.table_state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.view.rows.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.table_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.table_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.table_state.select(Some(0)),
            KeyCode::Char('G') | KeyCode::End => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" {} ", self.view.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if let Some(message) = self.view.empty_message {
            let text = vec![
                Line::from(Span::styled(message, Style::default().bold())),
                Line::from(Span::styled(NO_PROJECTS_HINT, dim())),
            ];
            let paragraph = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(vec![
            "", "Project", "Name", "Manager", "Dates", "Status", "Overall", "Cost", "Scope",
            "Schedule", "Resources", "Complete", "Effort",
        ])
        .style(Style::default().bold().fg(Color::Yellow));

        let rows: Vec<Row> = self.view.rows.iter().map(project_row).collect();
        let widths = [
            Constraint::Length(2),
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(25),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn project_row(row: &RowView) -> Row<'static> {
    let marker = match (row.expandable, row.expanded) {
        (true, true) => Span::styled("▾", Style::default().fg(Color::Cyan)),
        (true, false) => Span::raw("▸"),
        (false, _) => Span::styled("+", dim()),
    };
    let name = match &row.company {
        Some(company) => Line::from(vec![
            Span::raw(row.project_name.clone()),
            Span::styled(format!(" ({company})"), dim()),
        ]),
        None => Line::from(row.project_name.clone()),
    };
    let manager = row
        .manager
        .as_ref()
        .map(|m| m.name.clone())
        .unwrap_or_default();

    Row::new(vec![
        Cell::from(marker),
        Cell::from(row.project_number.clone()),
        Cell::from(name),
        Cell::from(manager),
        Cell::from(row.date_range.clone().unwrap_or_default()),
        Cell::from(row.status_date.clone()),
        Cell::from(badge_line(row.overall_health.status.as_ref())),
        Cell::from(badge_line(row.cost.status.as_ref())),
        Cell::from(badge_line(row.scope.status.as_ref())),
        Cell::from(badge_line(row.schedule.status.as_ref())),
        Cell::from(badge_line(row.resources.status.as_ref())),
        Cell::from(progress_line(row.percent_complete.as_ref(), 8)),
        Cell::from(progress_line(row.effort_utilized.as_ref(), 8)),
    ])
}
