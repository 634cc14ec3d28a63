use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde_json::Value;
use statusview_core::lifecycle::{
    filter_toggle, load_props_file, HostLifecycle, ToggleEvent, ViewerLifecycle, PROJECTS_DATA,
};
use statusview_core::view::{
    DetailsView, ModalView, RowView, TabContent, MODAL_CANCEL_LABEL, MODAL_CHECKLIST, MODAL_CHECKLIST_INTRO,
    MODAL_CONFIRM_LABEL, MODAL_INTRO, MODAL_TITLE,
};
use statusview_core::{build_table, ClickOrigin, Effect, TabId, TableView, UiEvent, ViewerState};
use tracing::{info, warn};

use crate::components::detail_tabs;
use crate::components::project_table::ProjectTable;
use crate::config::{absolute_url, ViewerConfig};

/// What the app is currently doing. Derived from the viewer state, so it can
/// never disagree with the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Table navigation
    Normal,
    /// "Create status report" confirmation dialog
    CreateModal { project_sys_id: String },
}

pub struct App {
    lifecycle: ViewerLifecycle,
    state: ViewerState,
    table: ProjectTable,
    status_message: Option<String>,
    /// Highlighted child row in the expanded accordion.
    item_cursor: usize,
    /// Set by handle_key when a link should be opened.
    /// The event loop takes it and runs the configured opener.
    pub open_request: Option<String>,
    data_path: Option<PathBuf>,
    instance_url: String,
}

impl App {
    /// Builds the app from the host's initial properties.
    pub fn new(initial_props: &Value) -> Self {
        let lifecycle = ViewerLifecycle;
        let state = lifecycle.on_init(initial_props);
        let table = ProjectTable::new(build_table(&state));
        Self {
            lifecycle,
            state,
            table,
            status_message: None,
            item_cursor: 0,
            open_request: None,
            data_path: None,
            instance_url: String::new(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        let props = load_props_file(&config.data)
            .with_context(|| format!("failed to load {}", config.data.display()))?;
        let mut app = Self::new(&props);
        app.data_path = Some(config.data.clone());
        app.instance_url = config.instance_url.clone();
        Ok(app)
    }

    pub fn with_data_path(mut self, path: impl AsRef<Path>) -> Self {
        self.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_instance_url(mut self, url: impl Into<String>) -> Self {
        self.instance_url = url.into();
        self
    }

    pub fn mode(&self) -> Mode {
        let modal = &self.state.create_sr_modal;
        match (&modal.project_sys_id, modal.open) {
            (Some(id), true) => Mode::CreateModal {
                project_sys_id: id.clone(),
            },
            _ => Mode::Normal,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn view(&self) -> &TableView {
        self.table.view()
    }

    pub fn selected_row(&self) -> Option<&RowView> {
        self.table.selected_row()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn item_cursor(&self) -> usize {
        self.item_cursor
    }

    /// Applies a viewer event and rebuilds the view.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effect = self.state.dispatch(event);
        self.table.replace(build_table(&self.state));
        self.item_cursor = 0;
        if let Some(Effect::OpenUrl(url)) = effect {
            self.request_open(&url);
        }
    }

    fn request_open(&mut self, link: &str) {
        let url = absolute_url(&self.instance_url, link);
        info!("open requested: {url}");
        self.open_request = Some(url);
    }

    /// Called by the event loop once the opener has run.
    pub fn open_done(&mut self, url: &str, result: Result<()>) {
        self.status_message = Some(match result {
            Ok(()) => format!("Opened {url}"),
            Err(e) => {
                warn!("failed to open {url}: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }

    /// Without an opener the link is only shown.
    pub fn show_link(&mut self, url: &str) {
        self.status_message = Some(format!("Link: {url}"));
    }

    fn reload(&mut self) {
        let Some(path) = self.data_path.clone() else {
            self.status_message = Some("No data file to reload".into());
            return;
        };
        match load_props_file(&path) {
            Ok(props) => {
                let new_value = props.get(PROJECTS_DATA).cloned().unwrap_or(Value::Null);
                let state = std::mem::take(&mut self.state);
                self.state = self
                    .lifecycle
                    .on_property_changed(PROJECTS_DATA, &new_value, state);
                self.table.replace(build_table(&self.state));
                self.status_message = Some(format!("Reloaded {} projects", self.state.data.len()));
            }
            Err(e) => {
                warn!("reload of {} failed: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;
        match self.mode() {
            Mode::CreateModal { .. } => match key.code {
                KeyCode::Enter => self.dispatch(UiEvent::ConfirmCreateModal),
                KeyCode::Esc => self.dispatch(UiEvent::CloseCreateModal),
                _ => {}
            },
            Mode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Char('g')
            | KeyCode::Char('G')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End => self.table.handle_key(key),
            KeyCode::Enter | KeyCode::Char(' ') => self.click_selected(ClickOrigin::Row),
            KeyCode::Char('e') => self.click_selected(ClickOrigin::ExpandButton),
            KeyCode::Tab => self.step_tab(TabId::next),
            KeyCode::BackTab => self.step_tab(TabId::prev),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                if let Some(&tab) = TabId::ALL.get(idx) {
                    self.select_tab(tab);
                }
            }
            KeyCode::Char('a') => self.toggle_active_filter(),
            KeyCode::Char('c') => self.open_create_modal(),
            KeyCode::Char('o') => {
                let url = self.selected_row().and_then(|r| r.project_url.clone());
                match url {
                    Some(url) => self.request_open(&url),
                    None => self.status_message = Some("Project has no link".into()),
                }
            }
            KeyCode::Char('s') => {
                let href = self
                    .expanded_details()
                    .and_then(|d| d.effort.status_report_link.as_ref())
                    .map(|link| link.href.clone());
                self.open_detail_link(href, "No status report link");
            }
            KeyCode::Char('t') => {
                let href = self
                    .expanded_details()
                    .and_then(|d| d.effort.time_cards_link.clone());
                self.open_detail_link(href, "No time cards link");
            }
            KeyCode::Char('J') => self.move_item_cursor(1),
            KeyCode::Char('K') => self.move_item_cursor(-1),
            KeyCode::Char('l') => self.open_item_link(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn click_selected(&mut self, origin: ClickOrigin) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.expandable {
            self.status_message = Some(format!(
                "{} has no status report (c to create one)",
                row.project_number
            ));
            return;
        }
        let project_number = row.project_number.clone();
        self.dispatch(UiEvent::RowClicked {
            project_number,
            origin,
        });
    }

    /// The selected row, if it is the expanded one.
    fn expanded_selection(&self) -> Option<(String, TabId)> {
        let row = self.selected_row()?;
        let accordion = row.accordion.as_ref()?;
        Some((row.project_number.clone(), accordion.active_tab))
    }

    /// The Details tab of the selected row, when it is expanded and showing.
    fn expanded_details(&self) -> Option<&DetailsView> {
        match &self.selected_row()?.accordion.as_ref()?.content {
            TabContent::Details(details) => Some(details),
            _ => None,
        }
    }

    fn open_detail_link(&mut self, href: Option<String>, missing: &str) {
        if self.expanded_details().is_none() {
            self.status_message = Some("Open the Details tab of an expanded project".into());
            return;
        }
        match href {
            Some(href) => self.request_open(&href),
            None => self.status_message = Some(missing.into()),
        }
    }

    fn item_count(&self) -> usize {
        self.selected_row()
            .and_then(|r| r.accordion.as_ref())
            .map_or(0, |a| a.content.item_links().len())
    }

    fn move_item_cursor(&mut self, delta: isize) {
        let count = self.item_count();
        if count == 0 {
            return;
        }
        let next = self.item_cursor.saturating_add_signed(delta);
        self.item_cursor = next.min(count - 1);
    }

    fn open_item_link(&mut self) {
        let link = self
            .selected_row()
            .and_then(|r| r.accordion.as_ref())
            .and_then(|a| {
                let links = a.content.item_links();
                let idx = self.item_cursor.min(links.len().saturating_sub(1));
                links.get(idx).map(|l| (l.number.clone(), l.url.clone()))
            });
        match link {
            Some((_, Some(url))) => self.request_open(&url),
            Some((number, None)) => self.status_message = Some(format!("{number} has no link")),
            None => self.status_message = Some("No row to open on this tab".into()),
        }
    }

    fn step_tab(&mut self, step: fn(&TabId) -> TabId) {
        if let Some((_, current)) = self.expanded_selection() {
            self.select_tab(step(&current));
        }
    }

    fn select_tab(&mut self, tab: TabId) {
        match self.expanded_selection() {
            Some((project_number, _)) => self.dispatch(UiEvent::TabSelected {
                project_number,
                tab,
            }),
            None => self.status_message = Some("Expand a project first".into()),
        }
    }

    fn toggle_active_filter(&mut self) {
        let filter = self
            .selected_row()
            .and_then(|r| r.accordion.as_ref())
            .filter(|a| a.active_tab.has_active_filter())
            .and_then(|a| match &a.content {
                TabContent::Milestones(t) => t.filter.clone(),
                TabContent::Issues(t) => t.filter.clone(),
                TabContent::Risks(t) => t.filter.clone(),
                _ => None,
            });
        let Some(filter) = filter else {
            self.status_message = Some("No active filter on this tab".into());
            return;
        };
        let event = ToggleEvent {
            payload_filter_key: Some(filter.filter_key),
            checked: Some(!filter.checked),
            path: Vec::new(),
        };
        if let Some(event) = filter_toggle(&event) {
            self.dispatch(event);
        }
    }

    fn open_create_modal(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.can_create_report {
            self.status_message = Some(format!(
                "{} already has a status report",
                row.project_number
            ));
            return;
        }
        match row.project_sys_id.clone() {
            Some(project_sys_id) => self.dispatch(UiEvent::OpenCreateModal { project_sys_id }),
            None => {
                self.status_message = Some(format!("{} has no sys_id", row.project_number));
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);

        let expanded = self
            .view()
            .rows
            .iter()
            .find_map(|row| row.accordion.as_ref().map(|a| (row, a)));
        match expanded {
            Some((row, accordion)) => {
                let body = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(layout[1]);
                self.table.render(frame, body[0]);
                detail_tabs::render(frame, row, accordion, self.item_cursor, body[1]);
            }
            None => self.table.render(frame, layout[1]),
        }

        self.render_status_bar(frame, layout[2]);

        // Overlays
        if let Some(modal) = &self.view().modal {
            self.render_create_modal(frame, modal, area);
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" statusview ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(&self.view().title, Style::default().fg(Color::Yellow)),
        ];
        if !self.instance_url.is_empty() {
            spans.push(Span::styled(
                format!(" ({})", self.instance_url),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Green),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match self.mode() {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "rows"),
                ("Enter", "expand"),
                ("Tab/1-5", "tabs"),
                ("a", "active only"),
                ("c", "create report"),
                ("o", "open"),
                ("s/t", "report/time cards"),
                ("J/K l", "open item"),
                ("r", "reload"),
            ],
            Mode::CreateModal { .. } => vec![("Enter", "go"), ("Esc", "cancel")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_create_modal(&self, frame: &mut Frame, modal: &ModalView, area: Rect) {
        let popup = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {MODAL_TITLE} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = vec![
            Line::from(MODAL_INTRO),
            Line::from(""),
            Line::from(MODAL_CHECKLIST_INTRO),
        ];
        lines.extend(MODAL_CHECKLIST.iter().map(|item| Line::from(format!("  • {item}"))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            modal.creation_path.clone(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("[Enter] ", Style::default().fg(Color::Yellow).bold()),
            Span::raw(MODAL_CONFIRM_LABEL),
            Span::raw("   "),
            Span::styled("[Esc] ", Style::default().fg(Color::Yellow).bold()),
            Span::raw(MODAL_CANCEL_LABEL),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
