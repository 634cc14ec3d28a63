//! The accordion under an expanded project: tab strip plus the active tab.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap};
use statusview_core::normalize::clean_html;
use statusview_core::view::{
    AccordionView, DetailsView, EffortCard, EffortFigure, HistoryView, IssueView, ItemLink,
    ItemTable, MilestoneView, RiskView, RowView, StatusCell, TabContent,
};

use super::{badge_line, dim, health_style, progress_line, tone_style};

/// Draws the accordion. `item_cursor` is the highlighted child row on the
/// milestone, issue, risk and history tabs.
pub fn render(
    frame: &mut Frame,
    row: &RowView,
    accordion: &AccordionView,
    item_cursor: usize,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} {} ", row.project_number, row.project_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let comments = health_comment_lines(row);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(comments.len() as u16),
            Constraint::Min(0),
        ])
        .split(inner);

    let titles: Vec<Line> = accordion
        .tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.label)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(accordion.active_tab.index())
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .divider("|");
    frame.render_widget(tabs, chunks[0]);
    frame.render_widget(Paragraph::new(comments), chunks[1]);

    let body = chunks[2];
    match &accordion.content {
        TabContent::Details(details) => render_details(frame, details, body),
        TabContent::Milestones(table) => render_items(
            frame,
            table,
            &["Number", "Description", "State", "Due", "Planned end", "Complete", "Comments"],
            &[
                Constraint::Length(12),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(16),
                Constraint::Min(16),
            ],
            milestone_row,
            item_cursor,
            body,
        ),
        TabContent::Issues(table) => render_items(
            frame,
            table,
            &["Number", "Description", "Impact", "Priority", "State", "Assigned", "Created", "Due"],
            &[
                Constraint::Length(12),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(11),
                Constraint::Length(11),
            ],
            issue_row,
            item_cursor,
            body,
        ),
        TabContent::Risks(table) => render_items(
            frame,
            table,
            &[
                "Number", "Description", "Type", "Impact", "Mitigation", "State", "Assigned",
                "Created", "Due",
            ],
            &[
                Constraint::Length(12),
                Constraint::Min(18),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(11),
                Constraint::Length(11),
            ],
            risk_row,
            item_cursor,
            body,
        ),
        TabContent::History(table) => render_items(
            frame,
            table,
            &[
                "Number", "As on", "Overall", "Schedule", "Cost", "Resources", "Complete",
                "Effort",
            ],
            &[
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Length(16),
            ],
            history_row,
            item_cursor,
            body,
        ),
    }
}

/// One line per health cell that carries a comment.
fn health_comment_lines(row: &RowView) -> Vec<Line<'static>> {
    let cells: [(&str, &StatusCell); 5] = [
        ("Overall", &row.overall_health),
        ("Cost", &row.cost),
        ("Scope", &row.scope),
        ("Schedule", &row.schedule),
        ("Resources", &row.resources),
    ];
    cells
        .into_iter()
        .filter_map(|(label, cell)| {
            let tooltip = cell.tooltip.as_ref()?;
            let style = match &cell.status {
                Some(badge) => health_style(badge.class),
                None => dim(),
            };
            Some(Line::from(vec![
                Span::styled(format!("{label}: "), style),
                Span::raw(tooltip.clone()),
            ]))
        })
        .collect()
}

fn render_details(frame: &mut Frame, details: &DetailsView, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    // Markup cannot be shown in a terminal, so sections are flattened to text.
    let mut lines = Vec::new();
    for section in &details.sections {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().bold().fg(Color::Yellow),
        )));
        for text in clean_html(&section.html).lines() {
            lines.push(Line::from(text.trim().to_string()));
        }
        lines.push(Line::from(""));
    }
    let sections = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(sections, columns[0]);

    let card = Paragraph::new(effort_lines(&details.effort))
        .block(
            Block::default()
                .title(" Effort ")
                .borders(Borders::ALL)
                .border_style(dim()),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(card, columns[1]);
}

fn effort_lines(card: &EffortCard) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(link) = &card.status_report_link {
        lines.push(Line::from(vec![
            Span::styled(link.label.clone(), Style::default().fg(Color::Cyan).underlined()),
            Span::styled(" (s)", dim()),
        ]));
        lines.push(Line::from(Span::styled(link.href.clone(), dim())));
    }

    let figures = [
        ("Planned effort (SOW)", &card.planned_effort_sow),
        ("Allocated effort", &card.allocated_effort),
        ("Actual effort", &card.actual_effort),
        ("Remaining effort", &card.remaining_effort),
        ("Unapproved effort", &card.unapproved_effort),
    ];
    for (label, figure) in figures {
        if let Some(figure) = figure {
            lines.push(figure_line(label, figure));
        }
    }
    if let Some(link) = &card.time_cards_link {
        lines.push(Line::from(Span::styled(
            format!("  time cards (t): {link}"),
            dim(),
        )));
    }

    if let Some(planned_end) = &card.planned_end {
        let mut spans = vec![
            Span::raw("Planned end: "),
            Span::styled(planned_end.date.clone(), Style::default().bold()),
        ];
        if let Some(days) = planned_end.delay_days {
            spans.push(Span::styled(
                format!(" ({days} days delayed)"),
                Style::default().fg(Color::Red).bold(),
            ));
        }
        lines.push(Line::from(spans));
    }

    for (label, progress, hint) in [
        ("Effort utilized", &card.effort_utilized, card.effort_utilized_hint),
        ("Time elapsed", &card.time_elapsed, card.time_elapsed_hint),
    ] {
        if let Some(progress) = progress {
            let mut spans = vec![Span::raw(format!("{label}: "))];
            spans.extend(progress_line(Some(progress), 10).spans);
            lines.push(Line::from(spans));
            if !hint.is_empty() {
                lines.push(Line::from(Span::styled(format!("  {hint}"), dim())));
            }
        }
    }
    lines
}

fn figure_line(label: &str, figure: &EffortFigure) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("{label}: ")),
        Span::styled(figure.text.clone(), tone_style(figure.tone)),
    ];
    if let Some(hint) = figure.hint {
        spans.push(Span::styled(format!("  {hint}"), dim()));
    }
    Line::from(spans)
}

fn render_items<T>(
    frame: &mut Frame,
    table: &ItemTable<T>,
    header: &[&'static str],
    widths: &[Constraint],
    build: fn(&T) -> Row<'static>,
    cursor: usize,
    area: Rect,
) {
    if let Some(message) = table.empty_message {
        let paragraph = Paragraph::new(Span::styled(message, dim())).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    if let Some(filter) = &table.filter {
        let mark = if filter.checked { "[x]" } else { "[ ]" };
        let line = Line::from(vec![
            Span::styled(mark, Style::default().fg(Color::Cyan)),
            Span::raw(" Only active "),
            Span::styled("(a)", dim()),
        ]);
        frame.render_widget(line, chunks[0]);
    }

    let rows: Vec<Row> = table.rows.iter().map(build).collect();
    let widget = Table::new(rows, widths.to_vec())
        .header(Row::new(header.to_vec()).style(Style::default().bold().fg(Color::Yellow)))
        .row_highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = TableState::default();
    if !table.rows.is_empty() {
        state.select(Some(cursor.min(table.rows.len() - 1)));
    }
    frame.render_stateful_widget(widget, chunks[1], &mut state);
}

fn number_cell(link: &ItemLink) -> Cell<'static> {
    let style = if link.url.is_some() {
        Style::default().fg(Color::Cyan).underlined()
    } else {
        Style::default()
    };
    Cell::from(Span::styled(link.number.clone(), style))
}

fn milestone_row(m: &MilestoneView) -> Row<'static> {
    Row::new(vec![
        number_cell(&m.number),
        Cell::from(m.short_description.clone()),
        Cell::from(m.state.clone()),
        Cell::from(m.due_date.clone()),
        Cell::from(m.planned_end.clone()),
        Cell::from(progress_line(m.percent_complete.as_ref(), 8)),
        Cell::from(m.comments.clone()),
    ])
}

fn issue_row(i: &IssueView) -> Row<'static> {
    Row::new(vec![
        number_cell(&i.number),
        Cell::from(i.short_description.clone()),
        Cell::from(i.impact.clone()),
        Cell::from(i.priority.clone()),
        Cell::from(i.state.clone()),
        Cell::from(i.assigned_to.clone()),
        Cell::from(i.created.clone()),
        Cell::from(i.due_date.clone()),
    ])
}

fn risk_row(r: &RiskView) -> Row<'static> {
    Row::new(vec![
        number_cell(&r.number),
        Cell::from(r.short_description.clone()),
        Cell::from(r.risk_type.clone()),
        Cell::from(r.impact.clone()),
        Cell::from(r.mitigation.clone()),
        Cell::from(r.risk_state.clone()),
        Cell::from(r.assigned_to.clone()),
        Cell::from(r.created.clone()),
        Cell::from(r.due_date.clone()),
    ])
}

fn history_row(h: &HistoryView) -> Row<'static> {
    Row::new(vec![
        number_cell(&h.number),
        Cell::from(h.as_on.clone()),
        Cell::from(badge_line(h.overall_health.as_ref())),
        Cell::from(badge_line(h.schedule.as_ref())),
        Cell::from(badge_line(h.cost.as_ref())),
        Cell::from(badge_line(h.resources.as_ref())),
        Cell::from(progress_line(h.percent_complete.as_ref(), 8)),
        Cell::from(progress_line(h.effort_utilized.as_ref(), 8)),
    ])
}
