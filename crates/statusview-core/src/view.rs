//! Assembles normalized fields and derived metrics into the values a
//! renderer needs for one pass. Nothing here knows how it will be drawn.

use serde::Serialize;
use serde_json::Value;

use crate::health::{get_health_class, HealthClass};
use crate::metrics::{
    approved_end_value, filter_items, get_delay_days, planned_end_value, visible_delay, ItemCounts,
    Progress,
};
use crate::normalize::{
    clean_html, format_date_kpi, format_date_only, to_display_string, PLACEHOLDER,
};
use crate::record::{is_truthy, number_string, primitive_string, value_text, ProjectRecord};
use crate::state::{filter_key, status_report_creation_path, ExpandedRows, TabId, ViewerState};

pub const NO_PROJECTS_MESSAGE: &str = "No projects found using selected filters";
pub const NO_PROJECTS_HINT: &str = "Double check the data correctness ...";
pub const NO_MILESTONES_MESSAGE: &str = "No milestones found";
pub const NO_ISSUES_MESSAGE: &str = "No issues found";
pub const NO_RISKS_MESSAGE: &str = "No risks found";
pub const NO_HISTORY_MESSAGE: &str = "No status history found";

pub const MODAL_TITLE: &str = "Create Status Report";
pub const MODAL_INTRO: &str = "When you click the button below, you will be navigated to the \
Status Report creation page. On that page, click Create Status Report and select \
Mobiz (MSP) domain.";
pub const MODAL_CHECKLIST_INTRO: &str = "Before creating the Status Report, please make sure \
these items are up to date, as they will be captured into the status report during submission:";
pub const MODAL_CHECKLIST: &[&str] = &[
    "Completion %",
    "RIDAC tab",
    "Milestones",
    "Issues, Risks, and key updates",
];
pub const MODAL_CONFIRM_LABEL: &str = "Go to Status Reports page";
pub const MODAL_CANCEL_LABEL: &str = "Cancel";

const STATUS_REPORT_LINK_LABEL: &str = "Open Status Report Record";

pub const ALLOCATED_EFFORT_HINT: &str = "SUM of hours assigned to all project participants to date";
pub const ACTUAL_EFFORT_HINT: &str = "Hours which have been recorded and approved";
pub const REMAINING_EFFORT_HINT: &str = "Allocated Effort - Actual Effort";
pub const EFFORT_UTILIZED_HINT: &str =
    "Effort Utilized = (Actual Effort / Allocated Effort) * 100";
pub const TIME_ELAPSED_HINT: &str =
    "(Actual Duration in Workdays / Planned Duration in Workdays) * 100";
const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub rows: Vec<RowView>,
    pub empty_message: Option<&'static str>,
    pub modal: Option<ModalView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    pub project_sys_id: String,
    pub creation_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub project_number: String,
    pub project_sys_id: Option<String>,
    pub project_url: Option<String>,
    pub company: Option<String>,
    pub project_name: String,
    pub manager: Option<ManagerView>,
    pub date_range: Option<String>,
    pub status_date: String,
    pub overall_health: StatusCell,
    pub cost: StatusCell,
    pub scope: StatusCell,
    pub schedule: StatusCell,
    pub resources: StatusCell,
    pub percent_complete: Option<Progress>,
    pub effort_utilized: Option<Progress>,
    pub expandable: bool,
    pub expanded: bool,
    /// Rows without a status report offer to create one instead.
    pub can_create_report: bool,
    pub accordion: Option<AccordionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerView {
    pub name: String,
    pub image_src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthBadge {
    pub label: String,
    pub class: HealthClass,
}

/// A health column cell. `status` is `None` when the record has no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCell {
    pub status: Option<HealthBadge>,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordionView {
    pub tabs: Vec<TabView>,
    pub active_tab: TabId,
    pub content: TabContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabView {
    pub id: TabId,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum TabContent {
    Details(DetailsView),
    Milestones(ItemTable<MilestoneView>),
    Issues(ItemTable<IssueView>),
    Risks(ItemTable<RiskView>),
    History(ItemTable<HistoryView>),
}

impl TabContent {
    /// Number links of the child rows, in display order. Empty on Details.
    pub fn item_links(&self) -> Vec<&ItemLink> {
        match self {
            TabContent::Details(_) => Vec::new(),
            TabContent::Milestones(t) => t.rows.iter().map(|m| &m.number).collect(),
            TabContent::Issues(t) => t.rows.iter().map(|i| &i.number).collect(),
            TabContent::Risks(t) => t.rows.iter().map(|r| &r.number).collect(),
            TabContent::History(t) => t.rows.iter().map(|h| &h.number).collect(),
        }
    }
}

/// The "Only active" switch above a filtered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterToggle {
    pub filter_key: String,
    pub checked: bool,
}

/// A child-record table. An empty source collection produces
/// `empty_message` and no toggle; a filter that hides every row produces an
/// empty `rows` with the toggle still present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTable<T> {
    pub empty_message: Option<&'static str>,
    pub filter: Option<FilterToggle>,
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLink {
    pub number: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneView {
    pub number: ItemLink,
    pub short_description: String,
    pub state: String,
    pub due_date: String,
    pub planned_end: String,
    pub percent_complete: Option<Progress>,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueView {
    pub number: ItemLink,
    pub short_description: String,
    pub impact: String,
    pub priority: String,
    pub state: String,
    pub assigned_to: String,
    pub created: String,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskView {
    pub number: ItemLink,
    pub short_description: String,
    pub risk_type: String,
    pub impact: String,
    pub mitigation: String,
    pub risk_state: String,
    pub assigned_to: String,
    pub created: String,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub number: ItemLink,
    pub as_on: String,
    pub overall_health: Option<HealthBadge>,
    pub schedule: Option<HealthBadge>,
    pub cost: Option<HealthBadge>,
    pub resources: Option<HealthBadge>,
    pub percent_complete: Option<Progress>,
    pub effort_utilized: Option<Progress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub sections: Vec<DetailSection>,
    pub effort: EffortCard,
}

/// Rich-text section body. Markup is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub title: &'static str,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffortFigure {
    pub text: String,
    pub tone: Tone,
    /// How the figure is derived, for renderers that can show it.
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedEnd {
    pub date: String,
    /// Present only for delays worth showing.
    pub delay_days: Option<i64>,
}

/// Effort tracking widgets. Each one is absent when its source value is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffortCard {
    pub status_report_link: Option<Link>,
    pub planned_effort_sow: Option<EffortFigure>,
    pub allocated_effort: Option<EffortFigure>,
    pub actual_effort: Option<EffortFigure>,
    pub remaining_effort: Option<EffortFigure>,
    pub unapproved_effort: Option<EffortFigure>,
    pub time_cards_link: Option<String>,
    pub planned_end: Option<PlannedEnd>,
    pub effort_utilized: Option<Progress>,
    pub effort_utilized_hint: &'static str,
    pub time_elapsed: Option<Progress>,
    pub time_elapsed_hint: &'static str,
}

pub fn build_table(state: &ViewerState) -> TableView {
    let rows: Vec<RowView> = state
        .data
        .iter()
        .map(|record| build_row(record, &state.expanded_rows))
        .collect();
    let modal = match &state.create_sr_modal {
        m if m.open => m.project_sys_id.as_ref().map(|id| ModalView {
            project_sys_id: id.clone(),
            creation_path: status_report_creation_path(id),
        }),
        _ => None,
    };
    TableView {
        title: format!("Projects ({})", rows.len()),
        empty_message: rows.is_empty().then_some(NO_PROJECTS_MESSAGE),
        rows,
        modal,
    }
}

pub fn build_row(project: &ProjectRecord, expanded_rows: &ExpandedRows) -> RowView {
    let project_number = project.project_number().unwrap_or_default();
    let expandable = project.has_status_report();
    let expanded = expandable && expanded_rows.is_expanded(&project_number);

    RowView {
        project_sys_id: project.project_sys_id(),
        project_url: project.text("projectUrl"),
        company: project.text("company"),
        project_name: project.text("projectName").unwrap_or_default(),
        manager: manager_view(project),
        date_range: date_range(project),
        status_date: format_date_only(project.value("statusDate")),
        overall_health: status_cell(project, "overallHealth", "comments"),
        cost: status_cell(project, "cost", "cost_comments"),
        scope: status_cell(project, "scope", "scope_comments"),
        schedule: status_cell(project, "schedule", "schedule_comments"),
        resources: status_cell(project, "resources", "resource_comments"),
        percent_complete: Progress::from_value(project.value("percentComplete")),
        effort_utilized: Progress::from_value(project.value("effortUtilized")),
        expandable,
        expanded,
        can_create_report: !expandable,
        accordion: expanded.then(|| build_accordion(project, expanded_rows)),
        project_number,
    }
}

pub fn build_accordion(project: &ProjectRecord, expanded_rows: &ExpandedRows) -> AccordionView {
    let project_number = project.project_number().unwrap_or_default();
    let active_tab = expanded_rows.active_tab(&project_number);
    let active_only = expanded_rows.active_only(&project_number);
    let counts = ItemCounts::for_project(project, active_only);

    let tabs = TabId::ALL
        .iter()
        .map(|&id| {
            let label = match id {
                TabId::Details => id.display_name().to_string(),
                TabId::Milestones => format!("{} ({})", id.display_name(), counts.milestones),
                TabId::Issues => format!("{} ({})", id.display_name(), counts.issues),
                TabId::Risks => format!("{} ({})", id.display_name(), counts.risks),
                TabId::History => format!("{} ({})", id.display_name(), counts.history),
            };
            TabView {
                id,
                label,
                active: id == active_tab,
            }
        })
        .collect();

    let toggle = FilterToggle {
        filter_key: filter_key(&project_number),
        checked: active_only,
    };
    let content = match active_tab {
        TabId::Details => TabContent::Details(details_view(project)),
        TabId::Milestones => TabContent::Milestones(item_table(
            project.children("milestones"),
            Some(toggle),
            NO_MILESTONES_MESSAGE,
            milestone_view,
        )),
        TabId::Issues => TabContent::Issues(item_table(
            project.children("issues"),
            Some(toggle),
            NO_ISSUES_MESSAGE,
            issue_view,
        )),
        TabId::Risks => TabContent::Risks(item_table(
            project.children("risks"),
            Some(toggle),
            NO_RISKS_MESSAGE,
            risk_view,
        )),
        TabId::History => TabContent::History(item_table(
            project.children("status_history"),
            None,
            NO_HISTORY_MESSAGE,
            history_view,
        )),
    };

    AccordionView {
        tabs,
        active_tab,
        content,
    }
}

fn item_table<T>(
    items: &[Value],
    filter: Option<FilterToggle>,
    empty_message: &'static str,
    build: fn(&Value) -> T,
) -> ItemTable<T> {
    if items.is_empty() {
        return ItemTable {
            empty_message: Some(empty_message),
            filter: None,
            rows: Vec::new(),
        };
    }
    let active_only = filter.as_ref().is_some_and(|f| f.checked);
    ItemTable {
        empty_message: None,
        rows: filter_items(items, active_only).map(build).collect(),
        filter,
    }
}

fn field<'a>(item: &'a Value, name: &str) -> &'a Value {
    item.get(name).unwrap_or(&Value::Null)
}

fn item_link(item: &Value) -> ItemLink {
    ItemLink {
        number: value_text(field(item, "number")).unwrap_or_default(),
        url: value_text(field(item, "url")),
    }
}

fn milestone_view(m: &Value) -> MilestoneView {
    MilestoneView {
        number: item_link(m),
        short_description: to_display_string(field(m, "short_description")),
        state: to_display_string(field(m, "state")),
        due_date: format_date_only(field(m, "due_date")),
        planned_end: format_date_only(field(m, "end_date")),
        percent_complete: Progress::from_value(field(m, "percent_complete")),
        comments: to_display_string(field(m, "comments")),
    }
}

fn issue_view(i: &Value) -> IssueView {
    IssueView {
        number: item_link(i),
        short_description: to_display_string(field(i, "short_description")),
        impact: to_display_string(field(i, "impact")),
        priority: to_display_string(field(i, "priority")),
        state: to_display_string(field(i, "state")),
        assigned_to: to_display_string(field(i, "assigned_to")),
        created: format_date_only(field(i, "sys_created_on")),
        due_date: to_display_string(field(i, "due_date")),
    }
}

fn risk_view(r: &Value) -> RiskView {
    RiskView {
        number: item_link(r),
        short_description: to_display_string(field(r, "short_description")),
        risk_type: to_display_string(field(r, "u_risk_issue_type")),
        impact: to_display_string(field(r, "impact")),
        mitigation: to_display_string(field(r, "mitigation")),
        risk_state: to_display_string(field(r, "risk_state")),
        assigned_to: to_display_string(field(r, "assigned_to")),
        created: format_date_only(field(r, "sys_created_on")),
        due_date: to_display_string(field(r, "due_date")),
    }
}

fn history_view(h: &Value) -> HistoryView {
    HistoryView {
        number: item_link(h),
        as_on: to_display_string(field(h, "as_on")),
        overall_health: health_badge(field(h, "overall_health")),
        schedule: health_badge(field(h, "schedule")),
        cost: health_badge(field(h, "cost")),
        resources: health_badge(field(h, "resources")),
        percent_complete: Progress::from_value(field(h, "percent_complete")),
        effort_utilized: Progress::from_value(field(h, "u_effort_utilized")),
    }
}

/// Badge for a history cell; reference objects are resolved to their
/// display text before classification.
fn health_badge(value: &Value) -> Option<HealthBadge> {
    let text = to_display_string(value);
    if text == PLACEHOLDER {
        return None;
    }
    Some(HealthBadge {
        class: HealthClass::classify(&text),
        label: text,
    })
}

fn status_cell(project: &ProjectRecord, status_field: &str, comments_field: &str) -> StatusCell {
    let value = project.value(status_field);
    let status = is_truthy(value).then(|| HealthBadge {
        label: to_display_string(value),
        class: get_health_class(value),
    });
    let tooltip = project
        .get(comments_field)
        .and_then(Value::as_str)
        .map(clean_html)
        .filter(|t| !t.is_empty());
    StatusCell { status, tooltip }
}

fn manager_view(project: &ProjectRecord) -> Option<ManagerView> {
    let name = project.text("projectManagerName")?;
    let image_src = project
        .text("projectManagerImageSrc")
        .unwrap_or_else(|| avatar_url(&name));
    Some(ManagerView { name, image_src })
}

/// Generated initials avatar for people without a picture.
pub fn avatar_url(name: &str) -> String {
    let query = name.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{AVATAR_SERVICE}?name={query}&background=random")
}

fn date_range(project: &ProjectRecord) -> Option<String> {
    let start = project.value("startDate");
    let end = project.value("endDate");
    if !is_truthy(start) && !is_truthy(end) {
        return None;
    }
    let side = |v: &Value| {
        if is_truthy(v) {
            format_date_only(v)
        } else {
            "?".to_string()
        }
    };
    Some(format!("{} – {}", side(start), side(end)))
}

fn details_view(project: &ProjectRecord) -> DetailsView {
    let section = |title: &'static str, name: &str| {
        let value = project.value(name);
        DetailSection {
            title,
            html: if is_truthy(value) {
                primitive_string(value)
            } else {
                PLACEHOLDER.to_string()
            },
        }
    };
    DetailsView {
        sections: vec![
            section("Executive Summary", "executive_summary"),
            section("Achievements", "achievements_last_week"),
            section("Key Planned Activities", "key_activities_next_week"),
            section("Comments", "comments"),
        ],
        effort: effort_card(project),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn hours(value: &Value, tone: Tone, hint: Option<&'static str>) -> Option<EffortFigure> {
    is_truthy(value).then(|| EffortFigure {
        text: format!("{} h", to_display_string(value)),
        tone,
        hint,
    })
}

fn effort_card(project: &ProjectRecord) -> EffortCard {
    let status_report_link = project
        .text("statusReportUrl")
        .or_else(|| {
            project
                .text("statusReportSysID")
                .map(|id| format!("/nav_to.do?uri=project_status.do?sys_id={id}"))
        })
        .map(|href| Link {
            href,
            label: match project.text("statusReportNumber") {
                Some(number) => format!("{STATUS_REPORT_LINK_LABEL} - {number}"),
                None => STATUS_REPORT_LINK_LABEL.to_string(),
            },
        });

    let remaining = project.value("u_remaining_effort");
    let remaining_tone = match numeric(remaining) {
        Some(n) if n < 0.0 => Tone::Bad,
        _ => Tone::Neutral,
    };

    let unapproved_effort = numeric(project.value("time_cards_submitted_hours")).map(|h| {
        EffortFigure {
            text: format!("{} h", number_string(h)),
            tone: if h > 0.0 { Tone::Bad } else { Tone::Good },
            hint: None,
        }
    });

    let planned_end = planned_end_value(project)
        .or_else(|| project.first_truthy(&["endDate"]))
        .map(|value| PlannedEnd {
            date: format_date_kpi(value),
            delay_days: visible_delay(get_delay_days(value, &approved_end_value(project))),
        });

    EffortCard {
        status_report_link,
        planned_effort_sow: hours(
            project.value("x_mobit_spm_enh_planned_effort_sow"),
            Tone::Neutral,
            None,
        ),
        allocated_effort: hours(
            project.value("x_mobit_spm_enh_allocated_effort"),
            Tone::Neutral,
            Some(ALLOCATED_EFFORT_HINT),
        ),
        actual_effort: hours(
            project.value("x_mobit_spm_enh_actual_effort"),
            Tone::Neutral,
            Some(ACTUAL_EFFORT_HINT),
        ),
        remaining_effort: hours(remaining, remaining_tone, Some(REMAINING_EFFORT_HINT)),
        unapproved_effort,
        time_cards_link: project.text("time_cards_submitted_link"),
        planned_end,
        effort_utilized: Progress::from_value(project.value("effortUtilized")),
        effort_utilized_hint: EFFORT_UTILIZED_HINT,
        time_elapsed: Progress::from_value(project.value("u_time_elapsed")),
        time_elapsed_hint: TIME_ELAPSED_HINT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ClickOrigin, UiEvent};
    use serde_json::json;

    fn sample() -> ProjectRecord {
        ProjectRecord::from_value(json!({
            "project_number": "PRJ0010",
            "projectSysID": "sys10",
            "projectName": "Data Platform",
            "company": "Acme",
            "projectManagerName": "Ada  Lovelace",
            "startDate": "2024-01-15",
            "endDate": "2024-03-05",
            "plannedEndDate": "2024-03-10",
            "statusDate": "2024-02-20",
            "overallHealth": "Green",
            "comments": "<p>All <b>good</b></p>",
            "cost": "amber",
            "scope": "",
            "schedule": "Red",
            "schedule_comments": "Vendor slip",
            "percentComplete": "45%",
            "effortUtilized": 130,
            "u_time_elapsed": "60",
            "statusReportSysID": "sr10",
            "statusReportNumber": "PRJSTAT001",
            "x_mobit_spm_enh_planned_effort_sow": 120,
            "x_mobit_spm_enh_allocated_effort": "100",
            "u_remaining_effort": "-4",
            "time_cards_submitted_hours": "6",
            "milestones": [
                {"number": "MS1", "active": true, "percent_complete": "150", "due_date": "2024-02-01"},
                {"number": "MS2", "active": "false"},
                {"number": "MS3", "active": "1", "url": "https://example.test/ms3"}
            ],
            "issues": [
                {"number": "ISS1", "active": false, "assigned_to": {"display_value": "Bo"}}
            ],
            "risks": [],
            "status_history": [
                {"number": "SR1", "as_on": "2024-02-01", "overall_health": {"display_value": "Yellow"}, "cost": ""}
            ]
        }))
    }

    fn expanded_state() -> ViewerState {
        let mut state = ViewerState::new(vec![sample()]);
        state.dispatch(UiEvent::RowClicked {
            project_number: "PRJ0010".into(),
            origin: ClickOrigin::Row,
        });
        state
    }

    #[test]
    fn empty_table_has_message() {
        let view = build_table(&ViewerState::default());
        assert_eq!(view.title, "Projects (0)");
        assert_eq!(view.empty_message, Some(NO_PROJECTS_MESSAGE));
        assert!(view.rows.is_empty());
    }

    #[test]
    fn row_header_fields() {
        let row = build_row(&sample(), &ExpandedRows::default());
        assert_eq!(row.project_number, "PRJ0010");
        assert_eq!(row.company.as_deref(), Some("Acme"));
        assert_eq!(row.date_range.as_deref(), Some("Jan 15 2024 – Mar 05 2024"));
        assert_eq!(row.status_date, "Feb 20 2024");
        assert!(row.expandable);
        assert!(!row.expanded);
        assert!(!row.can_create_report);
        assert!(row.accordion.is_none());

        let manager = row.manager.unwrap();
        assert_eq!(
            manager.image_src,
            "https://ui-avatars.com/api/?name=Ada+Lovelace&background=random"
        );
    }

    #[test]
    fn health_cells() {
        let row = build_row(&sample(), &ExpandedRows::default());
        let overall = row.overall_health;
        assert_eq!(overall.status.unwrap().class, HealthClass::Green);
        assert_eq!(overall.tooltip.as_deref(), Some("All good"));
        assert_eq!(row.cost.status.unwrap().class, HealthClass::Yellow);
        assert_eq!(row.scope.status, None);
        assert_eq!(row.schedule.tooltip.as_deref(), Some("Vendor slip"));
        assert_eq!(row.resources.status, None);
    }

    #[test]
    fn row_progress() {
        let row = build_row(&sample(), &ExpandedRows::default());
        let pc = row.percent_complete.unwrap();
        assert_eq!(pc.label, "45%");
        assert_eq!(pc.width, 45.0);
        let eu = row.effort_utilized.unwrap();
        assert!(eu.over);
        assert_eq!(eu.width, 100.0);
    }

    #[test]
    fn row_without_report_offers_creation() {
        let rec = ProjectRecord::from_value(json!({"project_number": "P2", "projectSysID": "s2"}));
        let row = build_row(&rec, &ExpandedRows::default());
        assert!(!row.expandable);
        assert!(row.can_create_report);
        assert_eq!(row.status_date, PLACEHOLDER);
        assert_eq!(row.date_range, None);
        assert_eq!(row.percent_complete, None);
    }

    #[test]
    fn tabs_with_active_filter_counts() {
        let view = build_table(&expanded_state());
        let accordion = view.rows[0].accordion.as_ref().unwrap();
        let labels: Vec<_> = accordion.tabs.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Details",
                "Milestones (2)",
                "Issues (0)",
                "Risks (0)",
                "Status History (1)"
            ]
        );
        assert_eq!(accordion.active_tab, TabId::Details);
        assert!(accordion.tabs[0].active);
    }

    #[test]
    fn tabs_without_filter_count_everything() {
        let mut state = expanded_state();
        state.dispatch(UiEvent::ActiveFilterToggled {
            filter_key: "PRJ0010-activefilter".into(),
            checked: false,
        });
        let view = build_table(&state);
        let accordion = view.rows[0].accordion.as_ref().unwrap();
        assert_eq!(accordion.tabs[1].label, "Milestones (3)");
        assert_eq!(accordion.tabs[2].label, "Issues (1)");
    }

    #[test]
    fn details_effort_card() {
        let view = build_table(&expanded_state());
        let accordion = view.rows[0].accordion.as_ref().unwrap();
        let TabContent::Details(details) = &accordion.content else {
            panic!("expected details tab");
        };
        assert_eq!(details.sections[0].html, PLACEHOLDER);
        assert_eq!(details.sections[3].html, "<p>All <b>good</b></p>");

        let effort = &details.effort;
        let link = effort.status_report_link.as_ref().unwrap();
        assert_eq!(link.href, "/nav_to.do?uri=project_status.do?sys_id=sr10");
        assert_eq!(link.label, "Open Status Report Record - PRJSTAT001");
        assert_eq!(effort.planned_effort_sow.as_ref().unwrap().text, "120 h");
        assert_eq!(effort.allocated_effort.as_ref().unwrap().text, "100 h");
        assert_eq!(effort.actual_effort, None);
        assert_eq!(effort.remaining_effort.as_ref().unwrap().tone, Tone::Bad);
        let unapproved = effort.unapproved_effort.as_ref().unwrap();
        assert_eq!(unapproved.text, "6 h");
        assert_eq!(unapproved.tone, Tone::Bad);

        let planned_end = effort.planned_end.as_ref().unwrap();
        assert_eq!(planned_end.date, "Mar 10 2024");
        assert_eq!(planned_end.delay_days, Some(5));

        assert!(effort.effort_utilized.as_ref().unwrap().over);
        assert_eq!(effort.time_elapsed.as_ref().unwrap().label, "60%");
    }

    #[test]
    fn effort_card_omits_absent_widgets() {
        let rec = ProjectRecord::from_value(json!({"project_number": "P", "statusReportSysID": "s"}));
        let card = effort_card(&rec);
        assert!(card.status_report_link.is_some());
        assert_eq!(card.planned_effort_sow, None);
        assert_eq!(card.unapproved_effort, None);
        assert_eq!(card.planned_end, None);
        assert_eq!(card.effort_utilized, None);
        assert_eq!(card.time_elapsed, None);
    }

    #[test]
    fn effort_figures_carry_hints() {
        let rec = ProjectRecord::from_value(json!({
            "x_mobit_spm_enh_planned_effort_sow": 80,
            "x_mobit_spm_enh_allocated_effort": 60,
            "x_mobit_spm_enh_actual_effort": 20,
            "u_remaining_effort": 40,
            "time_cards_submitted_hours": 2
        }));
        let card = effort_card(&rec);
        assert_eq!(card.planned_effort_sow.unwrap().hint, None);
        assert_eq!(card.allocated_effort.unwrap().hint, Some(ALLOCATED_EFFORT_HINT));
        assert_eq!(card.actual_effort.unwrap().hint, Some(ACTUAL_EFFORT_HINT));
        assert_eq!(
            card.remaining_effort.unwrap().hint,
            Some("Allocated Effort - Actual Effort")
        );
        assert_eq!(card.unapproved_effort.unwrap().hint, None);
        assert_eq!(
            card.effort_utilized_hint,
            "Effort Utilized = (Actual Effort / Allocated Effort) * 100"
        );
        assert!(card.time_elapsed_hint.starts_with("(Actual Duration in Workdays"));
    }

    #[test]
    fn zero_unapproved_hours_are_good() {
        let rec = ProjectRecord::from_value(json!({"time_cards_submitted_hours": 0}));
        let card = effort_card(&rec);
        let figure = card.unapproved_effort.unwrap();
        assert_eq!(figure.text, "0 h");
        assert_eq!(figure.tone, Tone::Good);
    }

    #[test]
    fn planned_end_falls_back_to_end_date() {
        let rec = ProjectRecord::from_value(json!({"endDate": "2024-06-01"}));
        let planned = effort_card(&rec).planned_end.unwrap();
        assert_eq!(planned.date, "Jun 01 2024");
        assert_eq!(planned.delay_days, None);
    }

    #[test]
    fn milestone_tab_filters_rows() {
        let mut state = expanded_state();
        state.dispatch(UiEvent::TabSelected {
            project_number: "PRJ0010".into(),
            tab: TabId::Milestones,
        });
        let view = build_table(&state);
        let TabContent::Milestones(table) = &view.rows[0].accordion.as_ref().unwrap().content
        else {
            panic!("expected milestones tab");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.filter,
            Some(FilterToggle {
                filter_key: "PRJ0010-activefilter".into(),
                checked: true
            })
        );
        let first = &table.rows[0];
        assert_eq!(first.number.number, "MS1");
        assert_eq!(first.due_date, "Feb 01 2024");
        assert_eq!(first.planned_end, PLACEHOLDER);
        assert!(first.percent_complete.as_ref().unwrap().over);
        assert_eq!(
            table.rows[1].number.url.as_deref(),
            Some("https://example.test/ms3")
        );

        let content = &view.rows[0].accordion.as_ref().unwrap().content;
        let numbers: Vec<&str> = content.item_links().iter().map(|l| l.number.as_str()).collect();
        assert_eq!(numbers, vec!["MS1", "MS3"]);
    }

    #[test]
    fn filter_hiding_all_rows_keeps_toggle() {
        let mut state = expanded_state();
        state.dispatch(UiEvent::TabSelected {
            project_number: "PRJ0010".into(),
            tab: TabId::Issues,
        });
        let view = build_table(&state);
        let TabContent::Issues(table) = &view.rows[0].accordion.as_ref().unwrap().content else {
            panic!("expected issues tab");
        };
        assert!(table.rows.is_empty());
        assert_eq!(table.empty_message, None);
        assert!(table.filter.is_some());
    }

    #[test]
    fn empty_collections_show_messages() {
        let mut state = expanded_state();
        state.dispatch(UiEvent::TabSelected {
            project_number: "PRJ0010".into(),
            tab: TabId::Risks,
        });
        let view = build_table(&state);
        let TabContent::Risks(table) = &view.rows[0].accordion.as_ref().unwrap().content else {
            panic!("expected risks tab");
        };
        assert_eq!(table.empty_message, Some(NO_RISKS_MESSAGE));
        assert_eq!(table.filter, None);
    }

    #[test]
    fn history_badges_resolve_reference_objects() {
        let mut state = expanded_state();
        state.dispatch(UiEvent::TabSelected {
            project_number: "PRJ0010".into(),
            tab: TabId::History,
        });
        let view = build_table(&state);
        let TabContent::History(table) = &view.rows[0].accordion.as_ref().unwrap().content else {
            panic!("expected history tab");
        };
        let row = &table.rows[0];
        assert_eq!(row.as_on, "2024-02-01");
        let badge = row.overall_health.as_ref().unwrap();
        assert_eq!(badge.label, "Yellow");
        assert_eq!(badge.class, HealthClass::Yellow);
        assert_eq!(row.cost, None);
        assert!(table.filter.is_none());
    }

    #[test]
    fn modal_view_follows_state() {
        let mut state = ViewerState::new(vec![sample()]);
        assert_eq!(build_table(&state).modal, None);
        state.dispatch(UiEvent::OpenCreateModal {
            project_sys_id: "sys10".into(),
        });
        let modal = build_table(&state).modal.unwrap();
        assert_eq!(modal.project_sys_id, "sys10");
        assert!(modal.creation_path.contains("/pm_project/sys10/"));
    }

    #[test]
    fn stale_expansion_of_unexpandable_row_is_ignored() {
        let rec = ProjectRecord::from_value(json!({"project_number": "P"}));
        let mut rows = ExpandedRows::default();
        rows.set("P", crate::state::RowEntry::Flag(true));
        let row = build_row(&rec, &rows);
        assert!(!row.expanded);
        assert!(row.accordion.is_none());
    }
}
