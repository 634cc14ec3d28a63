use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::ProjectRecord;

pub const TAB_KEY_SUFFIX: &str = "-tab";
pub const FILTER_KEY_SUFFIX: &str = "-activefilter";

const STATUS_REPORT_CREATION_PREFIX: &str =
    "/now/workspace/project/home/sub/status-report/pm_project/";
const STATUS_REPORT_CREATION_SUFFIX: &str = "/params/page-name/status-report";

/// Key holding the active tab of a row.
pub fn tab_key(project_number: &str) -> String {
    format!("{project_number}{TAB_KEY_SUFFIX}")
}

/// Key holding the active-only filter of a row.
pub fn filter_key(project_number: &str) -> String {
    format!("{project_number}{FILTER_KEY_SUFFIX}")
}

/// Where a new status report for `project_sys_id` is created.
pub fn status_report_creation_path(project_sys_id: &str) -> String {
    format!(
        "{STATUS_REPORT_CREATION_PREFIX}{}{STATUS_REPORT_CREATION_SUFFIX}",
        urlencoding::encode(project_sys_id)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    Details,
    Milestones,
    Issues,
    Risks,
    History,
}

impl TabId {
    /// Accordion tabs in display order.
    pub const ALL: &[TabId] = &[
        TabId::Details,
        TabId::Milestones,
        TabId::Issues,
        TabId::Risks,
        TabId::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabId::Details => "details",
            TabId::Milestones => "milestones",
            TabId::Issues => "issues",
            TabId::Risks => "risks",
            TabId::History => "history",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TabId::Details => "Details",
            TabId::Milestones => "Milestones",
            TabId::Issues => "Issues",
            TabId::Risks => "Risks",
            TabId::History => "Status History",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "details" => Some(TabId::Details),
            "milestones" => Some(TabId::Milestones),
            "issues" => Some(TabId::Issues),
            "risks" => Some(TabId::Risks),
            "history" => Some(TabId::History),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Tabs whose table honours the active-only toggle.
    pub fn has_active_filter(&self) -> bool {
        matches!(self, TabId::Milestones | TabId::Issues | TabId::Risks)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Value stored under an `expandedRows` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowEntry {
    Flag(bool),
    Tab(TabId),
}

/// Per-row accordion state keyed by composite string keys:
/// `<project_number>` (expanded), `<project_number>-tab` (active tab) and
/// `<project_number>-activefilter` (active-only filter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedRows(BTreeMap<String, RowEntry>);

impl ExpandedRows {
    pub fn get(&self, key: &str) -> Option<&RowEntry> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, entry: RowEntry) {
        self.0.insert(key.into(), entry);
    }

    pub fn is_expanded(&self, project_number: &str) -> bool {
        matches!(self.0.get(project_number), Some(RowEntry::Flag(true)))
    }

    /// Last selected tab, `Details` when none was chosen yet.
    pub fn active_tab(&self, project_number: &str) -> TabId {
        match self.0.get(&tab_key(project_number)) {
            Some(RowEntry::Tab(tab)) => *tab,
            _ => TabId::Details,
        }
    }

    /// The active-only filter is on unless explicitly switched off.
    pub fn active_only(&self, project_number: &str) -> bool {
        !matches!(
            self.0.get(&filter_key(project_number)),
            Some(RowEntry::Flag(false))
        )
    }

    /// Project numbers currently expanded.
    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(key, entry)| is_row_key(key) && **entry == RowEntry::Flag(true))
            .map(|(key, _)| key.as_str())
    }

    fn collapse_all(&mut self) {
        for (key, entry) in self.0.iter_mut() {
            if is_row_key(key) {
                *entry = RowEntry::Flag(false);
            }
        }
    }
}

fn is_row_key(key: &str) -> bool {
    !key.ends_with(TAB_KEY_SUFFIX) && !key.ends_with(FILTER_KEY_SUFFIX)
}

/// The "create status report" confirmation dialog. Only one exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSrModal {
    pub open: bool,
    pub project_sys_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    pub data: Vec<ProjectRecord>,
    pub expanded_rows: ExpandedRows,
    pub create_sr_modal: CreateSrModal,
}

impl ViewerState {
    pub fn new(data: Vec<ProjectRecord>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn find_row(&self, project_number: &str) -> Option<&ProjectRecord> {
        self.data
            .iter()
            .find(|row| row.project_number().as_deref() == Some(project_number))
    }

    /// Applies `event` in place and returns any side effect for the host.
    pub fn dispatch(&mut self, event: UiEvent) -> Option<Effect> {
        let Transition { state, effect } = reduce(std::mem::take(self), event);
        *self = state;
        effect
    }
}

/// Where a row click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOrigin {
    /// Anywhere on the row body.
    Row,
    /// The expand chevron.
    ExpandButton,
    /// A link inside the row; does not toggle.
    Link,
    /// Some other button inside the row; does not toggle.
    Button,
}

impl ClickOrigin {
    fn toggles_row(&self) -> bool {
        matches!(self, ClickOrigin::Row | ClickOrigin::ExpandButton)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UiEvent {
    RowClicked {
        project_number: String,
        origin: ClickOrigin,
    },
    TabSelected {
        project_number: String,
        tab: TabId,
    },
    ActiveFilterToggled {
        filter_key: String,
        checked: bool,
    },
    OpenCreateModal {
        project_sys_id: String,
    },
    CloseCreateModal,
    ConfirmCreateModal,
    DataReplaced(Vec<ProjectRecord>),
}

/// Work the host performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    OpenUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ViewerState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn unchanged(state: ViewerState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Pure reducer. Each event replaces only the fields it names; the rest of
/// the state is carried forward.
pub fn reduce(mut state: ViewerState, event: UiEvent) -> Transition {
    match event {
        UiEvent::RowClicked {
            project_number,
            origin,
        } => {
            if project_number.is_empty() || !origin.toggles_row() {
                return Transition::unchanged(state);
            }
            let expandable = state
                .find_row(&project_number)
                .is_some_and(ProjectRecord::has_status_report);
            if !expandable {
                debug!("row {project_number} has no status report, ignoring click");
                return Transition::unchanged(state);
            }
            let was_open = state.expanded_rows.is_expanded(&project_number);
            state.expanded_rows.collapse_all();
            state
                .expanded_rows
                .set(project_number.clone(), RowEntry::Flag(!was_open));
            debug!(
                "row {project_number} {}",
                if was_open { "collapsed" } else { "expanded" }
            );
            Transition::unchanged(state)
        }
        UiEvent::TabSelected {
            project_number,
            tab,
        } => {
            if !state.expanded_rows.is_expanded(&project_number) {
                debug!("tab {tab:?} selected on collapsed row {project_number}, ignoring");
                return Transition::unchanged(state);
            }
            state
                .expanded_rows
                .set(tab_key(&project_number), RowEntry::Tab(tab));
            Transition::unchanged(state)
        }
        UiEvent::ActiveFilterToggled {
            filter_key,
            checked,
        } => {
            if filter_key.is_empty() {
                debug!("filter toggle without a key, ignoring");
                return Transition::unchanged(state);
            }
            debug!("filter {filter_key} set to {checked}");
            state.expanded_rows.set(filter_key, RowEntry::Flag(checked));
            Transition::unchanged(state)
        }
        UiEvent::OpenCreateModal { project_sys_id } => {
            if project_sys_id.is_empty() {
                return Transition::unchanged(state);
            }
            state.create_sr_modal = CreateSrModal {
                open: true,
                project_sys_id: Some(project_sys_id),
            };
            Transition::unchanged(state)
        }
        UiEvent::CloseCreateModal => {
            state.create_sr_modal = CreateSrModal::default();
            Transition::unchanged(state)
        }
        UiEvent::ConfirmCreateModal => {
            let Some(project_sys_id) = state.create_sr_modal.project_sys_id.take() else {
                return Transition::unchanged(state);
            };
            state.create_sr_modal = CreateSrModal::default();
            Transition {
                state,
                effect: Some(Effect::OpenUrl(status_report_creation_path(
                    &project_sys_id,
                ))),
            }
        }
        UiEvent::DataReplaced(rows) => {
            debug!("replacing {} rows with {}", state.data.len(), rows.len());
            state.data = rows;
            Transition::unchanged(state)
        }
    }
}
