//! Seams between the viewer and whatever UI host embeds it.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::StatusviewError;
use crate::record::projects_from_property;
use crate::state::{reduce, UiEvent, ViewerState};

/// Name of the input property carrying project rows.
pub const PROJECTS_DATA: &str = "projectsData";

/// Element name of the active-only toggle control.
pub const TOGGLE_TAG: &str = "now-toggle";

/// Attribute spellings a toggle may carry its filter key under.
pub const FILTER_KEY_ATTRIBUTES: &[&str] = &["filterKey", "filterkey", "filter-key"];

/// Lifecycle callbacks a host adapter forwards to the viewer.
pub trait HostLifecycle {
    /// Builds the initial state from the host's initial properties.
    fn on_init(&self, initial_props: &Value) -> ViewerState;

    /// Folds a property change into `state`.
    fn on_property_changed(&self, name: &str, new_value: &Value, state: ViewerState)
        -> ViewerState;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerLifecycle;

impl HostLifecycle for ViewerLifecycle {
    fn on_init(&self, initial_props: &Value) -> ViewerState {
        let data = initial_props
            .get(PROJECTS_DATA)
            .map(projects_from_property)
            .unwrap_or_default();
        debug!("viewer initialised with {} rows", data.len());
        ViewerState::new(data)
    }

    fn on_property_changed(
        &self,
        name: &str,
        new_value: &Value,
        state: ViewerState,
    ) -> ViewerState {
        if name != PROJECTS_DATA {
            return state;
        }
        reduce(state, UiEvent::DataReplaced(projects_from_property(new_value))).state
    }
}

/// Wraps a JSON document as host properties. A document that already carries
/// `projectsData` is the property bag; anything else is that property's value.
pub fn props_from_document(document: Value) -> Value {
    if document.get(PROJECTS_DATA).is_some() {
        return document;
    }
    let mut props = Map::new();
    props.insert(PROJECTS_DATA.to_string(), document);
    Value::Object(props)
}

pub fn load_props_file(path: &Path) -> Result<Value, StatusviewError> {
    let text = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&text)?;
    info!("loaded viewer properties from {}", path.display());
    Ok(props_from_document(document))
}

/// One element on a UI event's propagation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl EventNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    fn filter_key(&self) -> Option<&str> {
        FILTER_KEY_ATTRIBUTES
            .iter()
            .filter_map(|name| self.attributes.get(*name))
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }

    fn is_toggle(&self) -> bool {
        self.tag.eq_ignore_ascii_case(TOGGLE_TAG)
    }
}

/// A checked-state change reported by a toggle control.
///
/// `path` runs from the event target outwards, like a composed event path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleEvent {
    pub payload_filter_key: Option<String>,
    pub checked: Option<bool>,
    pub path: Vec<EventNode>,
}

/// Finds the filter key a toggle event addresses: the payload first, then the
/// nearest toggle element on the path carrying a key, then the target itself.
pub fn resolve_filter_key(event: &ToggleEvent) -> Option<String> {
    if let Some(key) = event.payload_filter_key.as_deref().filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    event
        .path
        .iter()
        .find(|node| node.is_toggle() && node.filter_key().is_some())
        .or_else(|| event.path.first())
        .and_then(EventNode::filter_key)
        .map(str::to_string)
}

/// Turns a toggle event into a reducer event, or `None` when the key or the
/// checked value cannot be determined. Such events are dropped on purpose.
pub fn filter_toggle(event: &ToggleEvent) -> Option<UiEvent> {
    let key = resolve_filter_key(event);
    match (key, event.checked) {
        (Some(filter_key), Some(checked)) => Some(UiEvent::ActiveFilterToggled {
            filter_key,
            checked,
        }),
        (key, checked) => {
            debug!("dropping toggle event: filter key {key:?}, checked {checked:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_reads_projects_data() {
        let state = ViewerLifecycle.on_init(&json!({
            "projectsData": {"data": [{"project_number": "P1"}]}
        }));
        assert_eq!(state.data.len(), 1);
    }

    #[test]
    fn init_with_malformed_data_is_empty() {
        let state = ViewerLifecycle.on_init(&json!({"projectsData": {"foo": 1}}));
        assert!(state.data.is_empty());
        let state = ViewerLifecycle.on_init(&json!({}));
        assert!(state.data.is_empty());
    }

    #[test]
    fn property_change_replaces_rows() {
        let state = ViewerLifecycle.on_init(&json!({"projectsData": [{"project_number": "P1"}]}));
        let state = ViewerLifecycle.on_property_changed(
            PROJECTS_DATA,
            &json!([{"project_number": "P2"}, {"project_number": "P3"}]),
            state,
        );
        assert_eq!(state.data.len(), 2);
        assert_eq!(state.data[0].project_number().as_deref(), Some("P2"));
    }

    #[test]
    fn other_property_changes_are_ignored() {
        let state = ViewerLifecycle.on_init(&json!({"projectsData": [{"project_number": "P1"}]}));
        let state = ViewerLifecycle.on_property_changed("title", &json!([]), state);
        assert_eq!(state.data.len(), 1);
    }

    #[test]
    fn bare_documents_become_projects_data() {
        let props = props_from_document(json!([{"project_number": "P1"}]));
        assert_eq!(props, json!({"projectsData": [{"project_number": "P1"}]}));
        let props = props_from_document(json!({"projectsData": {"data": []}, "title": "x"}));
        assert_eq!(props["title"], "x");
    }

    #[test]
    fn load_file_reads_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"{"data": [{"project_number": "P1"}, {"project_number": "P2"}]}"#)
            .unwrap();
        let props = load_props_file(&path).unwrap();
        assert_eq!(ViewerLifecycle.on_init(&props).data.len(), 2);

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_props_file(&path), Err(StatusviewError::Json(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_props_file(&missing), Err(StatusviewError::Io(_))));
    }

    #[test]
    fn payload_key_wins() {
        let event = ToggleEvent {
            payload_filter_key: Some("P1-activefilter".into()),
            checked: Some(false),
            path: vec![EventNode::new("now-toggle").with_attribute("filter-key", "P2-activefilter")],
        };
        assert_eq!(resolve_filter_key(&event).as_deref(), Some("P1-activefilter"));
    }

    #[test]
    fn key_found_on_toggle_ancestor() {
        let event = ToggleEvent {
            payload_filter_key: None,
            checked: Some(true),
            path: vec![
                EventNode::new("span"),
                EventNode::new("NOW-TOGGLE").with_attribute("filterKey", "P1-activefilter"),
                EventNode::new("div").with_attribute("filter-key", "outer"),
            ],
        };
        assert_eq!(resolve_filter_key(&event).as_deref(), Some("P1-activefilter"));
    }

    #[test]
    fn attribute_casing_variants() {
        for attr in FILTER_KEY_ATTRIBUTES {
            let event = ToggleEvent {
                payload_filter_key: None,
                checked: Some(true),
                path: vec![EventNode::new("now-toggle").with_attribute(*attr, "k")],
            };
            assert_eq!(resolve_filter_key(&event).as_deref(), Some("k"), "attribute {attr}");
        }
    }

    #[test]
    fn falls_back_to_target_attributes() {
        let event = ToggleEvent {
            payload_filter_key: None,
            checked: Some(true),
            path: vec![
                EventNode::new("input").with_attribute("filter-key", "target-key"),
                EventNode::new("div"),
            ],
        };
        assert_eq!(resolve_filter_key(&event).as_deref(), Some("target-key"));
    }

    #[test]
    fn unresolved_events_are_dropped() {
        let no_key = ToggleEvent {
            payload_filter_key: None,
            checked: Some(true),
            path: vec![EventNode::new("now-toggle")],
        };
        assert_eq!(filter_toggle(&no_key), None);

        let no_checked = ToggleEvent {
            payload_filter_key: Some("P1-activefilter".into()),
            checked: None,
            path: Vec::new(),
        };
        assert_eq!(filter_toggle(&no_checked), None);
    }

    #[test]
    fn resolved_event_becomes_filter_toggle() {
        let event = ToggleEvent {
            payload_filter_key: None,
            checked: Some(false),
            path: vec![EventNode::new("now-toggle").with_attribute("filter-key", "P1-activefilter")],
        };
        assert_eq!(
            filter_toggle(&event),
            Some(UiEvent::ActiveFilterToggled {
                filter_key: "P1-activefilter".into(),
                checked: false,
            })
        );
    }
}
