use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{format_percent_label, parse_date_like, parse_percent_number, DateLike};
use crate::record::ProjectRecord;

/// Planned end date field names, probed in this order. Upstream sources
/// disagree on naming, and the order is relied upon.
pub const PLANNED_END_ALIASES: &[&str] = &[
    "end_date",
    "plannedEndDate",
    "planned_end_date",
    "u_planned_end_date",
    "u_planned_end",
    "plannedEnd",
    "planned_end",
];

/// Approved end date field names, probed in this order.
pub const APPROVED_END_ALIASES: &[&str] = &[
    "endDate",
    "approvedEndDate",
    "approved_end_date",
    "u_approved_end_date",
    "u_approved_end",
    "approvedEnd",
    "approved_end",
];

/// Delays of a day or less are not worth flagging.
pub const DELAY_THRESHOLD_DAYS: i64 = 1;

pub fn planned_end_value(project: &ProjectRecord) -> Option<&Value> {
    project.first_truthy(PLANNED_END_ALIASES)
}

pub fn approved_end_value(project: &ProjectRecord) -> Option<&Value> {
    project.first_truthy(APPROVED_END_ALIASES)
}

/// Calendar days between the planned and approved end dates. Positive means
/// the plan runs past the approved date. `None` if either date is unusable.
pub fn get_delay_days<P, A>(planned: &P, approved: &A) -> Option<i64>
where
    P: DateLike + ?Sized,
    A: DateLike + ?Sized,
{
    let planned = parse_date_like(planned)?;
    let approved = parse_date_like(approved)?;
    Some(planned.signed_duration_since(approved).num_days())
}

/// Delay worth annotating, if any.
pub fn visible_delay(delay_days: Option<i64>) -> Option<i64> {
    delay_days.filter(|d| *d > DELAY_THRESHOLD_DAYS)
}

pub fn is_active_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "1",
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

pub fn is_active_item(item: &Value) -> bool {
    item.get("active").is_some_and(is_active_flag)
}

/// Items shown under the active-only filter setting.
pub fn filter_items(items: &[Value], active_only: bool) -> impl Iterator<Item = &Value> {
    items
        .iter()
        .filter(move |item| !active_only || is_active_item(item))
}

pub fn count_items(items: &[Value], active_only: bool) -> usize {
    filter_items(items, active_only).count()
}

/// Tab badge counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub milestones: usize,
    pub issues: usize,
    pub risks: usize,
    pub history: usize,
}

impl ItemCounts {
    pub fn for_project(project: &ProjectRecord, active_only: bool) -> Self {
        Self {
            milestones: count_items(project.children("milestones"), active_only),
            issues: count_items(project.children("issues"), active_only),
            risks: count_items(project.children("risks"), active_only),
            history: project.children("status_history").len(),
        }
    }
}

/// A percent metric ready for a progress bar.
///
/// `width` is clamped to `[0, 100]`; `over` reports the unclamped value
/// exceeding 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub label: String,
    pub value: f64,
    pub width: f64,
    pub over: bool,
}

impl Progress {
    pub fn from_value(value: &Value) -> Option<Self> {
        let num = parse_percent_number(value)?;
        Some(Self {
            label: format_percent_label(value),
            value: num,
            width: num.clamp(0.0, 100.0),
            over: num > 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delay_days_sign() {
        assert_eq!(get_delay_days("2024-03-10", "2024-03-05"), Some(5));
        assert_eq!(get_delay_days("2024-03-05", "2024-03-10"), Some(-5));
        assert_eq!(get_delay_days("2024-03-05", "2024-03-05"), Some(0));
    }

    #[test]
    fn delay_days_ignore_time_of_day() {
        assert_eq!(
            get_delay_days("2024-03-10 23:59:00", "2024-03-09T00:01:00Z"),
            Some(1)
        );
    }

    #[test]
    fn delay_days_across_dst_boundary() {
        assert_eq!(get_delay_days("2024-04-01", "2024-03-01"), Some(31));
        assert_eq!(get_delay_days("2024-11-10", "2024-10-27"), Some(14));
    }

    #[test]
    fn delay_days_unparseable() {
        assert_eq!(get_delay_days("garbage", "2024-03-05"), None);
        assert_eq!(get_delay_days("2024-03-05", ""), None);
        assert_eq!(get_delay_days(&Value::Null, &json!("2024-03-05")), None);
    }

    #[test]
    fn visible_delay_threshold() {
        assert_eq!(visible_delay(Some(5)), Some(5));
        assert_eq!(visible_delay(Some(1)), None);
        assert_eq!(visible_delay(Some(-3)), None);
        assert_eq!(visible_delay(None), None);
    }

    #[test]
    fn alias_probe_order() {
        let rec = ProjectRecord::from_value(json!({
            "planned_end": "2024-01-03",
            "plannedEndDate": "2024-01-02",
            "end_date": "",
            "approved_end": "2023-12-01",
            "endDate": "2023-12-02"
        }));
        assert_eq!(planned_end_value(&rec), Some(&json!("2024-01-02")));
        assert_eq!(approved_end_value(&rec), Some(&json!("2023-12-02")));
    }

    #[test]
    fn alias_probe_missing() {
        let rec = ProjectRecord::from_value(json!({"projectName": "x"}));
        assert_eq!(planned_end_value(&rec), None);
        assert_eq!(get_delay_days(&planned_end_value(&rec), &approved_end_value(&rec)), None);
    }

    #[test]
    fn active_flag_encodings() {
        for v in [json!(true), json!("true"), json!(1), json!("1")] {
            assert!(is_active_flag(&v), "{v} should be active");
        }
        for v in [
            json!(false),
            json!("false"),
            json!(0),
            json!("yes"),
            json!("TRUE"),
            json!(2),
            Value::Null,
        ] {
            assert!(!is_active_flag(&v), "{v} should be inactive");
        }
        assert!(!is_active_item(&json!({"number": "MS1"})));
    }

    #[test]
    fn counts_follow_filter() {
        let rec = ProjectRecord::from_value(json!({
            "milestones": [{"active": true}, {"active": "false"}, {"active": "1"}],
            "issues": [{"active": 1}, {}],
            "risks": [],
            "status_history": [{"active": false}, {"active": false}]
        }));
        let all = ItemCounts::for_project(&rec, false);
        assert_eq!(all, ItemCounts { milestones: 3, issues: 2, risks: 0, history: 2 });
        let active = ItemCounts::for_project(&rec, true);
        assert_eq!(active, ItemCounts { milestones: 2, issues: 1, risks: 0, history: 2 });
    }

    #[test]
    fn progress_clamps_width_but_flags_over() {
        let over = Progress::from_value(&json!("130%")).unwrap();
        assert_eq!(over.width, 100.0);
        assert!(over.over);
        assert_eq!(over.label, "130%");

        let negative = Progress::from_value(&json!(-20)).unwrap();
        assert_eq!(negative.width, 0.0);
        assert!(!negative.over);

        let exact = Progress::from_value(&json!(100)).unwrap();
        assert_eq!(exact.width, 100.0);
        assert!(!exact.over);

        assert!(Progress::from_value(&json!("n/a")).is_none());
    }

    #[test]
    fn progress_width_always_in_range() {
        for v in [-1e9, -0.5, 0.0, 42.0, 99.9, 100.0, 100.1, 5e6] {
            let p = Progress::from_value(&json!(v)).unwrap();
            assert!((0.0..=100.0).contains(&p.width));
            assert_eq!(p.over, v > 100.0);
        }
    }
}
