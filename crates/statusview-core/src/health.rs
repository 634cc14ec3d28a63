use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::primitive_string;

/// Canonical health label shown as a coloured badge.
///
/// Unknown or missing input maps to `Green`. That default is deliberate
/// and downstream consumers rely on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthClass {
    #[default]
    Green,
    Yellow,
    Red,
    Blue,
}

impl HealthClass {
    pub const ALL: &[HealthClass] = &[
        HealthClass::Green,
        HealthClass::Yellow,
        HealthClass::Red,
        HealthClass::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthClass::Green => "green",
            HealthClass::Yellow => "yellow",
            HealthClass::Red => "red",
            HealthClass::Blue => "blue",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HealthClass::Green => "Green",
            HealthClass::Yellow => "Yellow",
            HealthClass::Red => "Red",
            HealthClass::Blue => "Blue",
        }
    }

    /// Exact match on the canonical display names.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "Green" => Some(HealthClass::Green),
            "Yellow" => Some(HealthClass::Yellow),
            "Red" => Some(HealthClass::Red),
            "Blue" => Some(HealthClass::Blue),
            _ => None,
        }
    }

    /// Exact lookup first, then a case-insensitive substring scan.
    /// "amber" counts as yellow.
    pub fn classify(raw: &str) -> Self {
        let key = raw.trim();
        if let Some(class) = Self::parse_str(key) {
            return class;
        }
        let lower = key.to_lowercase();
        if lower.contains("green") {
            HealthClass::Green
        } else if lower.contains("yellow") || lower.contains("amber") {
            HealthClass::Yellow
        } else if lower.contains("red") {
            HealthClass::Red
        } else if lower.contains("blue") {
            HealthClass::Blue
        } else {
            HealthClass::Green
        }
    }
}

impl fmt::Display for HealthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub fn get_health_class(value: &Value) -> HealthClass {
    match value {
        Value::Null => HealthClass::Green,
        Value::String(s) => HealthClass::classify(s),
        other => HealthClass::classify(&primitive_string(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_empty_default_to_green() {
        assert_eq!(get_health_class(&Value::Null), HealthClass::Green);
        assert_eq!(get_health_class(&json!("")), HealthClass::Green);
        assert_eq!(get_health_class(&json!("unknown")), HealthClass::Green);
    }

    #[test]
    fn amber_maps_to_yellow() {
        assert_eq!(get_health_class(&json!("AMBER")), HealthClass::Yellow);
        assert_eq!(get_health_class(&json!("amber - watch")), HealthClass::Yellow);
    }

    #[test]
    fn exact_labels() {
        for class in HealthClass::ALL {
            assert_eq!(get_health_class(&json!(class.display_name())), *class);
        }
        assert_eq!(get_health_class(&json!("  Red  ")), HealthClass::Red);
    }

    #[test]
    fn substring_order_prefers_green() {
        assert_eq!(HealthClass::classify("Dark RED"), HealthClass::Red);
        assert_eq!(HealthClass::classify("green/red"), HealthClass::Green);
        assert_eq!(HealthClass::classify("Blue (on hold)"), HealthClass::Blue);
    }

    #[test]
    fn non_string_values_fall_back_to_green() {
        assert_eq!(get_health_class(&json!(3)), HealthClass::Green);
        assert_eq!(get_health_class(&json!({"display_value": "Red"})), HealthClass::Green);
    }

    #[test]
    fn display_matches_display_name() {
        for class in HealthClass::ALL {
            assert_eq!(format!("{class}"), class.display_name());
        }
    }
}
