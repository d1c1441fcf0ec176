// Dashboard configuration domain model
use serde_json::{json, Map, Value};

/// An opaque dashboard document (views, cards, ...). The content is never
/// validated, only copied, encoded and restored.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig(Value);

impl DashboardConfig {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Minimal well-formed dashboard: one view and no cards
    pub fn empty_dashboard() -> Self {
        Self(json!({
            "views": [
                {
                    "title": "Home",
                    "cards": []
                }
            ]
        }))
    }

    /// A document counts as empty unless it is a mapping with at least one key
    pub fn is_empty(&self) -> bool {
        self.0.as_object().map(Map::is_empty).unwrap_or(true)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Render as the block-style human readable document used for derived backups
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Value>(text).map(Self)
    }
}
