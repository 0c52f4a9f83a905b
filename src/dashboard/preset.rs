//! Named dashboard configurations stored by the backend.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Error,
    dashboard::{
        filters::FilterSet,
        widget::{WidgetId, WidgetSize},
    },
};

/// A preset as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, deserialize_with = "object_or_json_string")]
    pub config: PresetConfig,
    #[serde(default, deserialize_with = "object_or_json_string")]
    pub filters: FilterSet,
}

/// The widget layout saved in a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default)]
    pub widgets: Vec<PresetWidget>,
    #[serde(default = "grid_layout")]
    pub layout: String,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            widgets: Vec::new(),
            layout: grid_layout(),
        }
    }
}

fn grid_layout() -> String {
    "grid".to_owned()
}

/// A widget entry in a saved preset.
///
/// The type is kept as the raw string so that a preset naming a widget type
/// this version does not know can still be read. The id is saved with the
/// widget but a loaded preset always gets fresh ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetWidget {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_id"
    )]
    pub id: Option<WidgetId>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: WidgetSize,
}

/// The request body for creating a preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPreset {
    pub name: String,
    pub is_default: bool,
    pub config: PresetConfig,
    pub filters: FilterSet,
}

impl NewPreset {
    /// Create a preset request, trimming `name`.
    ///
    /// # Errors
    /// Returns [Error::EmptyPresetName] if `name` is empty or only whitespace.
    pub fn new(
        name: &str,
        is_default: bool,
        config: PresetConfig,
        filters: FilterSet,
    ) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyPresetName);
        }

        Ok(Self {
            name: name.to_owned(),
            is_default,
            config,
            filters,
        })
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<WidgetId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    Ok(id.and_then(|id| serde_json::from_value(Value::String(id)).ok()))
}

fn lenient_size<'de, D>(deserializer: D) -> Result<WidgetSize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}

/// Accepts either a JSON object or a string holding JSON, and treats `null` as the default.
fn object_or_json_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(T::default()),
        Value::String(text) if text.trim().is_empty() => Ok(T::default()),
        Value::String(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
        other => serde_json::from_value(other).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        Error,
        dashboard::{
            filters::{FilterSet, Period},
            preset::{NewPreset, Preset, PresetConfig, PresetWidget},
            widget::{WidgetId, WidgetSize},
        },
    };

    #[test]
    fn reads_preset_with_unknown_widget_type() {
        let preset: Preset = serde_json::from_value(json!({
            "id": 4,
            "name": "Move week",
            "is_default": true,
            "config": {
                "widgets": [
                    { "id": "widget-1", "type": "total-spent", "title": "Total", "size": "small" },
                    { "id": "widget-2", "type": "weather-map", "title": "Weather", "size": "gigantic" }
                ],
                "layout": "grid"
            },
            "filters": { "period": "week" }
        }))
        .unwrap();

        assert_eq!(preset.config.widgets.len(), 2);
        assert_eq!(preset.config.widgets[0].id, Some(WidgetId::from("widget-1")));
        assert_eq!(preset.config.widgets[1].kind, "weather-map");
        assert_eq!(preset.config.widgets[1].size, WidgetSize::Medium);
        assert_eq!(preset.filters.period, Period::Week);
    }

    #[test]
    fn reads_config_stored_as_string() {
        let preset: Preset = serde_json::from_value(json!({
            "id": 1,
            "name": "Default",
            "config": "{\"widgets\": [{\"type\": \"expense-count\", \"title\": \"Count\"}]}",
            "filters": null
        }))
        .unwrap();

        assert_eq!(
            preset.config,
            PresetConfig {
                widgets: vec![PresetWidget {
                    id: None,
                    kind: "expense-count".to_owned(),
                    title: "Count".to_owned(),
                    size: WidgetSize::Medium,
                }],
                layout: "grid".to_owned(),
            }
        );
        assert_eq!(preset.filters, FilterSet::default());
        assert!(!preset.is_default);
    }

    #[test]
    fn new_preset_trims_name() {
        let preset =
            NewPreset::new("  Road trip ", false, PresetConfig::default(), FilterSet::default())
                .unwrap();

        assert_eq!(preset.name, "Road trip");
    }

    #[test]
    fn new_preset_rejects_blank_name() {
        let result = NewPreset::new("   ", true, PresetConfig::default(), FilterSet::default());

        assert_eq!(result, Err(Error::EmptyPresetName));
    }

    #[test]
    fn new_preset_serializes_backend_shape() {
        let preset = NewPreset::new(
            "Weekly",
            true,
            PresetConfig {
                widgets: vec![PresetWidget {
                    id: None,
                    kind: "category-pie".to_owned(),
                    title: "Categories".to_owned(),
                    size: WidgetSize::Large,
                }],
                layout: "grid".to_owned(),
            },
            FilterSet::default(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&preset).unwrap(),
            json!({
                "name": "Weekly",
                "is_default": true,
                "config": {
                    "widgets": [{ "type": "category-pie", "title": "Categories", "size": "large" }],
                    "layout": "grid"
                },
                "filters": { "period": "month" }
            })
        );
    }

    #[test]
    fn saved_widget_ids_round_trip() {
        let preset = NewPreset::new(
            "Weekly",
            false,
            PresetConfig {
                widgets: vec![PresetWidget {
                    id: Some(WidgetId::from("widget-1718000000000-3")),
                    kind: "total-spent".to_owned(),
                    title: "Total".to_owned(),
                    size: WidgetSize::Small,
                }],
                layout: "grid".to_owned(),
            },
            FilterSet::default(),
        )
        .unwrap();

        let mut json = serde_json::to_value(&preset).unwrap();
        assert_eq!(json["config"]["widgets"][0]["id"], "widget-1718000000000-3");

        json["id"] = json!(9);
        let stored: Preset = serde_json::from_value(json).unwrap();

        assert_eq!(stored.config, preset.config);
    }

    #[test]
    fn numeric_widget_ids_are_read_as_text() {
        let config: PresetConfig = serde_json::from_value(json!({
            "widgets": [{ "id": 17, "type": "expense-count" }]
        }))
        .unwrap();

        assert_eq!(config.widgets[0].id, Some(WidgetId::from("17")));
    }
}
