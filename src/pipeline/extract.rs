//! Record extraction.
//!
//! Maps a raw database page to the four display fields. Each field is read
//! on its own; any absent, malformed or blank value falls back to a fixed
//! literal instead of failing the record.

use serde_json::Value;

use crate::models::{Config, PropertyNames, RawRecord, TaskFields, TaskRecord};

/// Fallback text for each display field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallbacks {
    pub title: String,
    pub status: String,
    pub owner: String,
    pub due: String,
}

impl Default for Fallbacks {
    fn default() -> Self {
        let messages = crate::models::MessageConfig::default();
        Self {
            title: messages.no_title,
            status: messages.no_status,
            owner: messages.unassigned,
            due: messages.no_due_date,
        }
    }
}

/// Extracts [`TaskFields`] from raw records.
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    properties: PropertyNames,
    fallbacks: Fallbacks,
}

impl RecordExtractor {
    pub fn new(properties: PropertyNames, fallbacks: Fallbacks) -> Self {
        Self {
            properties,
            fallbacks,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let messages = &config.messages;
        Self::new(
            config.notion.properties.clone(),
            Fallbacks {
                title: messages.no_title.clone(),
                status: messages.no_status.clone(),
                owner: messages.unassigned.clone(),
                due: messages.no_due_date.clone(),
            },
        )
    }

    /// Extract a record. Never fails.
    pub fn extract(&self, raw: &RawRecord) -> TaskRecord {
        TaskRecord {
            id: raw.id.clone(),
            fields: self.fields(&raw.properties),
        }
    }

    /// Extract the display fields from a properties object.
    pub fn fields(&self, properties: &Value) -> TaskFields {
        let props = &self.properties;
        TaskFields {
            title: text_or(
                property_text(properties, &props.title, &["/title/0/plain_text"]),
                &self.fallbacks.title,
            ),
            // Single-select and Notion's dedicated status type share a shape
            status: text_or(
                property_text(properties, &props.status, &["/select/name", "/status/name"]),
                &self.fallbacks.status,
            ),
            owner: text_or(
                property_text(properties, &props.owner, &["/people/0/name"]),
                &self.fallbacks.owner,
            ),
            due: text_or(
                property_text(properties, &props.due, &["/date/start"]),
                &self.fallbacks.due,
            ),
        }
    }
}

/// Read a trimmed, non-empty string from the first matching location
/// under a property.
fn property_text<'a>(properties: &'a Value, property: &str, tails: &[&str]) -> Option<&'a str> {
    let property = properties.get(property)?;
    tails
        .iter()
        .filter_map(|tail| property.pointer(tail))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value.unwrap_or(fallback).to_string()
}
