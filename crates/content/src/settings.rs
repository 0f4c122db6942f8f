//! Site settings: a flat map of keys to structured values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bridgecms_core::ValidationErrors;

pub const MAX_KEY_LEN: usize = 64;

/// A setting value. JSON `null` has no representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<SettingValue>),
    Map(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    /// Convert arbitrary JSON, failing on `null` anywhere in the tree.
    pub fn from_json(value: Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect::<Option<BTreeMap<_, _>>>()?,
            ),
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Stored setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: SettingValue,
    pub updated_at: DateTime<Utc>,
}

/// A validated batch of settings writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    entries: BTreeMap<String, SettingValue>,
}

impl SettingsUpdate {
    /// Validate every key and value before anything is written.
    pub fn validate(raw: BTreeMap<String, Value>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut entries = BTreeMap::new();

        for (key, value) in raw {
            if !is_valid_key(&key) {
                errors.push(
                    key.clone(),
                    format!("key must be 1-{MAX_KEY_LEN} characters of letters, digits, '_', '-' or '.'"),
                );
                continue;
            }
            match SettingValue::from_json(value) {
                Some(v) => {
                    entries.insert(key, v);
                }
                None => errors.push(key, "value must not be null"),
            }
        }

        errors.into_result()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stamp every entry with the write time.
    pub fn into_settings(self, now: DateTime<Utc>) -> Vec<Setting> {
        self.entries
            .into_iter()
            .map(|(key, value)| Setting { key, value, updated_at: now })
            .collect()
    }
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().count() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
