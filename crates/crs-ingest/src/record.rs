//! Single applicant records.

use polars::prelude::{Column, DataFrame};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crs_common::format_numeric;

use crate::error::{IngestError, Result};

/// One raw attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Missing,
}

impl RawValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => f.write_str(text),
            RawValue::Number(number) => f.write_str(&format_numeric(*number)),
            RawValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            RawValue::Number(value)
        } else {
            RawValue::Missing
        }
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Missing, Into::into)
    }
}

/// One applicant: field names mapped to raw values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicantRecord {
    fields: Vec<(String, RawValue)>,
}

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Parses a JSON object; numbers, strings and `null` are accepted.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(IngestError::InvalidRecord {
                message: "expected a JSON object".to_string(),
            });
        };
        let mut record = Self::new();
        for (name, value) in map {
            let raw = match value {
                Value::Null => RawValue::Missing,
                Value::String(text) => RawValue::Text(text),
                Value::Number(number) => match number.as_f64() {
                    Some(n) => RawValue::Number(n),
                    None => {
                        return Err(IngestError::InvalidRecord {
                            message: format!("field '{name}' is not a representable number"),
                        });
                    }
                },
                other => {
                    return Err(IngestError::InvalidRecord {
                        message: format!(
                            "field '{name}' must be a number, a string or null, got {}",
                            json_kind(&other)
                        ),
                    });
                }
            };
            record.insert(name, raw);
        }
        Ok(record)
    }

    /// One-row frame: numeric and all-missing fields become float columns,
    /// text fields become string columns. A record without fields is still
    /// one applicant, so the frame keeps a height of 1.
    pub fn to_frame(&self) -> Result<DataFrame> {
        if self.fields.is_empty() {
            return Ok(DataFrame::empty_with_height(1));
        }
        let columns: Vec<Column> = self
            .fields
            .iter()
            .map(|(name, value)| match value {
                RawValue::Text(text) => Column::new(name.as_str().into(), [Some(text.as_str())]),
                RawValue::Number(n) => Column::new(name.as_str().into(), [Some(*n)]),
                RawValue::Missing => Column::new(name.as_str().into(), [None::<f64>]),
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
