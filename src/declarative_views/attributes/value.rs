//! Extracted attribute values.

use serde_json::Value;
use std::collections::BTreeMap;

/// The value of one registered data attribute, as read from a node.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A primitive attribute, exactly as written.
    Text(String),

    /// A JSON attribute, parsed.
    Json(Value),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            AttrValue::Json(v) => Some(v),
            AttrValue::Text(_) => None,
        }
    }

    /// Flattens a JSON object into string pairs, the shape element attributes
    /// take. Non-string scalars are stringified; nulls and nested values are
    /// dropped.
    pub fn to_attribute_map(&self) -> Option<BTreeMap<String, String>> {
        let Value::Object(map) = self.as_json()? else {
            return None;
        };
        Some(
            map.iter()
                .filter_map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Bool(b) => b.to_string(),
                        Value::Number(n) => n.to_string(),
                        Value::Null | Value::Array(_) | Value::Object(_) => return None,
                    };
                    Some((key.clone(), text))
                })
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Text(s) => Value::String(s.clone()),
            AttrValue::Json(v) => v.clone(),
        }
    }
}

/// All registered attribute values found on a node, keyed by camel name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataAttributes {
    values: BTreeMap<String, AttrValue>,
}

impl DataAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, camel_name: String, value: AttrValue) {
        self.values.insert(camel_name, value);
    }

    pub fn get(&self, camel_name: &str) -> Option<&AttrValue> {
        self.values.get(camel_name)
    }

    pub fn text(&self, camel_name: &str) -> Option<String> {
        self.get(camel_name)
            .and_then(AttrValue::as_text)
            .map(str::to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
