// Copyright (c) 2025 - Cowboy AI, Inc.
//! Runtime values
//!
//! Everything a program computes, every operand it carries, and every event
//! payload is a [`Value`]. Handles into the reactive graph ([`SignalId`]),
//! event sources ([`SourceId`]) and host elements ([`ElementId`]) are values
//! too, so they can flow through programs like any other data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node in the reactive graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId(pub(crate) usize);

/// Handle to an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub(crate) usize);

/// Handle to an element owned by the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub(crate) usize);

impl SignalId {
    /// Arena slot of the node
    pub fn index(self) -> usize {
        self.0
    }
}

impl SourceId {
    /// Arena slot of the source
    pub fn index(self) -> usize {
        self.0
    }
}

impl ElementId {
    /// Slot of the element in its document
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal#{}", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// A dynamically shaped value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absence of a meaningful result
    #[default]
    Unit,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Text
    Text(String),
    /// Ordered list
    List(Vec<Value>),
    /// Record with ordered keys
    Record(BTreeMap<String, Value>),
    /// Host element handle
    Element(ElementId),
    /// Event source handle
    Source(SourceId),
    /// Reactive node handle
    Signal(SignalId),
}

/// Shape of a [`Value`], used to declare instruction results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Accepts every shape
    Any,
    Unit,
    Bool,
    Number,
    Text,
    List,
    Record,
    Element,
    Source,
    Signal,
}

impl ValueKind {
    /// Whether a value of shape `other` satisfies this declaration
    pub fn admits(self, other: ValueKind) -> bool {
        self == ValueKind::Any || self == other
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Any => "any",
            ValueKind::Unit => "unit",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::List => "list",
            ValueKind::Record => "record",
            ValueKind::Element => "element",
            ValueKind::Source => "source",
            ValueKind::Signal => "signal",
        };
        f.write_str(name)
    }
}

const OK_KEY: &str = "ok";
const ERR_KEY: &str = "err";

impl Value {
    /// Shape of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
            Value::Record(_) => ValueKind::Record,
            Value::Element(_) => ValueKind::Element,
            Value::Source(_) => ValueKind::Source,
            Value::Signal(_) => ValueKind::Signal,
        }
    }

    /// Text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Record from key/value pairs
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Successful outcome, `{ "ok": value }`
    ///
    /// Host lookups that may legitimately fail answer with an outcome
    /// record; `require_outcome` turns it into a value or a raised failure.
    pub fn ok(value: impl Into<Value>) -> Self {
        Value::record([(OK_KEY, value.into())])
    }

    /// Failed outcome, `{ "err": payload }`
    pub fn err(payload: impl Into<Value>) -> Self {
        Value::record([(ERR_KEY, payload.into())])
    }

    /// Read an outcome record back
    ///
    /// Returns `None` when the value is not a one-key `ok`/`err` record.
    pub fn into_outcome(self) -> Option<Result<Value, Value>> {
        let Value::Record(mut fields) = self else {
            return None;
        };
        if fields.len() != 1 {
            return None;
        }
        if let Some(value) = fields.remove(OK_KEY) {
            return Some(Ok(value));
        }
        fields.remove(ERR_KEY).map(Err)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<SignalId> {
        match self {
            Value::Signal(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_source(&self) -> Option<SourceId> {
        match self {
            Value::Source(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Value::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the value is, or contains, a signal handle
    pub fn is_reactive(&self) -> bool {
        match self {
            Value::Signal(_) => true,
            Value::List(items) => items.iter().any(Value::is_reactive),
            Value::Record(fields) => fields.values().any(Value::is_reactive),
            _ => false,
        }
    }

    /// Append every signal handle reachable from this value, without duplicates
    pub fn collect_signals(&self, out: &mut Vec<SignalId>) {
        match self {
            Value::Signal(id) => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            Value::List(items) => items.iter().for_each(|v| v.collect_signals(out)),
            Value::Record(fields) => fields.values().for_each(|v| v.collect_signals(out)),
            _ => {}
        }
    }

    /// Loose truthiness used by conditional instructions
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Unit => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Convert to JSON; handles become `{ "signal": n }` style objects
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Unit => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Element(id) => serde_json::json!({ "element": id.0 }),
            Value::Source(id) => serde_json::json!({ "source": id.0 }),
            Value::Signal(id) => serde_json::json!({ "signal": id.0 }),
        }
    }
}

/// Numbers print without a trailing `.0` when integral
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    format!("{n}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Element(id) => write!(f, "{id}"),
            Value::Source(id) => write!(f, "{id}"),
            Value::Signal(id) => write!(f, "{id}"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<SignalId> for Value {
    fn from(id: SignalId) -> Self {
        Value::Signal(id)
    }
}

impl From<SourceId> for Value {
    fn from(id: SourceId) -> Self {
        Value::Source(id)
    }
}

impl From<ElementId> for Value {
    fn from(id: ElementId) -> Self {
        Value::Element(id)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Unit,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Unit),
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
