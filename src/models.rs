use chrono::{DateTime, FixedOffset};
use serde_json::Value;

/// Key whose string value is rendered in the bracketed caller slot.
pub const CALLER_KEY: &str = "caller";
/// Key whose string value is rendered as a traceback block.
pub const STACKTRACE_KEY: &str = "stacktrace";

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

/// The structured half of an [`Event`].
///
/// `fields` carries every key not consumed as time, message or level. Its order
/// is whatever the JSON map yielded and is not meaningful; the renderer sorts
/// before output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    /// `None` when `ts` was absent or could not be resolved.
    pub time: Option<DateTime<FixedOffset>>,
    pub message: String,
    pub level: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub raw: String,
    pub structured: Option<StructuredRecord>,
}

impl Event {
    pub fn new(raw: String) -> Self {
        Self {
            raw,
            structured: None,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.structured.is_some()
    }
}
