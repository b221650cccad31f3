mod timestamp;

pub use timestamp::resolve_time;

use crate::models::{Event, Field, StructuredRecord};
use serde_json::{Map, Value};

const TIME_KEY: &str = "ts";
const MESSAGE_KEY: &str = "msg";
const LEVEL_KEY: &str = "level";

impl Event {
    /// Builds the event for one input line, classifying it as structured when
    /// it decodes as a JSON object. Anything else stays a raw line.
    pub fn parse(line: &[u8]) -> Self {
        let mut event = Event::new(String::from_utf8_lossy(line).into_owned());
        event.structured = parse_json(line);
        event
    }
}

fn parse_json(line: &[u8]) -> Option<StructuredRecord> {
    let mut map = match serde_json::from_slice::<Value>(line).ok()? {
        Value::Object(map) => map,
        _ => return None,
    };

    let mut record = StructuredRecord::default();

    // A `ts` that does not resolve stays behind as an ordinary field
    if let Some(time) = map.get(TIME_KEY).and_then(resolve_time) {
        record.time = Some(time);
        map.remove(TIME_KEY);
    }
    record.message = take_string(&mut map, MESSAGE_KEY);
    record.level = take_string(&mut map, LEVEL_KEY);

    record.fields = map
        .into_iter()
        .map(|(key, value)| Field { key, value })
        .collect();

    Some(record)
}

/// Removes `key` from the map only when it holds a string.
fn take_string(map: &mut Map<String, Value>, key: &str) -> String {
    match map.remove(key) {
        Some(Value::String(s)) => s,
        Some(other) => {
            map.insert(key.to_string(), other);
            String::new()
        }
        None => String::new(),
    }
}
