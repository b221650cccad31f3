mod palette;

pub use palette::{Category, Paint, Palette};

use crate::models::{Event, Field, StructuredRecord, CALLER_KEY, STACKTRACE_KEY};
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Rendered in place of a missing or unresolvable timestamp.
const ZERO_TIME: &str = "0001-01-01 00:00:00";

const TRACEBACK_TOP: &str = "╭────────────────Traceback──────────";
const TRACEBACK_SIDE: &str = "│";
const TRACEBACK_BOTTOM: &str = "╰───────────────────────────────────";

/// Renders one event into output lines. Raw events come back verbatim; a
/// structured event yields its summary line followed by the traceback block
/// when it carries a non-empty `stacktrace`.
pub fn render(event: &Event, palette: &Palette) -> Vec<String> {
    match &event.structured {
        Some(record) => render_structured(record, palette),
        None => vec![event.raw.clone()],
    }
}

fn render_structured(record: &StructuredRecord, palette: &Palette) -> Vec<String> {
    let (level, _) = palette.level_label(&record.level);

    let mut caller = None;
    let mut stacktrace = None;
    let mut pairs = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        match field.key.as_str() {
            CALLER_KEY => caller = reserved_str(field),
            STACKTRACE_KEY => stacktrace = reserved_str(field),
            _ => pairs.push(format!(
                "{}={}",
                palette.key.paint(&field.key),
                palette.value.paint(&value_text(&field.value))
            )),
        }
    }
    // Every pair shares the same colour prefix, so this orders by key, then value
    pairs.sort();

    let time = record
        .time
        .map_or_else(|| ZERO_TIME.to_string(), |t| t.format(TIME_FORMAT).to_string());

    let mut lines = vec![format!(
        "{} [{}] {}\t[{}] {}",
        palette.time.paint(&time),
        level,
        record.message,
        palette.caller.paint(caller.unwrap_or_default()),
        pairs.join("\t")
    )];

    if let Some(trace) = stacktrace.filter(|t| !t.is_empty()) {
        lines.extend(traceback(trace, palette.for_category(Category::Error)));
    }
    lines
}

fn traceback(trace: &str, paint: &Paint) -> Vec<String> {
    let side = paint.paint(TRACEBACK_SIDE);
    let mut block = Vec::with_capacity(trace.lines().count() + 2);
    block.push(paint.paint(TRACEBACK_TOP));
    block.extend(trace.split('\n').map(|segment| format!("{side}{segment}")));
    block.push(paint.paint(TRACEBACK_BOTTOM));
    block
}

/// `caller` and `stacktrace` are only honoured as strings.
fn reserved_str(field: &Field) -> Option<&str> {
    match &field.value {
        Value::String(s) => Some(s),
        other => {
            debug!("Ignoring non-string {} field: {}", field.key, other);
            None
        }
    }
}

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_line(input: &str) -> Vec<String> {
        render(&Event::parse(input.as_bytes()), &Palette::plain())
    }

    fn record_with(fields: &[(&str, Value)]) -> Event {
        let mut event = Event::new(String::new());
        event.structured = Some(StructuredRecord {
            fields: fields
                .iter()
                .map(|(key, value)| Field {
                    key: key.to_string(),
                    value: value.clone(),
                })
                .collect(),
            ..StructuredRecord::default()
        });
        event
    }

    #[test]
    fn test_raw_line_is_verbatim() {
        assert_eq!(render_line("plain text error"), vec!["plain text error"]);
        assert_eq!(
            render(&Event::parse(b"  {broken"), &Palette::default()),
            vec!["  {broken"]
        );
    }

    #[test]
    fn test_structured_line_layout() {
        let lines = render_line(
            r#"{"ts":"2023-01-02T15:04:05Z","msg":"started","level":"info","user":"bob","port":8080,"caller":"main.go:12"}"#,
        );
        assert_eq!(
            lines,
            vec!["2023-01-02 15:04:05 [INFO] started\t[main.go:12] port=8080\tuser=bob"]
        );
    }

    #[test]
    fn test_time_keeps_its_offset() {
        let lines = render_line(r#"{"ts":"2023-01-02T17:04:05+02:00","msg":"m"}"#);
        assert!(lines[0].starts_with("2023-01-02 17:04:05 "));
    }

    #[test]
    fn test_missing_pieces_render_as_defaults() {
        assert_eq!(render_line(r#"{}"#), vec!["0001-01-01 00:00:00 [] \t[] "]);
        assert_eq!(
            render_line(r#"{"ts":"soon","msg":"x"}"#),
            vec!["0001-01-01 00:00:00 [] x\t[] ts=soon"]
        );
    }

    #[test]
    fn test_unknown_level_keeps_label() {
        let lines = render_line(r#"{"level":"trace","msg":"deep"}"#);
        assert!(lines[0].contains(" [TRAC] deep"));
    }

    #[test]
    fn test_every_field_rendered_once_and_sorted() {
        let lines = render_line(
            r#"{"msg":"m","level":"debug","zeta":1,"alpha":"a","mid":null,"beta":true}"#,
        );
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        for key in ["alpha", "beta", "mid", "zeta"] {
            assert_eq!(line.matches(&format!("{key}=")).count(), 1, "key {key}");
        }
        assert!(line.ends_with("alpha=a\tbeta=true\tmid=null\tzeta=1"));
        assert!(line.contains(" [DEBU] m\t"));
    }

    #[test]
    fn test_sorted_with_colors() {
        let event = Event::parse(br#"{"msg":"m","charlie":"3","alpha":"1","bravo":"2"}"#);
        let line = render(&event, &Palette::default()).remove(0);
        let alpha = line.find("alpha").unwrap();
        let bravo = line.find("bravo").unwrap();
        let charlie = line.find("charlie").unwrap();
        assert!(alpha < bravo && bravo < charlie);
    }

    #[test]
    fn test_equal_keys_ordered_by_value() {
        let event = record_with(&[
            ("k", Value::from("b")),
            ("k", Value::from("a")),
            ("j", Value::from("z")),
        ]);
        let lines = render(&event, &Palette::plain());
        assert!(lines[0].ends_with("j=z\tk=a\tk=b"));
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let lines = render_line(r#"{"obj":{"a":1},"arr":[1,"x"],"ratio":0.5}"#);
        assert!(lines[0].ends_with("arr=[1,\"x\"]\tobj={\"a\":1}\tratio=0.5"));
    }

    #[test]
    fn test_stacktrace_block() {
        let lines = render_line(
            r#"{"msg":"boom","level":"info","stacktrace":"main.run\n\tmain.go:10\nmain.main","k":"v"}"#,
        );
        assert_eq!(
            lines,
            vec![
                "0001-01-01 00:00:00 [INFO] boom\t[] k=v".to_string(),
                TRACEBACK_TOP.to_string(),
                "│main.run".to_string(),
                "│\tmain.go:10".to_string(),
                "│main.main".to_string(),
                TRACEBACK_BOTTOM.to_string(),
            ]
        );
        assert!(!lines[0].contains("stacktrace"));
    }

    #[test]
    fn test_stacktrace_uses_error_color() {
        let palette = Palette::default();
        let event = Event::parse(br#"{"level":"info","stacktrace":"frame"}"#);
        let lines = render(&event, &palette);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], palette.error.paint(TRACEBACK_TOP));
        assert_eq!(lines[2], format!("{}frame", palette.error.paint(TRACEBACK_SIDE)));
        assert_eq!(lines[3], palette.error.paint(TRACEBACK_BOTTOM));
    }

    #[test]
    fn test_empty_stacktrace_has_no_block() {
        assert_eq!(render_line(r#"{"stacktrace":""}"#).len(), 1);
    }

    #[test]
    fn test_non_string_reserved_fields_are_dropped() {
        let lines = render_line(r#"{"caller":12,"stacktrace":{"frames":[]},"k":"v"}"#);
        assert_eq!(lines, vec!["0001-01-01 00:00:00 [] \t[] k=v"]);
    }
}
