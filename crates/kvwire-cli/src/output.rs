//! Reply rendering for terminal and JSON output.

use kvwire_client::PushMessage;
use kvwire_core::Value;

/// Renders one reply value, honoring the `--json` flag.
pub fn render(value: &Value, json: bool) -> String {
    if json {
        to_json(value).to_string()
    } else {
        render_text(value)
    }
}

/// Renders one pushed pub/sub message.
pub fn render_message(message: &PushMessage, json: bool) -> String {
    let payload = String::from_utf8_lossy(&message.payload);
    if json {
        serde_json::json!({
            "channel": message.channel,
            "payload": payload,
        })
        .to_string()
    } else {
        format!("{}: {}", message.channel, payload)
    }
}

fn render_text(value: &Value) -> String {
    match value {
        Value::Null => "(nil)".to_string(),
        Value::Simple(s) => s.clone(),
        Value::Error(e) => format!("(error) {e}"),
        Value::Integer(n) => format!("(integer) {n}"),
        Value::Bulk(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}) {}", i + 1, render_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Simple(s) => serde_json::Value::String(s.clone()),
        Value::Error(e) => serde_json::json!({ "error": e }),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Bulk(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_scalars() {
        assert_eq!(render(&Value::Null, false), "(nil)");
        assert_eq!(render(&Value::Simple("OK".into()), false), "OK");
        assert_eq!(render(&Value::Integer(7), false), "(integer) 7");
        assert_eq!(render(&Value::Bulk(b"hi".to_vec()), false), "hi");
    }

    #[test]
    fn test_text_array_is_numbered() {
        let value = Value::Array(vec![
            Value::Bulk(b"a".to_vec()),
            Value::Bulk(b"b".to_vec()),
        ]);
        assert_eq!(render(&value, false), "1) a\n2) b");
    }

    #[test]
    fn test_json_shapes() {
        assert_eq!(render(&Value::Null, true), "null");
        assert_eq!(render(&Value::Integer(7), true), "7");
        assert_eq!(render(&Value::Bulk(b"hi".to_vec()), true), "\"hi\"");
        let value = Value::Array(vec![Value::Simple("x".into()), Value::Null]);
        assert_eq!(render(&value, true), "[\"x\",null]");
    }

    #[test]
    fn test_message_rendering() {
        let message = PushMessage {
            channel: "news".into(),
            payload: b"hello".to_vec(),
        };
        assert_eq!(render_message(&message, false), "news: hello");
        assert_eq!(
            render_message(&message, true),
            "{\"channel\":\"news\",\"payload\":\"hello\"}"
        );
    }
}
