use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryDocument {
    pub id: Option<String>,
    pub payload: Option<Payload>,
    // Epoch milliseconds, assigned by the backend on receipt
    pub publish_received_at: Option<f64>,
}

impl TelemetryDocument {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id");
        }
        if self.payload.is_none() {
            missing.push("payload");
        }
        if self.publish_received_at.is_none() {
            missing.push("publish_received_at");
        }

        missing
    }
}

impl From<Map<String, Value>> for TelemetryDocument {
    fn from(mut object: Map<String, Value>) -> Self {
        let id = match object.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => Some(other.to_string()),
        };

        let payload = match object.remove("payload") {
            Some(Value::Object(payload)) => Some(Payload::from(payload)),
            _ => None,
        };

        let publish_received_at = object.get("publish_received_at").and_then(Value::as_f64);

        Self {
            id,
            payload,
            publish_received_at,
        }
    }
}

/// Device payload: the fields the dashboard knows how to present, plus
/// everything else untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub heart_beat_rate: Option<Number>,
    // Epoch seconds, set by the device
    pub timestamp: Option<Number>,
    pub extra: Map<String, Value>,
    // As received, in arrival order
    raw: Map<String, Value>,
}

impl Payload {
    pub fn timestamp_ms(&self) -> Option<f64> {
        self.timestamp
            .as_ref()
            .and_then(Number::as_f64)
            .map(|seconds| seconds * 1000.0)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|err| format!("<{err}>"))
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(mut fields: Map<String, Value>) -> Self {
        let raw = fields.clone();
        let heart_beat_rate = take_number(&mut fields, "heartBeatRate");
        let timestamp = take_number(&mut fields, "timestamp");

        Self {
            heart_beat_rate,
            timestamp,
            extra: fields,
            raw,
        }
    }
}

// Non-numeric values stay in `extra` untouched
fn take_number(fields: &mut Map<String, Value>, key: &str) -> Option<Number> {
    if !fields.get(key).is_some_and(Value::is_number) {
        return None;
    }

    match fields.remove(key) {
        Some(Value::Number(number)) => Some(number),
        _ => None,
    }
}
