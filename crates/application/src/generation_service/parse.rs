use serde_json::Value;

/// Parses the model's text payload into a JSON value.
///
/// Strict parse first; failing that, the largest `{...}` substring (first
/// opening to last closing brace) is tried, since the model sometimes wraps
/// its JSON in prose despite the JSON-only instruction. The two strategies
/// stay separate from schema validation on purpose.
pub(super) fn parse_generation_payload(payload: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => Ok(value),
        Err(_) => extract_embedded_object(payload),
    }
}

fn extract_embedded_object(payload: &str) -> Result<Value, String> {
    match (payload.find('{'), payload.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&payload[start..=end])
            .map_err(|error| format!("embedded JSON object does not parse: {error}")),
        _ => Err("no JSON object found in generation response".to_owned()),
    }
}
