//! Backward-compatibility rewrites applied to raw payloads before decoding.

use serde_json::{Map, Value};

use crate::error::CloudStackError;

const PORT_FIELDS: [&str; 2] = ["endport", "startport"];

/// Rewrites the two fields whose wire type drifts between platform versions.
///
/// - `success` sent as the text `"true"`/`"false"` becomes a boolean
/// - a numeric `ostypeid` becomes its integer text
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::compat::coerce_record;
/// use serde_json::json;
///
/// let mut record = json!({"success": "true", "ostypeid": 142})
///     .as_object()
///     .cloned()
///     .unwrap();
/// coerce_record(&mut record);
/// assert_eq!(record["success"], json!(true));
/// assert_eq!(record["ostypeid"], json!("142"));
/// ```
pub fn coerce_record(record: &mut Map<String, Value>) {
    if let Some(Value::String(text)) = record.get("success") {
        let flag = text == "true";
        record.insert("success".to_string(), Value::Bool(flag));
    }

    if let Some(Value::Number(number)) = record.get("ostypeid") {
        let text = match number.as_i64() {
            Some(i) => i.to_string(),
            None => (number.as_f64().unwrap_or_default() as i64).to_string(),
        };
        record.insert("ostypeid".to_string(), Value::String(text));
    }
}

/// Converts string-typed `startport`/`endport` values to integers.
///
/// Handles both a single rule object and a list response carrying rules
/// under `firewallrule`.
///
/// ## Errors
///
/// Returns [`CloudStackError::Compat`] if a port string is not an integer.
pub fn coerce_firewall_ports(payload: &mut Value) -> Result<(), CloudStackError> {
    let Some(object) = payload.as_object_mut() else {
        return Ok(());
    };

    if let Some(rules) = object.get_mut("firewallrule") {
        if let Some(rules) = rules.as_array_mut() {
            for rule in rules.iter_mut().filter_map(Value::as_object_mut) {
                coerce_ports(rule)?;
            }
        }
        return Ok(());
    }

    coerce_ports(object)
}

fn coerce_ports(rule: &mut Map<String, Value>) -> Result<(), CloudStackError> {
    for field in PORT_FIELDS {
        if let Some(Value::String(text)) = rule.get(field) {
            let port: i64 = text.trim().parse().map_err(|_| CloudStackError::Compat {
                field: field.to_string(),
                value: text.clone(),
            })?;
            rule.insert(field.to_string(), Value::from(port));
        }
    }
    Ok(())
}

/// Replaces the payload with the only element of `payload[field]` when that
/// list has exactly one element; otherwise returns it unchanged.
pub fn collapse_single_rule(payload: Value, field: &str) -> Value {
    match payload.get(field).and_then(Value::as_array) {
        Some(rules) if rules.len() == 1 => rules[0].clone(),
        _ => payload,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerce_record_leaves_native_types_alone() {
        let mut record = json!({"success": false, "ostypeid": "12"}).as_object().cloned().unwrap();
        coerce_record(&mut record);
        assert_eq!(record["success"], json!(false));
        assert_eq!(record["ostypeid"], json!("12"));
    }

    #[test]
    fn coerce_record_false_text() {
        let mut record = json!({"success": "false"}).as_object().cloned().unwrap();
        coerce_record(&mut record);
        assert_eq!(record["success"], json!(false));
    }

    #[test]
    fn firewall_ports_single_object() {
        let mut payload = json!({"id": "r1", "startport": "22", "endport": "23"});
        coerce_firewall_ports(&mut payload).unwrap();
        assert_eq!(payload["startport"], json!(22));
        assert_eq!(payload["endport"], json!(23));
    }

    #[test]
    fn firewall_ports_list() {
        let mut payload = json!({
            "count": 2,
            "firewallrule": [
                {"id": "r1", "startport": "80", "endport": "80"},
                {"id": "r2", "startport": 443}
            ]
        });
        coerce_firewall_ports(&mut payload).unwrap();
        assert_eq!(payload["firewallrule"][0]["startport"], json!(80));
        assert_eq!(payload["firewallrule"][1]["startport"], json!(443));
        assert_eq!(payload["count"], json!(2));
    }

    #[test]
    fn firewall_ports_reject_garbage() {
        let mut payload = json!({"startport": "ssh"});
        let err = coerce_firewall_ports(&mut payload).unwrap_err();
        assert!(matches!(err, CloudStackError::Compat { field, .. } if field == "startport"));
    }

    #[test]
    fn collapse_only_single_element_lists() {
        let one = json!({"ingressrule": [{"ruleid": "r1"}]});
        assert_eq!(collapse_single_rule(one, "ingressrule"), json!({"ruleid": "r1"}));

        let two = json!({"ingressrule": [{"ruleid": "r1"}, {"ruleid": "r2"}]});
        assert_eq!(collapse_single_rule(two.clone(), "ingressrule"), two);

        let other = json!({"egressrule": [{"ruleid": "r1"}]});
        assert_eq!(collapse_single_rule(other.clone(), "ingressrule"), other);
    }
}
