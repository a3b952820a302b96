use serde_json::{Map, Value};

use crate::aggregate;
use crate::metrics;
use crate::models::{Configuration, Period, ReportPayload};

/// Runs every stage of the pipeline over the submitted periods.
pub fn build_payload(configuration: Configuration, periods: &[Period]) -> ReportPayload {
    let intermediate_results = aggregate::intermediate_results(periods);
    let final_results = aggregate::final_results(periods, &intermediate_results);
    let overall_results = aggregate::overall_results(&intermediate_results);

    tracing::info!(
        periods = periods.len(),
        disciplines = overall_results.len(),
        "computed report tables"
    );

    ReportPayload {
        configuration,
        tabs_data: metrics::enhance_periods(periods),
        intermediate_results,
        final_results,
        overall_results,
    }
}

/// Turns blank strings into nulls throughout a JSON document.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::String(text) if text.trim().is_empty() => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| (key, sanitize(field)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

pub fn to_sanitized_json(payload: &ReportPayload) -> serde_json::Result<Value> {
    serde_json::to_value(payload).map(sanitize)
}

/// Reports whether any cell outside the final tables is empty or a zero score.
pub fn has_invalid_values(payload: &Value) -> bool {
    fn check(value: &Value, top_level: bool) -> bool {
        match value {
            Value::Array(items) => items.iter().any(|item| check(item, false)),
            Value::Object(fields) => fields
                .iter()
                .filter(|(key, _)| !(top_level && key.as_str() == "finalResults"))
                .any(|(_, field)| check(field, false)),
            Value::Null => true,
            Value::String(text) => text == "0.00",
            _ => false,
        }
    }

    check(payload, true)
}
