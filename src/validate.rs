use serde_json::Value;

const REQUIRED_TABLES: [&str; 2] = ["averageScoreTable", "qualityTable"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidReport {
    #[error("report is missing the required 'data' key")]
    MissingData,
    #[error("report is missing the required 'finalResults' key in 'data'")]
    MissingFinalResults,
    #[error("report is missing the required '{0}' key in 'data.finalResults'")]
    MissingFinalTable(&'static str),
    #[error("'{0}' in 'data.finalResults' must be an array")]
    FinalTableNotArray(&'static str),
    #[error("report must contain at least one of 'overallResults' or 'user'")]
    MissingOverallOrUser,
    #[error("'overallResults' in 'data' must be an array")]
    OverallResultsNotArray,
    #[error("'user' must be an object")]
    UserNotObject,
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text.is_empty() || text == "0",
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
    }
}

/// Checks the `{data, user}` envelope handed to exporters and storage.
pub fn validate_document(document: &Value) -> Result<(), InvalidReport> {
    let data = document.get("data");
    if is_empty(data) {
        return Err(InvalidReport::MissingData);
    }

    let final_results = data.and_then(|data| data.get("finalResults"));
    if is_empty(final_results) {
        return Err(InvalidReport::MissingFinalResults);
    }

    for key in REQUIRED_TABLES {
        let table = final_results.and_then(|results| results.get(key));
        if is_empty(table) {
            return Err(InvalidReport::MissingFinalTable(key));
        }
        if !table.is_some_and(Value::is_array) {
            return Err(InvalidReport::FinalTableNotArray(key));
        }
    }

    let overall = data.and_then(|data| data.get("overallResults"));
    let user = document.get("user");
    if is_empty(overall) && is_empty(user) {
        return Err(InvalidReport::MissingOverallOrUser);
    }
    if !is_empty(overall) && !overall.is_some_and(Value::is_array) {
        return Err(InvalidReport::OverallResultsNotArray);
    }
    if !is_empty(user) && !user.is_some_and(Value::is_object) {
        return Err(InvalidReport::UserNotObject);
    }

    Ok(())
}
