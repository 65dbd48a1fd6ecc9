use super::AnalyzeError;
use crate::protocols::{ClassificationResult, PoliticalLeaning};
use serde_json::Value;

/// Decode and check a structured-mode reply.
///
/// On success the decoded object is returned untouched so callers pass the
/// model's answer through verbatim.
pub fn validate_structured(raw: &str) -> Result<Value, AnalyzeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AnalyzeError::InvalidModelJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or(AnalyzeError::InvalidModelStructure)?;

    let is_political = object
        .get("is_political")
        .and_then(Value::as_bool)
        .ok_or(AnalyzeError::InvalidModelStructure)?;

    let leaning = object.get("political_leaning").unwrap_or(&Value::Null);

    if is_political {
        if leaning
            .as_str()
            .and_then(PoliticalLeaning::from_label)
            .is_none()
        {
            return Err(AnalyzeError::InvalidLeaning);
        }
    } else if !leaning.is_null() {
        return Err(AnalyzeError::InvalidLeaning);
    }

    Ok(value)
}

/// Check a single-token reply and synthesize the structured result.
pub fn validate_single_token(raw: &str) -> Result<Value, AnalyzeError> {
    raw.parse::<PoliticalLeaning>()
        .map(|leaning| ClassificationResult::political(leaning).to_value())
        .map_err(AnalyzeError::UnexpectedLabel)
}
