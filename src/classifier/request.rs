use super::AnalyzeError;
use serde_json::Value;

/// Validated `/analyze` input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub text: String,
}

impl ClassificationRequest {
    /// Parse a raw body; anything that is not JSON is rejected before field checks
    pub fn from_body(body: &[u8]) -> Result<Self, AnalyzeError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| AnalyzeError::NotJson)?;
        Self::from_value(&value)
    }

    /// `text` must be a non-empty string
    pub fn from_value(value: &Value) -> Result<Self, AnalyzeError> {
        match value.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Ok(Self {
                text: text.to_string(),
            }),
            _ => Err(AnalyzeError::MissingText),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_request() {
        let request = ClassificationRequest::from_body(br#"{"text": "I had pasta for lunch."}"#)
            .unwrap();
        assert_eq!(request.text, "I had pasta for lunch.");
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            ClassificationRequest::from_body(b"text=hello"),
            Err(AnalyzeError::NotJson)
        ));
        assert!(matches!(
            ClassificationRequest::from_body(b""),
            Err(AnalyzeError::NotJson)
        ));
    }

    #[test]
    fn test_missing_or_falsy_text() {
        for value in [
            json!({}),
            json!({"text": ""}),
            json!({"text": null}),
            json!({"text": 42}),
            json!({"content": "hello"}),
            json!(["text"]),
            json!("text"),
        ] {
            assert!(
                matches!(
                    ClassificationRequest::from_value(&value),
                    Err(AnalyzeError::MissingText)
                ),
                "expected missing text for {value}"
            );
        }
    }

    #[test]
    fn test_whitespace_text_accepted() {
        let request = ClassificationRequest::from_value(&json!({"text": "  "})).unwrap();
        assert_eq!(request.text, "  ");
    }
}
