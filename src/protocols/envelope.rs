use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Categorical leaning assigned by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoliticalLeaning {
    Left,
    Centre,
    Right,
}

impl PoliticalLeaning {
    pub const ALL: [PoliticalLeaning; 3] = [
        PoliticalLeaning::Left,
        PoliticalLeaning::Centre,
        PoliticalLeaning::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoliticalLeaning::Left => "left",
            PoliticalLeaning::Centre => "centre",
            PoliticalLeaning::Right => "right",
        }
    }

    /// Exact match against the lowercase label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|leaning| leaning.as_str() == label)
    }
}

impl FromStr for PoliticalLeaning {
    type Err = String;

    /// Lenient parse used for bare-label replies: surrounding whitespace and case are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::from_label(&normalized).ok_or(normalized)
    }
}

impl fmt::Display for PoliticalLeaning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed classification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_political: bool,
    pub political_leaning: Option<PoliticalLeaning>,
}

impl ClassificationResult {
    pub fn political(leaning: PoliticalLeaning) -> Self {
        Self {
            is_political: true,
            political_leaning: Some(leaning),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "is_political": self.is_political,
            "political_leaning": self.political_leaning,
        })
    }
}

/// Uniform wrapper for every `/analyze` response
///
/// Exactly one of `data` and `error` is set; both keys are always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
