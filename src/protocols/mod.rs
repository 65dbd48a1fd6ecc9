pub mod envelope;
pub mod openai;

pub use envelope::{ClassificationResult, PoliticalLeaning, ResponseEnvelope};
