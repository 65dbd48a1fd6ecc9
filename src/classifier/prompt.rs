use crate::config::ClassificationMode;
use crate::provider::CompletionParams;

/// Room for one bare label
pub const SINGLE_TOKEN_MAX_TOKENS: u32 = 5;
/// Room for `{"is_political": true, "political_leaning": "centre"}` and some whitespace
pub const STRUCTURED_MAX_TOKENS: u32 = 50;
/// Lowest temperature for deterministic output
pub const TEMPERATURE: f32 = 0.0;

const CLASSIFIER_PREAMBLE: &str = "You are a political ideology classifier. \
Judge the text's perspective by its stance on economics, social issues, the role of government, \
tradition versus change, and hierarchical versus egalitarian values.";

/// Cut `text` to at most `max_chars` characters, never splitting a code point
pub fn truncate_input(text: &str, max_chars: Option<usize>) -> &str {
    match max_chars {
        Some(max) => match text.char_indices().nth(max) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        },
        None => text,
    }
}

pub fn build_prompt(mode: ClassificationMode, text: &str) -> String {
    match mode {
        ClassificationMode::Structured => format!(
            "{CLASSIFIER_PREAMBLE}\n\
First decide whether the text below is political at all. If it is, categorize it as \"left\", \"centre\", or \"right\" leaning.\n\
Respond with a single JSON object and nothing else, in the form \
{{\"is_political\": true or false, \"political_leaning\": \"left\", \"centre\", \"right\" or null}}.\n\
\"political_leaning\" must be null if and only if \"is_political\" is false.\n\
Text to classify:\n{text}"
        ),
        ClassificationMode::SingleToken => format!(
            "{CLASSIFIER_PREAMBLE}\n\
Categorize the text below as \"left\", \"centre\", or \"right\" leaning.\n\
Answer with exactly one word: \"left\", \"centre\", or \"right\". Do not add any explanation or other text.\n\
Text to classify:\n{text}"
        ),
    }
}

pub fn completion_params(mode: ClassificationMode, text: &str) -> CompletionParams {
    let (max_tokens, json_output) = match mode {
        ClassificationMode::Structured => (STRUCTURED_MAX_TOKENS, true),
        ClassificationMode::SingleToken => (SINGLE_TOKEN_MAX_TOKENS, false),
    };

    CompletionParams {
        prompt: build_prompt(mode, text),
        max_tokens,
        temperature: TEMPERATURE,
        json_output,
    }
}
