//! Parsing of LLM replies into structured results.
//!
//! Two reply contracts are read back (see `prompt_templates.rs`):
//! - Narration: free text whose verdict line is `VAINQUEUR : <nom>`
//! - Recommendation: a JSON object `{"choix": "<Nom>"}`, optionally fenced

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::prompt_templates::{CHOICE_KEY, VERDICT_SENTINEL};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Response has no \"{}\" key", CHOICE_KEY)]
    MissingChoiceKey,
    #[error("No \"{} : <nom>\" line in the narration", VERDICT_SENTINEL)]
    ExtractionFailed,
    #[error("Narration names several winners: {}", .0.join(", "))]
    ConflictingVerdicts(Vec<String>),
}

// Sentinel token is case-sensitive; surrounding whitespace is not. A line
// without a name after the colon is not a verdict.
static VERDICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*VAINQUEUR[ \t]*:[ \t]*(\S.*?)[ \t]*\r?$").expect("valid regex")
});

static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```$").expect("valid regex")
});

// Regex to remove model-specific special tokens (e.g., from gpt-oss, llama, etc.)
static SPECIAL_TOKENS_RE: LazyLock<Regex> = LazyLock::new(|| {
    // - <|...|> style tokens (common in many models)
    // - [INST], [/INST] tokens (llama)
    // - <<SYS>>, <</SYS>> tokens (llama)
    Regex::new(r"<\|[^|>]+\|>|\[/?INST\]|<</?SYS>>").expect("valid regex")
});

// gpt-oss: <|channel|>analysis<|message|>...<|end|><|start|>assistant<|channel|>final<|message|>CONTENT
static FINAL_CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\|channel\|>final<\|message\|>(.*)$").expect("valid regex"));

/// Remove model-specific special tokens that may leak through from LLM output.
///
/// When a gpt-oss style final-channel marker is present, only the content
/// after it is kept.
pub fn strip_special_tokens(raw: &str) -> String {
    if let Some(content) = FINAL_CONTENT_RE.captures(raw).and_then(|caps| caps.get(1)) {
        return SPECIAL_TOKENS_RE
            .replace_all(content.as_str().trim(), "")
            .to_string();
    }

    SPECIAL_TOKENS_RE.replace_all(raw, "").to_string()
}

/// Winner named by the narration's verdict line.
///
/// Repeated verdict lines are accepted when they agree (ignoring case); the
/// first spelling is returned.
pub fn parse_verdict(narration: &str) -> Result<String, ExtractionError> {
    let cleaned = strip_special_tokens(narration);

    let mut winners: Vec<String> = Vec::new();
    for caps in VERDICT_RE.captures_iter(&cleaned) {
        let Some(name) = caps.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if !winners.iter().any(|w| w.to_lowercase() == name.to_lowercase()) {
            winners.push(name.to_string());
        }
    }

    match winners.len() {
        0 => Err(ExtractionError::ExtractionFailed),
        1 => Ok(winners.remove(0)),
        _ => Err(ExtractionError::ConflictingVerdicts(winners)),
    }
}

/// Lenient form of [`parse_verdict`]: any failure yields `None`.
pub fn extract_verdict(narration: &str) -> Option<String> {
    match parse_verdict(narration) {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::debug!(error = %e, "Verdict not extracted");
            None
        }
    }
}

/// Strip one surrounding markdown code fence, if any.
pub fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    JSON_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

/// Name chosen by a recommendation reply, returned exactly as written.
pub fn extract_choice(reply: &str) -> Result<String, ExtractionError> {
    let cleaned = strip_special_tokens(reply);
    let value: Value = serde_json::from_str(strip_json_fence(&cleaned))
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

    let Value::Object(object) = value else {
        return Err(ExtractionError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    match object.get(CHOICE_KEY) {
        None => Err(ExtractionError::MissingChoiceKey),
        Some(Value::String(choice)) => Ok(choice.clone()),
        Some(_) => Err(ExtractionError::MalformedResponse(format!(
            "\"{}\" must be a string",
            CHOICE_KEY
        ))),
    }
}
