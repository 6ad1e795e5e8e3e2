use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::utils::error::ApiError;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*|\s*```").expect("valid fence regex"));

/// Remove Markdown code fences the model wraps around JSON replies
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

pub fn parse_llm_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned)
        .map_err(|e| ApiError::LlmError(format!("Model reply is not valid JSON: {}", e)))
}
