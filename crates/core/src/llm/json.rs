use crate::domain::article::Article;
use crate::domain::financials::FinancialData;
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Locates the JSON object embedded in a model reply.
///
/// Markdown fences are dropped first, then the span from the first `{` to
/// the last `}` (inclusive) is returned.
pub fn extract_json(text: &str) -> Option<&str> {
    let mut inner = text.trim();
    if inner.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        if let Some((_, after_first)) = inner.split_once('\n') {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
    }

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end < start {
        return None;
    }
    Some(inner[start..=end].trim())
}

pub fn parse_financials(text: &str) -> anyhow::Result<FinancialData> {
    parse_record(text, "financial data")
}

pub fn parse_article(text: &str) -> anyhow::Result<Article> {
    parse_record(text, "article")
}

fn parse_record<T: DeserializeOwned>(text: &str, what: &str) -> anyhow::Result<T> {
    let Some(json_str) = extract_json(text) else {
        bail!("LLM output contains no JSON object for {what}");
    };

    let value = serde_json::from_str::<Value>(json_str)
        .with_context(|| format!("LLM output is not valid JSON for {what}: {json_str}"))?;

    match &value {
        Value::Object(map) if !map.is_empty() => {}
        Value::Object(_) => bail!("LLM output for {what} is an empty JSON object"),
        _ => bail!("LLM output for {what} is not a JSON object"),
    }

    serde_json::from_value::<T>(value)
        .with_context(|| format!("LLM output does not match the {what} schema"))
}
