use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// Failure of a model call, keeping whatever the model sent back so it can
/// be logged next to the error.
///
/// `stage` names where it broke: `http` for non-2xx replies, `parse_*` for
/// replies that arrived but could not be turned into a record.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    pub fn unparseable(
        provider: Provider,
        stage: &'static str,
        detail: String,
        raw_output: &str,
    ) -> Self {
        Self {
            provider,
            stage,
            detail,
            raw_output: Some(raw_output.to_string()),
            raw_response_json: None,
        }
    }

    /// The reply arrived but held nothing usable.
    pub fn is_parse_failure(&self) -> bool {
        self.stage.starts_with("parse")
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} failed: {}", self.provider, self.stage, self.detail)?;
        if let Some(raw) = &self.raw_output {
            write!(f, " (reply was {} chars)", raw.chars().count())?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmDiagnosticsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stages_are_told_apart_from_transport() {
        let parse = LlmDiagnosticsError::unparseable(
            Provider::Anthropic,
            "parse_article",
            "no JSON object found".to_string(),
            "Sorry, I can't.",
        );
        assert!(parse.is_parse_failure());
        assert_eq!(
            parse.to_string(),
            "Anthropic parse_article failed: no JSON object found (reply was 15 chars)"
        );

        let http = LlmDiagnosticsError {
            stage: "http",
            raw_output: None,
            ..parse
        };
        assert!(!http.is_parse_failure());
        assert!(!http.to_string().contains("reply was"));
    }
}
