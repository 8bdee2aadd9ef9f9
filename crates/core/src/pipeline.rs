use crate::config::Settings;
use crate::domain::demo;
use crate::domain::report::{Report, ReportSource};
use crate::llm::anthropic::AnthropicClient;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{self, LlmClient};
use std::fmt;

pub const MIN_TRANSCRIPT_CHARS: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub demo_mode: bool,
    pub api_key: Option<String>,
    pub transcript: String,
}

impl GenerateRequest {
    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            ..Self::default()
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Terminal failure of one generate action. Every variant maps to a message
/// the user can act on; nothing is retried.
#[derive(Debug)]
pub enum PipelineError {
    MissingApiKey,
    TranscriptTooShort { chars: usize },
    ExtractionFailed(anyhow::Error),
    ArticleFailed(anyhow::Error),
    Llm(anyhow::Error),
}

impl PipelineError {
    /// Input problems the user fixes in the form, as opposed to upstream failures.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingApiKey | PipelineError::TranscriptTooShort { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            PipelineError::MissingApiKey => {
                "Please enter your Claude API key, or enable Demo Mode.".to_string()
            }
            PipelineError::TranscriptTooShort { .. } => format!(
                "Please enter a valid earnings transcript (minimum {MIN_TRANSCRIPT_CHARS} characters)."
            ),
            PipelineError::ExtractionFailed(_) => {
                "Failed to extract financial data. Please check the transcript and try again."
                    .to_string()
            }
            PipelineError::ArticleFailed(_) => {
                "Failed to generate article. Please try again.".to_string()
            }
            PipelineError::Llm(err) => format!("An error occurred: {err}"),
        }
    }

    fn source_error(&self) -> Option<&anyhow::Error> {
        match self {
            PipelineError::ExtractionFailed(err)
            | PipelineError::ArticleFailed(err)
            | PipelineError::Llm(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingApiKey => f.write_str("missing API key"),
            PipelineError::TranscriptTooShort { chars } => write!(
                f,
                "transcript too short ({chars} chars, minimum {MIN_TRANSCRIPT_CHARS})"
            ),
            PipelineError::ExtractionFailed(err) => {
                write!(f, "financial data extraction failed: {err:#}")
            }
            PipelineError::ArticleFailed(err) => write!(f, "article generation failed: {err:#}"),
            PipelineError::Llm(err) => write!(f, "LLM request failed: {err:#}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source_error()
            .map(|err| -> &(dyn std::error::Error + 'static) { err.as_ref() })
    }
}

pub trait ClientFactory: Send + Sync {
    fn build(&self, api_key: &str) -> anyhow::Result<Box<dyn LlmClient>>;
}

#[derive(Debug, Clone)]
pub struct AnthropicFactory {
    settings: Settings,
}

impl AnthropicFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl ClientFactory for AnthropicFactory {
    fn build(&self, api_key: &str) -> anyhow::Result<Box<dyn LlmClient>> {
        Ok(Box::new(AnthropicClient::new(api_key, &self.settings)?))
    }
}

pub fn demo_report(generated_at: chrono::DateTime<chrono::Utc>) -> Report {
    Report::new(
        ReportSource::Demo,
        generated_at,
        demo::demo_financials(),
        demo::demo_article(),
    )
}

fn classify(err: anyhow::Error, parse_failure: fn(anyhow::Error) -> PipelineError) -> PipelineError {
    match err.downcast_ref::<LlmDiagnosticsError>() {
        Some(diag) if diag.is_parse_failure() => parse_failure(err),
        _ => PipelineError::Llm(err),
    }
}

pub async fn generate(
    req: &GenerateRequest,
    fallback_api_key: Option<&str>,
    factory: &dyn ClientFactory,
) -> Result<Report, PipelineError> {
    if req.demo_mode {
        tracing::info!("demo mode; returning sample report");
        return Ok(demo_report(chrono::Utc::now()));
    }

    let api_key = req
        .api_key()
        .or(fallback_api_key.map(str::trim).filter(|k| !k.is_empty()))
        .ok_or(PipelineError::MissingApiKey)?;

    let transcript = req.transcript.trim();
    let chars = transcript.chars().count();
    if chars < MIN_TRANSCRIPT_CHARS {
        return Err(PipelineError::TranscriptTooShort { chars });
    }

    let client = factory.build(api_key).map_err(PipelineError::Llm)?;

    tracing::info!(transcript_chars = chars, provider = ?client.provider(), "extracting financial data");
    let financials = llm::extract_financial_data(client.as_ref(), transcript)
        .await
        .map_err(|err| classify(err, PipelineError::ExtractionFailed))?;

    tracing::info!(
        ticker = financials.display_ticker(),
        segments = financials.segment_performance.len(),
        "generating news article"
    );
    let article = llm::generate_article(client.as_ref(), &financials, transcript)
        .await
        .map_err(|err| classify(err, PipelineError::ArticleFailed))?;

    Ok(Report::new(ReportSource::Llm, chrono::Utc::now(), financials, article))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::llm::{CompletionRequest, Provider};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned replies in order and records every prompt it receives.
    #[derive(Clone, Default)]
    pub struct ScriptedClient {
        pub replies: Arc<Mutex<VecDeque<anyhow::Result<String>>>>,
        pub prompts: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedClient {
        pub fn new(replies: Vec<anyhow::Result<String>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                prompts: Arc::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider(&self) -> Provider {
            Provider::Anthropic
        }

        async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(req);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply left")))
        }
    }

    impl ClientFactory for ScriptedClient {
        fn build(&self, _api_key: &str) -> anyhow::Result<Box<dyn LlmClient>> {
            Ok(Box::new(self.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use crate::llm::{ARTICLE_MAX_TOKENS, EXTRACTION_MAX_TOKENS};

    const FACTS_REPLY: &str = "Here is the JSON:\n{\"company_name\": \"Acme Corp\", \"ticker\": \"ACME\", \
        \"current_quarter\": {\"revenue\": {\"value\": 1200}}, \"segment_performance\": []}";
    const ARTICLE_REPLY: &str =
        "{\"headline\": \"Acme tops estimates\", \"lead\": \"Acme grew.\", \"read_time\": 2}";

    fn transcript() -> String {
        "Operator: Welcome to the Acme Corp call. CEO: Revenue was $1.2 billion, up 8% from last year. ".repeat(2)
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            demo_mode: false,
            api_key: Some("sk-test".to_string()),
            transcript: transcript(),
        }
    }

    #[tokio::test]
    async fn demo_mode_skips_client() {
        let client = ScriptedClient::new(vec![]);
        let report = generate(&GenerateRequest::demo(), None, &client).await.unwrap();
        assert_eq!(report.source, ReportSource::Demo);
        assert_eq!(report.financials, demo::demo_financials());
        assert_eq!(report.article, demo::demo_article());
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_rejected_before_any_call() {
        let client = ScriptedClient::new(vec![]);
        let req = GenerateRequest {
            api_key: Some("   ".to_string()),
            ..request()
        };
        let err = generate(&req, None, &client).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingApiKey));
        assert!(err.is_input_error());
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fallback_key_is_used_when_form_key_blank() {
        let client = ScriptedClient::new(vec![
            Ok(FACTS_REPLY.to_string()),
            Ok(ARTICLE_REPLY.to_string()),
        ]);
        let req = GenerateRequest {
            api_key: None,
            ..request()
        };
        assert!(generate(&req, Some("sk-env"), &client).await.is_ok());
    }

    #[tokio::test]
    async fn short_transcript_is_rejected() {
        let client = ScriptedClient::new(vec![]);
        let req = GenerateRequest {
            transcript: "  Revenue was up.  ".to_string(),
            ..request()
        };
        let err = generate(&req, None, &client).await.unwrap_err();
        assert!(matches!(err, PipelineError::TranscriptTooShort { chars: 15 }));
        assert!(err.user_message().contains("minimum 100 characters"));
    }

    #[tokio::test]
    async fn runs_extraction_then_article() {
        let client = ScriptedClient::new(vec![
            Ok(FACTS_REPLY.to_string()),
            Ok(ARTICLE_REPLY.to_string()),
        ]);
        let report = generate(&request(), None, &client).await.unwrap();

        assert_eq!(report.source, ReportSource::Llm);
        assert_eq!(report.financials.display_ticker(), "ACME");
        assert_eq!(report.article.headline.as_deref(), Some("Acme tops estimates"));

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].max_tokens, EXTRACTION_MAX_TOKENS);
        assert!(prompts[0].prompt.contains("TRANSCRIPT:"));
        assert_eq!(prompts[1].max_tokens, ARTICLE_MAX_TOKENS);
        assert!(prompts[1].prompt.contains("\"ticker\": \"ACME\""));
    }

    #[tokio::test]
    async fn unparseable_extraction_stops_the_run() {
        let client = ScriptedClient::new(vec![Ok(
            "Sorry, I cannot find financial figures in this text.".to_string()
        )]);
        let err = generate(&request(), None, &client).await.unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionFailed(_)));
        assert!(!err.is_input_error());
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unparseable_article_is_reported_separately() {
        let client = ScriptedClient::new(vec![
            Ok(FACTS_REPLY.to_string()),
            Ok("{\"headline\": ".to_string()),
        ]);
        let err = generate(&request(), None, &client).await.unwrap_err();
        assert!(matches!(err, PipelineError::ArticleFailed(_)));
        assert_eq!(err.user_message(), "Failed to generate article. Please try again.");
    }

    #[tokio::test]
    async fn transport_errors_surface_generically() {
        let client = ScriptedClient::new(vec![Err(anyhow::anyhow!("connection reset"))]);
        let err = generate(&request(), None, &client).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(_)));
        assert_eq!(err.user_message(), "An error occurred: connection reset");
    }
}
