pub mod anthropic;
pub mod error;
pub mod json;
pub mod prompt;

use crate::domain::article::Article;
use crate::domain::financials::FinancialData;
use crate::llm::error::LlmDiagnosticsError;

/// Output ceiling for the extraction call.
pub const EXTRACTION_MAX_TOKENS: u32 = 4000;
/// Output ceiling for the article call.
pub const ARTICLE_MAX_TOKENS: u32 = 3000;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends a single user prompt and returns the model's text reply.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String>;
}

/// Asks the model for the structured facts in `transcript`.
pub async fn extract_financial_data(
    client: &dyn LlmClient,
    transcript: &str,
) -> anyhow::Result<FinancialData> {
    let text = client
        .complete(CompletionRequest {
            prompt: prompt::extraction_prompt(transcript),
            max_tokens: EXTRACTION_MAX_TOKENS,
        })
        .await?;
    tracing::debug!(
        provider = ?client.provider(),
        response_len = text.len(),
        "extraction response received"
    );
    json::parse_financials(&text).map_err(|err| {
        LlmDiagnosticsError::unparseable(
            client.provider(),
            "parse_financials",
            format!("{err:#}"),
            &text,
        )
        .into()
    })
}

/// Asks the model to write the article for `data`.
pub async fn generate_article(
    client: &dyn LlmClient,
    data: &FinancialData,
    transcript: &str,
) -> anyhow::Result<Article> {
    let text = client
        .complete(CompletionRequest {
            prompt: prompt::article_prompt(data, transcript)?,
            max_tokens: ARTICLE_MAX_TOKENS,
        })
        .await?;
    tracing::debug!(
        provider = ?client.provider(),
        response_len = text.len(),
        "article response received"
    );
    json::parse_article(&text).map_err(|err| {
        LlmDiagnosticsError::unparseable(client.provider(), "parse_article", format!("{err:#}"), &text)
            .into()
    })
}
