use crate::domain::article::Article;
use crate::domain::financials::FinancialData;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Demo,
    Llm,
}

/// One generated result: extracted facts plus the article written from them.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub source: ReportSource,
    pub generated_at: DateTime<Utc>,
    pub financials: FinancialData,
    pub article: Article,
}

impl Report {
    pub fn new(
        source: ReportSource,
        generated_at: DateTime<Utc>,
        financials: FinancialData,
        article: Article,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            generated_at,
            financials,
            article,
        }
    }
}
