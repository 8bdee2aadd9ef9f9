use crate::domain::financials::FinancialData;
use anyhow::Context;

/// Transcript characters passed along with the article request.
pub const ARTICLE_TRANSCRIPT_CONTEXT_CHARS: usize = 3000;

const EXTRACTION_SCHEMA: &str = r#"{
    "company_name": "Full company name",
    "ticker": "Stock ticker symbol (e.g., AAPL)",
    "quarter": "Q1/Q2/Q3/Q4",
    "fiscal_year": "FY2024/FY2025 etc",
    "report_date": "Date mentioned or today",

    "current_quarter": {
        "revenue": {"value": number in millions, "currency": "USD"},
        "net_income": {"value": number in millions, "currency": "USD"},
        "eps": {"value": number, "diluted": true/false},
        "gross_margin": {"value": percentage number},
        "operating_income": {"value": number in millions, "currency": "USD"}
    },

    "year_over_year": {
        "revenue_change": percentage number (positive or negative),
        "eps_change": percentage number,
        "net_income_change": percentage number
    },

    "quarter_over_quarter": {
        "revenue_change": percentage number,
        "eps_change": percentage number
    },

    "estimates": {
        "revenue_estimate": number in millions or null,
        "eps_estimate": number or null,
        "revenue_beat": true/false/null,
        "eps_beat": true/false/null
    },

    "guidance": {
        "next_quarter_revenue": {"low": number, "high": number} or null,
        "full_year_revenue": {"low": number, "high": number} or null,
        "next_quarter_eps": {"low": number, "high": number} or null
    },

    "historical_quarters": [
        {"quarter": "Q1 2024", "revenue": number, "eps": number},
        {"quarter": "Q2 2024", "revenue": number, "eps": number},
        {"quarter": "Q3 2024", "revenue": number, "eps": number},
        {"quarter": "Q4 2024", "revenue": number, "eps": number}
    ],

    "key_highlights": [
        "Important bullet point 1",
        "Important bullet point 2",
        "Important bullet point 3"
    ],

    "segment_performance": [
        {"segment": "Segment Name", "revenue": number, "growth": percentage}
    ],

    "ceo_quote": "Notable quote from CEO if available",
    "outlook": "Brief outlook/guidance summary"
}"#;

const ARTICLE_SCHEMA: &str = r#"{
    "headline": "The headline text",
    "subheadline": "Optional subheadline",
    "lead": "Opening paragraph",
    "key_numbers": "Detailed numbers paragraph",
    "segment_details": "Segment performance paragraph",
    "management_commentary": "Quotes and insights paragraph",
    "outlook": "Guidance and outlook paragraph",
    "conclusion": "Closing paragraph",
    "read_time": estimated minutes to read (number)
}"#;

pub fn extraction_prompt(transcript: &str) -> String {
    [
        "Analyze this earnings call transcript and extract the following information in JSON format:",
        "",
        EXTRACTION_SCHEMA,
        "",
        "If any data is not available in the transcript, use null. Extract numbers without currency symbols.",
        "List historical quarters oldest first. Estimate them or use any mentioned comparative figures.",
        "Return ONLY the JSON object.",
        "",
        "TRANSCRIPT:",
        transcript,
    ]
    .join("\n")
}

pub fn article_prompt(data: &FinancialData, transcript: &str) -> anyhow::Result<String> {
    let data_json =
        serde_json::to_string_pretty(data).context("failed to serialize financial data")?;

    Ok(format!(
        "Based on this earnings data and transcript, write a professional financial news article.\n\n\
FINANCIAL DATA:\n{data_json}\n\n\
ORIGINAL TRANSCRIPT (for context):\n{excerpt}...\n\n\
Write the article with these sections:\n\
1. HEADLINE: Catchy, informative headline mentioning company, quarter, and key result (beat/miss)\n\
2. LEAD: 2-3 sentence summary of the key results\n\
3. KEY NUMBERS: Paragraph detailing revenue, EPS, and comparisons\n\
4. SEGMENT DETAILS: Performance by business segment if available\n\
5. MANAGEMENT COMMENTARY: Include CEO/CFO quotes or paraphrased insights\n\
6. OUTLOOK: Forward-looking guidance and expectations\n\
7. CONCLUSION: Brief wrap-up with stock context\n\n\
Format the response as JSON:\n{ARTICLE_SCHEMA}\n\n\
Write in professional financial journalism style - factual, clear, and engaging.",
        excerpt = transcript_excerpt(transcript, ARTICLE_TRANSCRIPT_CONTEXT_CHARS),
    ))
}

/// First `max_chars` characters of `transcript`, cut on a char boundary.
pub fn transcript_excerpt(transcript: &str, max_chars: usize) -> &str {
    match transcript.char_indices().nth(max_chars) {
        Some((idx, _)) => &transcript[..idx],
        None => transcript,
    }
}
