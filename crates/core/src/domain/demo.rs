//! Built-in Apple Q4 FY2024 sample used by demo mode and as the default
//! transcript in the input form.

use crate::domain::article::Article;
use crate::domain::financials::{
    CurrentQuarter, Estimates, FinancialData, Figure, Guidance, HistoricalQuarter,
    QuarterOverQuarter, Range, SegmentPerformance, YearOverYear,
};

pub const SAMPLE_TRANSCRIPT: &str = "\
[Sample - Replace with actual transcript]

Good afternoon and welcome to Apple Inc's Q4 FY2024 Earnings Conference Call.

Tim Cook, CEO: We're thrilled to report another record-breaking quarter. Revenue came in at $89.5 billion,
up 6% year-over-year, beating analyst estimates of $87.2 billion. Our iPhone revenue reached $43.8 billion,
while Services hit an all-time high of $22.2 billion, growing 14% year-over-year.

Earnings per share was $1.46, compared to $1.29 last year, beating the consensus estimate of $1.39.
Gross margin improved to 45.2% from 44.5% in the prior year quarter.

Luca Maestri, CFO: Looking at our segments, iPhone revenue was $43.8 billion, Mac revenue was $7.6 billion,
iPad was $7.0 billion, Wearables and Accessories contributed $9.0 billion, and Services reached $22.2 billion.

For Q1 FY2025, we expect revenue between $92 billion and $96 billion, representing growth of 5-8% year-over-year.
We anticipate EPS in the range of $1.50 to $1.58.

Our cash position remains strong at $162 billion, and we returned $25 billion to shareholders through
dividends and buybacks this quarter.
";

const DEMO_REPORT_DATE: &str = "2024-10-31";

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

pub fn demo_financials() -> FinancialData {
    FinancialData {
        company_name: text("Apple Inc."),
        ticker: text("AAPL"),
        quarter: text("Q4"),
        fiscal_year: text("FY2024"),
        report_date: text(DEMO_REPORT_DATE),
        current_quarter: CurrentQuarter {
            revenue: Figure::usd(89500.0),
            net_income: Figure::usd(22956.0),
            eps: Figure {
                value: Some(1.46),
                currency: None,
                diluted: Some(true),
            },
            gross_margin: Figure::new(45.2),
            operating_income: Figure::usd(26885.0),
        },
        year_over_year: YearOverYear {
            revenue_change: Some(6.0),
            eps_change: Some(13.2),
            net_income_change: Some(10.5),
        },
        quarter_over_quarter: QuarterOverQuarter {
            revenue_change: Some(2.3),
            eps_change: Some(4.1),
        },
        estimates: Estimates {
            revenue_estimate: Some(87200.0),
            eps_estimate: Some(1.39),
            revenue_beat: Some(true),
            eps_beat: Some(true),
        },
        guidance: Guidance {
            next_quarter_revenue: Some(Range::new(92000.0, 96000.0)),
            full_year_revenue: Some(Range::new(380000.0, 395000.0)),
            next_quarter_eps: Some(Range::new(1.50, 1.58)),
        },
        historical_quarters: [
            ("Q1 FY24", 81800.0, 1.29),
            ("Q2 FY24", 84300.0, 1.33),
            ("Q3 FY24", 87500.0, 1.40),
            ("Q4 FY24", 89500.0, 1.46),
        ]
        .into_iter()
        .map(|(quarter, revenue, eps)| HistoricalQuarter {
            quarter: text(quarter),
            revenue: Some(revenue),
            eps: Some(eps),
        })
        .collect(),
        key_highlights: [
            "iPhone revenue reached $43.8 billion, up 5% YoY",
            "Services segment hit all-time high of $22.2 billion, growing 14% YoY",
            "Returned $25 billion to shareholders through dividends and buybacks",
            "Strong cash position of $162 billion",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        segment_performance: [
            ("iPhone", 43800.0, 5.0),
            ("Services", 22200.0, 14.0),
            ("Wearables", 9000.0, -2.0),
            ("Mac", 7600.0, 3.0),
            ("iPad", 7000.0, 8.0),
        ]
        .into_iter()
        .map(|(segment, revenue, growth)| SegmentPerformance {
            segment: text(segment),
            revenue: Some(revenue),
            growth: Some(growth),
        })
        .collect(),
        ceo_quote: text("We're thrilled to report another record-breaking quarter with strong performance across our product lineup and services."),
        outlook: text("We expect continued growth driven by our services segment and upcoming product launches."),
    }
}

pub fn demo_article() -> Article {
    Article {
        headline: text("Apple Q4 FY2024 Earnings Beat: Revenue Up 6% to $89.5B, EPS Surges 13%"),
        subheadline: text("Services segment hits all-time high as iPhone sales remain strong"),
        lead: text("Apple Inc. (NASDAQ: AAPL) reported stellar fourth-quarter results that exceeded Wall Street expectations, with revenue climbing 6% year-over-year to $89.5 billion and earnings per share jumping 13% to $1.46. The tech giant's performance was driven by robust iPhone sales and a record-breaking quarter for its high-margin Services business."),
        key_numbers: text("Revenue of $89.5 billion topped analyst estimates of $87.2 billion, representing a $2.3 billion beat. Diluted EPS of $1.46 crushed the consensus estimate of $1.39 by 5%. Gross margin expanded to 45.2% from 44.5% in the year-ago quarter, reflecting improved operational efficiency and favorable product mix. The company generated operating income of $26.9 billion, up 8% year-over-year."),
        segment_details: text("iPhone remained the largest revenue contributor at $43.8 billion, up 5% YoY despite a challenging smartphone market. The Services segment was the star performer, hitting an all-time high of $22.2 billion with 14% growth, driven by App Store, Apple Music, and iCloud subscriptions. Mac revenue came in at $7.6 billion (+3%), while iPad saw an 8% increase to $7.0 billion. Wearables, Home and Accessories declined 2% to $9.0 billion amid market saturation."),
        management_commentary: text("CEO Tim Cook expressed optimism about the company's trajectory: 'We're thrilled to report another record-breaking quarter with strong performance across our product lineup and services. Our ecosystem continues to expand, and customer satisfaction remains at all-time highs.' CFO Luca Maestri highlighted the company's capital return program, noting that Apple returned $25 billion to shareholders this quarter through dividends and share repurchases."),
        outlook: text("For Q1 FY2025, Apple guided revenue between $92 billion and $96 billion, representing 5-8% year-over-year growth. EPS is expected in the range of $1.50 to $1.58. Management expressed confidence in the upcoming holiday season, citing strong demand for the new iPhone lineup and continued momentum in Services. The company maintains a robust cash position of $162 billion, providing flexibility for future investments and shareholder returns."),
        conclusion: text("Apple's Q4 results demonstrate the company's ability to deliver consistent growth despite macroeconomic headwinds. With a diversified revenue base, expanding services ecosystem, and loyal customer base, Apple remains well-positioned for continued success. The stock gained 2% in after-hours trading following the earnings release."),
        read_time: Some(4.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_records_are_deterministic() {
        assert_eq!(demo_financials(), demo_financials());
        assert_eq!(demo_article(), demo_article());
        assert_eq!(demo_financials().report_date.as_deref(), Some(DEMO_REPORT_DATE));
    }

    #[test]
    fn demo_history_ends_at_current_quarter() {
        let data = demo_financials();
        let last = data.historical_quarters.last().unwrap();
        assert_eq!(last.revenue, data.revenue());
        assert_eq!(last.eps, data.eps());
    }

    #[test]
    fn sample_transcript_passes_length_check() {
        assert!(SAMPLE_TRANSCRIPT.trim().chars().count() >= 100);
    }
}
