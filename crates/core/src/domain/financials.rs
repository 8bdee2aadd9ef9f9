use crate::domain::lenient;
use serde::{Deserialize, Serialize};

/// Structured facts extracted from one earnings call.
///
/// Every field is optional: the extraction model is told to emit `null` for
/// anything the transcript does not mention, and render code substitutes
/// defaults at display time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    #[serde(default, deserialize_with = "lenient::text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quarter: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fiscal_year: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub report_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub current_quarter: CurrentQuarter,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub year_over_year: YearOverYear,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub quarter_over_quarter: QuarterOverQuarter,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub estimates: Estimates,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub guidance: Guidance,

    #[serde(default, deserialize_with = "lenient::list")]
    pub historical_quarters: Vec<HistoricalQuarter>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub key_highlights: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub segment_performance: Vec<SegmentPerformance>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub ceo_quote: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub outlook: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentQuarter {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub revenue: Figure,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub net_income: Figure,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub eps: Figure,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub gross_margin: Figure,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub operating_income: Figure,
}

/// A single reported number (`{"value": 89500, "currency": "USD"}`).
///
/// A bare number is accepted in place of the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diluted: Option<bool>,
}

impl Figure {
    pub fn new(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn usd(value: f64) -> Self {
        Self {
            value: Some(value),
            currency: Some("USD".to_string()),
            diluted: None,
        }
    }
}

impl<'de> Deserialize<'de> for Figure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match &value {
            serde_json::Value::Object(map) => Figure {
                value: map.get("value").and_then(lenient::value_to_number),
                currency: map.get("currency").and_then(lenient::value_to_text),
                diluted: map.get("diluted").and_then(lenient::value_to_flag),
            },
            other => Figure {
                value: lenient::value_to_number(other),
                ..Figure::default()
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
    #[serde(default, deserialize_with = "lenient::number")]
    pub revenue_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub eps_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub net_income_change: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterOverQuarter {
    #[serde(default, deserialize_with = "lenient::number")]
    pub revenue_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub eps_change: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    #[serde(default, deserialize_with = "lenient::number")]
    pub revenue_estimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub eps_estimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub revenue_beat: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub eps_beat: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub next_quarter_revenue: Option<Range>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub full_year_revenue: Option<Range>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub next_quarter_eps: Option<Range>,
}

impl Guidance {
    pub fn is_empty(&self) -> bool {
        [
            &self.next_quarter_revenue,
            &self.full_year_revenue,
            &self.next_quarter_eps,
        ]
        .iter()
        .all(|r| r.as_ref().map_or(true, Range::is_empty))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, deserialize_with = "lenient::number")]
    pub low: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub high: Option<f64>,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalQuarter {
    #[serde(default, deserialize_with = "lenient::text")]
    pub quarter: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub eps: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentPerformance {
    #[serde(default, deserialize_with = "lenient::text")]
    pub segment: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub growth: Option<f64>,
}

impl SegmentPerformance {
    pub fn display_name(&self) -> &str {
        self.segment.as_deref().unwrap_or("N/A")
    }
}

/// Outcome of comparing an actual figure with the analyst consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatStatus {
    Beat,
    Miss,
    Unknown,
}

impl BeatStatus {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => BeatStatus::Beat,
            Some(false) => BeatStatus::Miss,
            None => BeatStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BeatStatus::Beat => "BEAT ✓",
            BeatStatus::Miss => "MISS ✗",
            BeatStatus::Unknown => "N/A",
        }
    }

    pub fn csv_label(self) -> &'static str {
        match self {
            BeatStatus::Beat => "BEAT",
            BeatStatus::Miss => "MISS",
            BeatStatus::Unknown => "N/A",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            BeatStatus::Beat => "beat",
            BeatStatus::Miss => "miss",
            BeatStatus::Unknown => "",
        }
    }
}

impl FinancialData {
    pub fn display_ticker(&self) -> &str {
        self.ticker.as_deref().unwrap_or("N/A")
    }

    pub fn display_company(&self) -> &str {
        self.company_name.as_deref().unwrap_or("Company")
    }

    pub fn display_quarter(&self) -> &str {
        self.quarter.as_deref().unwrap_or("Q4")
    }

    pub fn display_fiscal_year(&self) -> &str {
        self.fiscal_year.as_deref().unwrap_or("FY2024")
    }

    /// Prefix for download filenames. Restricted to characters that are safe
    /// in a `Content-Disposition` header and on every filesystem.
    pub fn export_stem(&self) -> String {
        let stem: String = self
            .ticker
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        if stem.is_empty() {
            "earnings".to_string()
        } else {
            stem
        }
    }

    pub fn revenue(&self) -> Option<f64> {
        self.current_quarter.revenue.value
    }

    pub fn eps(&self) -> Option<f64> {
        self.current_quarter.eps.value
    }

    pub fn gross_margin(&self) -> Option<f64> {
        self.current_quarter.gross_margin.value
    }

    pub fn net_income(&self) -> Option<f64> {
        self.current_quarter.net_income.value
    }

    pub fn operating_income(&self) -> Option<f64> {
        self.current_quarter.operating_income.value
    }

    /// Reporting currency, taken from the first money figure that names one.
    pub fn currency(&self) -> Option<&str> {
        let cq = &self.current_quarter;
        [&cq.revenue, &cq.net_income, &cq.operating_income]
            .into_iter()
            .find_map(|f| f.currency.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn eps_label(&self) -> &'static str {
        match self.current_quarter.eps.diluted {
            Some(true) => "EPS (diluted)",
            Some(false) => "EPS (basic)",
            None => "EPS",
        }
    }

    pub fn revenue_status(&self) -> BeatStatus {
        BeatStatus::from_flag(self.estimates.revenue_beat)
    }

    pub fn eps_status(&self) -> BeatStatus {
        BeatStatus::from_flag(self.estimates.eps_beat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_record() {
        let data: FinancialData = serde_json::from_value(json!({
            "company_name": "Acme Corp",
            "ticker": "ACME",
            "quarter": "Q2",
            "fiscal_year": "FY2025",
            "current_quarter": {
                "revenue": {"value": 1200, "currency": "USD"},
                "eps": {"value": 0.42, "diluted": true},
                "gross_margin": {"value": 38.5}
            },
            "estimates": {"revenue_beat": false, "eps_beat": true},
            "guidance": {"next_quarter_revenue": {"low": 1250, "high": 1300}, "full_year_revenue": null},
            "segment_performance": [{"segment": "Cloud", "revenue": 700, "growth": 12.0}]
        }))
        .unwrap();

        assert_eq!(data.display_ticker(), "ACME");
        assert_eq!(data.revenue(), Some(1200.0));
        assert_eq!(data.current_quarter.eps.diluted, Some(true));
        assert_eq!(data.revenue_status(), BeatStatus::Miss);
        assert_eq!(data.eps_status(), BeatStatus::Beat);
        assert_eq!(
            data.guidance.next_quarter_revenue,
            Some(Range::new(1250.0, 1300.0))
        );
        assert_eq!(data.guidance.full_year_revenue, None);
        assert_eq!(data.segment_performance.len(), 1);
    }

    #[test]
    fn tolerates_nulls_and_wrong_shapes() {
        let data: FinancialData = serde_json::from_value(json!({
            "ticker": null,
            "current_quarter": null,
            "year_over_year": "not an object",
            "estimates": {"revenue_estimate": "87,200", "eps_beat": null},
            "historical_quarters": [
                {"quarter": "Q1", "revenue": "81800", "eps": 1.29},
                "garbage",
                {"quarter": "Q2", "revenue": null}
            ],
            "key_highlights": ["one", 2, null, ""],
            "segment_performance": null
        }))
        .unwrap();

        assert_eq!(data.display_ticker(), "N/A");
        assert_eq!(data.display_company(), "Company");
        assert_eq!(data.current_quarter, CurrentQuarter::default());
        assert_eq!(data.year_over_year, YearOverYear::default());
        assert_eq!(data.estimates.revenue_estimate, Some(87200.0));
        assert_eq!(data.eps_status(), BeatStatus::Unknown);
        assert_eq!(data.historical_quarters.len(), 2);
        assert_eq!(data.historical_quarters[0].revenue, Some(81800.0));
        assert_eq!(data.key_highlights, vec!["one".to_string(), "2".to_string()]);
        assert!(data.segment_performance.is_empty());
    }

    #[test]
    fn figure_accepts_bare_number() {
        let data: FinancialData = serde_json::from_value(json!({
            "current_quarter": {"revenue": 89500, "net_income": "22,956"}
        }))
        .unwrap();
        assert_eq!(data.revenue(), Some(89500.0));
        assert_eq!(data.net_income(), Some(22956.0));
    }

    #[test]
    fn export_stem_falls_back_and_sanitizes() {
        let mut data = FinancialData::default();
        assert_eq!(data.export_stem(), "earnings");
        data.ticker = Some("BRK.B".to_string());
        assert_eq!(data.export_stem(), "BRK.B");
        data.ticker = Some("\"../x\"".to_string());
        assert_eq!(data.export_stem(), "..x");
    }

    #[test]
    fn currency_and_eps_basis() {
        let mut data = FinancialData::default();
        assert_eq!(data.currency(), None);
        assert_eq!(data.eps_label(), "EPS");

        data.current_quarter.operating_income = Figure::usd(120.0);
        data.current_quarter.eps.diluted = Some(false);
        assert_eq!(data.currency(), Some("USD"));
        assert_eq!(data.operating_income(), Some(120.0));
        assert_eq!(data.eps_label(), "EPS (basic)");
    }

    #[test]
    fn guidance_emptiness() {
        let mut guidance = Guidance::default();
        assert!(guidance.is_empty());
        guidance.next_quarter_eps = Some(Range::default());
        assert!(guidance.is_empty());
        guidance.next_quarter_eps = Some(Range::new(1.5, 1.58));
        assert!(!guidance.is_empty());
    }
}
