use crate::charts::{self, ChartKind};
use crate::domain::article::{Article, Section};
use crate::domain::financials::FinancialData;
use crate::format;
use crate::render::{self, esc};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    HtmlReport,
    Json,
    ArticleText,
    MetricsCsv,
    Chart(ChartKind),
}

impl ExportKind {
    pub fn all() -> Vec<ExportKind> {
        let mut kinds = vec![
            ExportKind::HtmlReport,
            ExportKind::Json,
            ExportKind::ArticleText,
            ExportKind::MetricsCsv,
        ];
        kinds.extend(ChartKind::ALL.into_iter().map(ExportKind::Chart));
        kinds
    }

    pub fn slug(self) -> String {
        match self {
            ExportKind::HtmlReport => "report.html".to_string(),
            ExportKind::Json => "data.json".to_string(),
            ExportKind::ArticleText => "article.txt".to_string(),
            ExportKind::MetricsCsv => "metrics.csv".to_string(),
            ExportKind::Chart(kind) => format!("chart-{}.html", kind.slug()),
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "report.html" => Some(ExportKind::HtmlReport),
            "data.json" => Some(ExportKind::Json),
            "article.txt" => Some(ExportKind::ArticleText),
            "metrics.csv" => Some(ExportKind::MetricsCsv),
            other => other
                .strip_prefix("chart-")
                .and_then(|s| s.strip_suffix(".html"))
                .and_then(ChartKind::from_slug)
                .map(ExportKind::Chart),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportKind::HtmlReport => "Complete HTML Report (All Charts + Article)",
            ExportKind::Json => "JSON Data",
            ExportKind::ArticleText => "Article (TXT)",
            ExportKind::MetricsCsv => "Metrics (CSV)",
            ExportKind::Chart(ChartKind::Revenue) => "Revenue Chart (HTML)",
            ExportKind::Chart(ChartKind::Eps) => "EPS Chart (HTML)",
            ExportKind::Chart(ChartKind::YoyComparison) => "YoY Comparison Chart (HTML)",
            ExportKind::Chart(ChartKind::Segment) => "Segment Chart (HTML)",
        }
    }

    pub fn file_name(self, stem: &str) -> String {
        match self {
            ExportKind::HtmlReport => format!("{stem}_earnings_report.html"),
            ExportKind::Json => format!("{stem}_data.json"),
            ExportKind::ArticleText => format!("{stem}_article.txt"),
            ExportKind::MetricsCsv => format!("{stem}_metrics.csv"),
            ExportKind::Chart(kind) => format!("{stem}_{}.html", kind.file_suffix()),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportKind::HtmlReport | ExportKind::Chart(_) => "text/html; charset=utf-8",
            ExportKind::Json => "application/json",
            ExportKind::ArticleText => "text/plain; charset=utf-8",
            ExportKind::MetricsCsv => "text/csv; charset=utf-8",
        }
    }

    pub fn is_available(self, data: &FinancialData) -> bool {
        match self {
            ExportKind::Chart(kind) => kind.build(data).is_some(),
            _ => true,
        }
    }
}

/// Renders `kind`, or `None` when it is unavailable for this record.
pub fn render_export(
    kind: ExportKind,
    data: &FinancialData,
    article: &Article,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<Option<String>> {
    Ok(Some(match kind {
        ExportKind::HtmlReport => html_report(data, article, generated_at),
        ExportKind::Json => json_dump(data, article, generated_at)?,
        ExportKind::ArticleText => article_text(data, article),
        ExportKind::MetricsCsv => metrics_csv(data),
        ExportKind::Chart(chart) => match chart_html(chart, data) {
            Some(html) => html,
            None => return Ok(None),
        },
    }))
}

pub fn chart_html(kind: ChartKind, data: &FinancialData) -> Option<String> {
    kind.build(data).map(|spec| spec.to_standalone_html())
}

pub fn html_report(data: &FinancialData, article: &Article, generated_at: DateTime<Utc>) -> String {
    let charts = charts::all_charts(data);

    let mut body = String::new();
    body.push_str(&render::article_header(data, article, generated_at));

    let mut section = |title: &str, inner: &str| {
        let _ = writeln!(
            body,
            "<div class=\"section\">\n<div class=\"section-title\">{title}</div>\n{inner}</div>"
        );
    };
    section("📊 Key Metrics", &render::metric_cards(data));
    section("📋 Estimates vs Actual", &render::comparison_table(data));
    section("📈 Performance Charts", &render::charts_grid(&charts, true));
    section("📊 Segment Performance", &render::segment_table(data));
    if let Some(guidance) = render::guidance_table(data) {
        section("🧭 Guidance", &guidance);
    }
    if let Some(view) = render::management_view(data) {
        section("💬 Management View", &view);
    }
    section("📰 Full Article", &render::article_body(article, false));
    section(
        "🎯 Key Highlights",
        &render::highlights_list(data).unwrap_or_else(|| "<ul></ul>\n".to_string()),
    );

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
<title>{ticker} {quarter} {fy} Earnings Report</title>\n\
<style>{css}</style>\n\
</head>\n<body>\n{body}\
<div class=\"footer\">Generated by Earnings News Generator | {stamp}</div>\n\
</body>\n</html>\n",
        ticker = esc(data.display_ticker()),
        quarter = esc(data.display_quarter()),
        fy = esc(data.display_fiscal_year()),
        css = render::STYLESHEET,
        stamp = generated_at.format("%B %d, %Y at %H:%M UTC"),
    )
}

#[derive(Serialize)]
struct JsonExport<'a> {
    financial_data: &'a FinancialData,
    article: &'a Article,
    generated_at: DateTime<Utc>,
}

pub fn json_dump(
    data: &FinancialData,
    article: &Article,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&JsonExport {
        financial_data: data,
        article,
        generated_at,
    })
    .context("failed to serialize JSON export")
}

pub fn article_text(data: &FinancialData, article: &Article) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", article.headline.as_deref().unwrap_or_default());
    let _ = writeln!(out, "{}", "=".repeat(60));
    if let Some(sub) = article.subheadline.as_deref() {
        let _ = writeln!(out, "{sub}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", article.lead_text());

    for section in Section::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", section.title().to_uppercase());
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "{}", article.section_text(section));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "KEY HIGHLIGHTS");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for highlight in &data.key_highlights {
        let _ = writeln!(out, "• {highlight}");
    }
    out
}

fn csv_field(raw: &str) -> Cow<'_, str> {
    if raw.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}

fn csv_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}%"),
        None => format::NOT_AVAILABLE.to_string(),
    }
}

pub fn metrics_csv(data: &FinancialData) -> String {
    let yoy = &data.year_over_year;
    let est = &data.estimates;

    let mut out = String::from("Metric,Actual,Estimate,YoY Change,Status\n");
    let _ = writeln!(
        out,
        "Revenue (M),{},{},{},{}",
        format::raw(data.revenue()),
        format::raw(est.revenue_estimate),
        csv_percent(yoy.revenue_change),
        data.revenue_status().csv_label(),
    );
    let _ = writeln!(
        out,
        "EPS,{},{},{},{}",
        format::raw(data.eps()),
        format::raw(est.eps_estimate),
        csv_percent(yoy.eps_change),
        data.eps_status().csv_label(),
    );
    let _ = writeln!(out, "Gross Margin %,{},,,", format::raw(data.gross_margin()));
    let _ = writeln!(
        out,
        "Net Income (M),{},,{},",
        format::raw(data.net_income()),
        csv_percent(yoy.net_income_change),
    );

    out.push('\n');
    out.push_str("Segment,Revenue (M),Growth %\n");
    for seg in &data.segment_performance {
        let _ = writeln!(
            out,
            "{},{},{}",
            csv_field(seg.display_name()),
            format::raw(seg.revenue),
            csv_percent(seg.growth),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::demo;
    use crate::domain::financials::Range;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 31, 16, 30, 0).unwrap()
    }

    #[test]
    fn csv_contains_every_metric_literal() {
        let data = demo::demo_financials();
        let csv = metrics_csv(&data);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Metric,Actual,Estimate,YoY Change,Status");
        assert_eq!(lines[1], "Revenue (M),89500,87200,6%,BEAT");
        assert_eq!(lines[2], "EPS,1.46,1.39,13.2%,BEAT");
        assert_eq!(lines[3], "Gross Margin %,45.2,,,");
        assert_eq!(lines[4], "Net Income (M),22956,,10.5%,");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Segment,Revenue (M),Growth %");
        assert_eq!(lines[7], "iPhone,43800,5%");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn csv_uses_na_and_quotes_segment_names() {
        let mut data = FinancialData::default();
        data.estimates.revenue_beat = Some(false);
        data.segment_performance.push(crate::domain::financials::SegmentPerformance {
            segment: Some("Wearables, Home \"and\" Accessories".to_string()),
            revenue: Some(9000.0),
            growth: None,
        });
        let csv = metrics_csv(&data);
        assert!(csv.contains("Revenue (M),N/A,N/A,N/A,MISS\n"));
        assert!(csv.contains("EPS,N/A,N/A,N/A,N/A\n"));
        assert!(csv.contains("\"Wearables, Home \"\"and\"\" Accessories\",9000,N/A\n"));
    }

    #[test]
    fn text_export_contains_sections_and_highlights() {
        let data = demo::demo_financials();
        let article = demo::demo_article();
        let text = article_text(&data, &article);

        assert!(text.starts_with(article.headline.as_deref().unwrap()));
        for section in Section::ALL {
            assert!(text.contains(&section.title().to_uppercase()));
            assert!(text.contains(article.section_text(section)));
        }
        for highlight in &data.key_highlights {
            assert!(text.contains(&format!("• {highlight}")));
        }
        assert!(text.contains(&"=".repeat(60)));
    }

    /// Every populated value of the record, in the form the HTML report
    /// displays it.
    fn displayed_literals(data: &FinancialData) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        let mut text = |name: &str, value: &Option<String>| {
            if let Some(v) = value {
                out.push((name.to_string(), esc(v).into_owned()));
            }
        };
        text("company_name", &data.company_name);
        text("ticker", &data.ticker);
        text("quarter", &data.quarter);
        text("fiscal_year", &data.fiscal_year);
        text("report_date", &data.report_date);
        text("ceo_quote", &data.ceo_quote);
        text("outlook", &data.outlook);

        let mut number = |name: &str, value: Option<f64>, f: fn(f64) -> String| {
            if let Some(v) = value {
                out.push((name.to_string(), f(v)));
            }
        };
        let cq = &data.current_quarter;
        number("revenue", cq.revenue.value, format::millions);
        number("net_income", cq.net_income.value, format::millions);
        number("operating_income", cq.operating_income.value, format::millions);
        number("eps", cq.eps.value, format::per_share);
        number("gross_margin", cq.gross_margin.value, format::percent);
        number("yoy_revenue", data.year_over_year.revenue_change, format::signed_percent);
        number("yoy_eps", data.year_over_year.eps_change, format::signed_percent);
        number("yoy_net_income", data.year_over_year.net_income_change, format::signed_percent);
        number("qoq_revenue", data.quarter_over_quarter.revenue_change, format::signed_percent);
        number("qoq_eps", data.quarter_over_quarter.eps_change, format::signed_percent);
        number("revenue_estimate", data.estimates.revenue_estimate, format::millions);
        number("eps_estimate", data.estimates.eps_estimate, format::per_share);

        let guidance = &data.guidance;
        let ranges: [(&str, &Option<Range>, fn(f64) -> String); 3] = [
            ("next_quarter_revenue", &guidance.next_quarter_revenue, format::millions),
            ("full_year_revenue", &guidance.full_year_revenue, format::millions),
            ("next_quarter_eps", &guidance.next_quarter_eps, format::per_share),
        ];
        for (name, range, f) in ranges {
            if let Some(range) = range {
                number(name, range.low, f);
                number(name, range.high, f);
            }
        }
        for q in &data.historical_quarters {
            number("history_revenue", q.revenue, format::millions);
            number("history_eps", q.eps, format::per_share);
        }
        for seg in &data.segment_performance {
            number("segment_revenue", seg.revenue, format::millions);
            number("segment_growth", seg.growth, format::signed_percent);
        }

        let mut labels = vec![];
        for q in &data.historical_quarters {
            labels.push(("history_quarter", q.quarter.clone()));
        }
        for seg in &data.segment_performance {
            labels.push(("segment", seg.segment.clone()));
        }
        for (name, value) in labels {
            if let Some(v) = value {
                out.push((name.to_string(), v));
            }
        }
        for highlight in &data.key_highlights {
            out.push(("key_highlights".to_string(), esc(highlight).into_owned()));
        }
        if let Some(currency) = data.currency() {
            out.push(("currency".to_string(), currency.to_string()));
        }
        if cq.eps.diluted.is_some() {
            out.push(("eps_diluted".to_string(), data.eps_label().to_string()));
        }
        if data.estimates.revenue_beat.is_some() || data.estimates.eps_beat.is_some() {
            out.push(("beat".to_string(), data.revenue_status().label().to_string()));
        }
        out
    }

    #[test]
    fn html_report_shows_every_record_value() {
        let data = demo::demo_financials();
        let html = html_report(&data, &Article::default(), at());

        let literals = displayed_literals(&data);
        assert!(literals.len() > 40);
        let missing: Vec<_> = literals
            .iter()
            .filter(|(_, shown)| !html.contains(shown.as_str()))
            .collect();
        assert!(missing.is_empty(), "missing from report: {missing:?}");

        assert!(html.contains("<title>AAPL Q4 FY2024 Earnings Report</title>"));
        assert!(html.contains("Plotly.newPlot(\"chart-segment\""));
        assert!(html.contains("October 31, 2024 at 16:30 UTC"));
    }

    #[test]
    fn html_report_survives_empty_records() {
        let html = html_report(&FinancialData::default(), &Article::default(), at());
        assert!(html.contains("N/A Q4 FY2024 Earnings Report"));
        assert!(html.contains("Earnings Report</div>"));
        assert!(html.contains(render::SEGMENT_CHART_UNAVAILABLE));
    }

    #[test]
    fn json_dump_nests_both_records() {
        let data = demo::demo_financials();
        let article = demo::demo_article();
        let dumped = json_dump(&data, &article, at()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&dumped).unwrap();
        assert_eq!(value["financial_data"]["ticker"], "AAPL");
        assert_eq!(value["article"]["read_time"], serde_json::json!(4.0));
        assert_eq!(value["generated_at"], "2024-10-31T16:30:00Z");

        let reparsed: FinancialData =
            serde_json::from_value(value["financial_data"].clone()).unwrap();
        assert_eq!(reparsed, data);
    }

    #[test]
    fn export_kinds_have_stable_names() {
        assert_eq!(ExportKind::HtmlReport.file_name("AAPL"), "AAPL_earnings_report.html");
        assert_eq!(
            ExportKind::Chart(ChartKind::YoyComparison).file_name("AAPL"),
            "AAPL_yoy_comparison.html"
        );
        for kind in ExportKind::all() {
            assert_eq!(ExportKind::from_slug(&kind.slug()), Some(kind));
        }
        assert_eq!(ExportKind::from_slug("chart-pie.html"), None);
        assert_eq!(ExportKind::from_slug("../etc/passwd"), None);
    }

    #[test]
    fn segment_chart_export_unavailable_without_segments() {
        let data = FinancialData::default();
        let kind = ExportKind::Chart(ChartKind::Segment);
        assert!(!kind.is_available(&data));
        assert!(render_export(kind, &data, &Article::default(), at())
            .unwrap()
            .is_none());
    }
}
