use crate::charts::ChartSpec;
use crate::domain::article::{Article, Section};
use crate::domain::financials::{BeatStatus, FinancialData, Range};
use crate::format;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt::Write;

pub const SEGMENT_CHART_UNAVAILABLE: &str = "Segment data not available";

pub const STYLESHEET: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
.header { background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%); color: white; padding: 30px; border-radius: 12px; margin-bottom: 25px; }
.headline { font-size: 28px; font-weight: 700; margin-bottom: 10px; }
.subheadline { font-size: 18px; opacity: 0.85; margin-bottom: 12px; }
.meta { display: flex; gap: 20px; flex-wrap: wrap; font-size: 14px; opacity: 0.9; }
.ticker { background: #0066cc; padding: 4px 12px; border-radius: 4px; font-weight: 600; }
.section { background: white; border-radius: 12px; padding: 25px; margin-bottom: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.section-title { font-size: 20px; font-weight: 600; color: #1a1a2e; margin-bottom: 15px; padding-bottom: 10px; border-bottom: 2px solid #0066cc; }
.metrics-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 15px; }
.metric-card { border-radius: 12px; padding: 20px; color: white; text-align: center; }
.metric-card.blue { background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%); }
.metric-card.green { background: linear-gradient(135deg, #11998e 0%, #38ef7d 100%); }
.metric-card.orange { background: linear-gradient(135deg, #fa709a 0%, #fee140 100%); }
.metric-card.purple { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); }
.metric-card.red { background: linear-gradient(135deg, #ff416c 0%, #ff4b2b 100%); }
.metric-label { font-size: 14px; opacity: 0.9; }
.metric-value { font-size: 28px; font-weight: 700; margin: 10px 0; }
.metric-change { font-size: 13px; }
.change-positive { color: #00ff88; }
.change-negative { color: #ff6b6b; }
.charts-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 20px; }
.chart-container { background: white; border-radius: 12px; padding: 15px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.chart-missing { padding: 40px; text-align: center; color: #666; }
table { width: 100%; border-collapse: collapse; margin: 15px 0; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #eee; }
th { background: #f8f9fa; font-weight: 600; }
.beat { color: #28a745; font-weight: 600; }
.miss { color: #dc3545; font-weight: 600; }
.growth-positive { color: #28a745; }
.growth-negative { color: #dc3545; }
caption { caption-side: bottom; text-align: left; font-size: 12px; color: #666; padding-top: 6px; }
.attribution { margin-top: 8px; font-size: 13px; color: #555; }
.highlight-box { background: #f0f7fb; border-left: 4px solid #0066cc; padding: 15px 20px; margin: 15px 0; border-radius: 0 8px 8px 0; }
.article-body { font-size: 16px; line-height: 1.8; }
.article-body p { margin-bottom: 15px; }
.article-body h3 { margin-top: 20px; color: #1a1a2e; }
ul { margin-left: 20px; }
li { margin-bottom: 8px; }
.footer { text-align: center; padding: 20px; color: #666; font-size: 12px; }
@media print {
  body { background: white; }
  .section { box-shadow: none; border: 1px solid #eee; }
  .chart-container { page-break-inside: avoid; }
}
@media (max-width: 768px) {
  .metrics-grid { grid-template-columns: repeat(2, 1fr); }
  .charts-grid { grid-template-columns: 1fr; }
}
"#;

pub fn esc(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

pub fn long_date(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y").to_string()
}

fn header_date(data: &FinancialData, generated_at: DateTime<Utc>) -> String {
    match data.report_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(reported) => esc(reported).into_owned(),
        None => long_date(generated_at),
    }
}

pub fn article_header(data: &FinancialData, article: &Article, generated_at: DateTime<Utc>) -> String {
    let mut out = String::from("<div class=\"header\">\n");
    let _ = writeln!(
        out,
        "<div class=\"headline\">{}</div>",
        esc(article.headline_or_default())
    );
    if let Some(sub) = article.subheadline.as_deref() {
        let _ = writeln!(out, "<div class=\"subheadline\">{}</div>", esc(sub));
    }
    let _ = writeln!(
        out,
        "<div class=\"meta\">\n\
<span class=\"ticker\">{ticker}</span>\n\
<span>{company}</span>\n\
<span>{quarter} {fy}</span>\n\
<span>📅 {date}</span>\n\
<span>⏱️ {read_time} min read</span>\n\
</div>",
        ticker = esc(data.display_ticker()),
        company = esc(data.display_company()),
        quarter = esc(data.display_quarter()),
        fy = esc(data.display_fiscal_year()),
        date = header_date(data, generated_at),
        read_time = article.read_time_minutes(),
    );
    out.push_str("</div>\n");
    out
}

fn change_badge(change: Option<f64>) -> String {
    match change {
        Some(c) => {
            let (class, arrow) = if c >= 0.0 {
                ("change-positive", "▲")
            } else {
                ("change-negative", "▼")
            };
            format!(
                "<div class=\"metric-change {class}\">{arrow} {:.1}% YoY</div>",
                c.abs()
            )
        }
        None => String::new(),
    }
}

fn metric_card(label: &str, value: String, change: Option<f64>, color: &str) -> String {
    format!(
        "<div class=\"metric-card {color}\">\n\
<div class=\"metric-label\">{label}</div>\n\
<div class=\"metric-value\">{value}</div>\n\
{badge}\n\
</div>\n",
        badge = change_badge(change),
    )
}

fn trend_color(change: Option<f64>, positive: &'static str) -> &'static str {
    if change.unwrap_or(0.0) >= 0.0 {
        positive
    } else {
        "red"
    }
}

pub fn metric_cards(data: &FinancialData) -> String {
    let yoy = &data.year_over_year;
    let mut out = String::from("<div class=\"metrics-grid\">\n");
    out.push_str(&metric_card(
        "Revenue",
        format::or_na(data.revenue(), format::millions),
        yoy.revenue_change,
        trend_color(yoy.revenue_change, "blue"),
    ));
    out.push_str(&metric_card(
        "EPS",
        format::or_na(data.eps(), format::per_share),
        yoy.eps_change,
        trend_color(yoy.eps_change, "green"),
    ));
    out.push_str(&metric_card(
        "Gross Margin",
        format::or_na(data.gross_margin(), format::percent),
        None,
        "orange",
    ));
    out.push_str(&metric_card(
        "Net Income",
        format::or_na(data.net_income(), format::millions),
        yoy.net_income_change,
        trend_color(yoy.net_income_change, "purple"),
    ));
    out.push_str("</div>\n");
    out
}

fn status_cell(status: BeatStatus) -> String {
    format!("<td class=\"{}\">{}</td>", status.css_class(), status.label())
}

fn comparison_row(out: &mut String, label: &str, cells: [String; 4], status: String) {
    let _ = write!(out, "<tr><td><strong>{label}</strong></td>");
    for cell in cells {
        let _ = write!(out, "<td>{cell}</td>");
    }
    let _ = writeln!(out, "{status}</tr>");
}

pub fn comparison_table(data: &FinancialData) -> String {
    let yoy = &data.year_over_year;
    let qoq = &data.quarter_over_quarter;
    let est = &data.estimates;
    let pct = |v: Option<f64>| format::or_na(v, format::signed_percent);
    let na = || format::NOT_AVAILABLE.to_string();

    let mut out = String::from("<table class=\"comparison-table\">\n");
    if let Some(currency) = data.currency() {
        let _ = writeln!(out, "<caption>Amounts in {} millions</caption>", esc(currency));
    }
    out.push_str(
        "<tr><th>Metric</th><th>Actual</th><th>Estimate</th><th>YoY Change</th><th>QoQ Change</th><th>Status</th></tr>\n",
    );
    comparison_row(
        &mut out,
        "Revenue",
        [
            format::or_na(data.revenue(), format::millions),
            format::or_na(est.revenue_estimate, format::millions),
            pct(yoy.revenue_change),
            pct(qoq.revenue_change),
        ],
        status_cell(data.revenue_status()),
    );
    comparison_row(
        &mut out,
        data.eps_label(),
        [
            format::or_na(data.eps(), format::per_share),
            format::or_na(est.eps_estimate, format::per_share),
            pct(yoy.eps_change),
            pct(qoq.eps_change),
        ],
        status_cell(data.eps_status()),
    );
    comparison_row(
        &mut out,
        "Net Income",
        [
            format::or_na(data.net_income(), format::millions),
            na(),
            pct(yoy.net_income_change),
            na(),
        ],
        "<td></td>".to_string(),
    );
    comparison_row(
        &mut out,
        "Operating Income",
        [
            format::or_na(data.operating_income(), format::millions),
            na(),
            na(),
            na(),
        ],
        "<td></td>".to_string(),
    );
    out.push_str("</table>\n");
    out
}

fn range_text(range: &Range, f: fn(f64) -> String) -> String {
    match (range.low, range.high) {
        (Some(low), Some(high)) => format!("{} – {}", f(low), f(high)),
        (Some(v), None) | (None, Some(v)) => f(v),
        (None, None) => format::NOT_AVAILABLE.to_string(),
    }
}

/// Forward guidance ranges, or `None` when the call gave no guidance.
pub fn guidance_table(data: &FinancialData) -> Option<String> {
    let guidance = &data.guidance;
    if guidance.is_empty() {
        return None;
    }

    let rows: [(&str, &Option<Range>, fn(f64) -> String); 3] = [
        ("Next Quarter Revenue", &guidance.next_quarter_revenue, format::millions),
        ("Full Year Revenue", &guidance.full_year_revenue, format::millions),
        ("Next Quarter EPS", &guidance.next_quarter_eps, format::per_share),
    ];

    let mut out = String::from("<table class=\"guidance-table\">\n<tr><th>Guidance</th><th>Range</th></tr>\n");
    for (label, range, f) in rows {
        if let Some(range) = range.as_ref().filter(|r| !r.is_empty()) {
            let _ = writeln!(out, "<tr><td>{label}</td><td>{}</td></tr>", range_text(range, f));
        }
    }
    out.push_str("</table>\n");
    Some(out)
}

pub fn segment_table(data: &FinancialData) -> String {
    let mut out = String::from(
        "<table class=\"segment-table\">\n<tr><th>Segment</th><th>Revenue</th><th>YoY Growth</th></tr>\n",
    );
    if data.segment_performance.is_empty() {
        let _ = writeln!(out, "<tr><td colspan=\"3\">{SEGMENT_CHART_UNAVAILABLE}</td></tr>");
    }
    for seg in &data.segment_performance {
        let growth_class = if seg.growth.unwrap_or(0.0) >= 0.0 {
            "growth-positive"
        } else {
            "growth-negative"
        };
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td class=\"{growth_class}\">{}</td></tr>",
            esc(seg.display_name()),
            format::or_na(seg.revenue, format::millions),
            format::or_na(seg.growth, format::signed_percent),
        );
    }
    out.push_str("</table>\n");
    out
}

pub fn article_body(article: &Article, placeholders: bool) -> String {
    let mut out = String::from("<div class=\"article-body\">\n");
    let _ = writeln!(out, "<p><strong>{}</strong></p>", esc(article.lead_text()));

    for section in Section::ALL {
        let text = match article.section(section) {
            Some(text) => text,
            None if placeholders => section.placeholder(),
            None => "",
        };
        match section {
            Section::KeyNumbers => {
                let _ = writeln!(out, "<p>{}</p>", esc(text));
            }
            Section::ManagementCommentary => {
                let _ = writeln!(
                    out,
                    "<h3>{}</h3>\n<div class=\"highlight-box\">{}</div>",
                    section.title(),
                    esc(text)
                );
            }
            _ => {
                let _ = writeln!(out, "<h3>{}</h3>\n<p>{}</p>", section.title(), esc(text));
            }
        }
    }
    out.push_str("</div>\n");
    out
}

pub fn management_view(data: &FinancialData) -> Option<String> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };
    let quote = present(&data.ceo_quote);
    let outlook = present(&data.outlook);
    if quote.is_none() && outlook.is_none() {
        return None;
    }

    let mut out = String::new();
    if let Some(quote) = quote {
        let _ = writeln!(
            out,
            "<div class=\"highlight-box\">“{}”<div class=\"attribution\">CEO, {}</div></div>",
            esc(&quote),
            esc(data.display_company())
        );
    }
    if let Some(outlook) = outlook {
        let _ = writeln!(out, "<p><strong>Outlook:</strong> {}</p>", esc(&outlook));
    }
    Some(out)
}

pub fn highlights_list(data: &FinancialData) -> Option<String> {
    if data.key_highlights.is_empty() {
        return None;
    }
    let mut out = String::from("<ul class=\"highlights\">\n");
    for highlight in &data.key_highlights {
        let _ = writeln!(out, "<li>{}</li>", esc(highlight));
    }
    out.push_str("</ul>\n");
    Some(out)
}

pub fn charts_grid(charts: &[ChartSpec], include_plotly_js: bool) -> String {
    use crate::charts::ChartKind;

    let mut out = String::from("<div class=\"charts-grid\">\n");
    for (i, chart) in charts.iter().enumerate() {
        let _ = writeln!(
            out,
            "<div class=\"chart-container\">\n{}\n</div>",
            chart.to_html_fragment(include_plotly_js && i == 0)
        );
    }
    if !charts.iter().any(|c| c.kind == ChartKind::Segment) {
        let _ = writeln!(
            out,
            "<div class=\"chart-container\"><div class=\"chart-missing\">{SEGMENT_CHART_UNAVAILABLE}</div></div>"
        );
    }
    out.push_str("</div>\n");
    out
}
