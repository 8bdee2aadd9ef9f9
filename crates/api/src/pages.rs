use earnings_news_core::charts;
use earnings_news_core::domain::demo::SAMPLE_TRANSCRIPT;
use earnings_news_core::domain::report::{Report, ReportSource};
use earnings_news_core::export::ExportKind;
use earnings_news_core::render::{self, esc};
use html_escape::encode_double_quoted_attribute as attr;
use std::fmt::Write;

const UI_STYLESHEET: &str = r#"
.layout { display: grid; grid-template-columns: 280px 1fr; gap: 20px; align-items: start; }
.sidebar { background: white; border-radius: 12px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.sidebar h2 { font-size: 18px; margin: 10px 0; }
.sidebar ol { margin-left: 20px; font-size: 14px; }
label { display: block; font-weight: 600; margin: 12px 0 6px; }
input[type=password], textarea { width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 8px; font: inherit; }
textarea { min-height: 400px; font-family: monospace; font-size: 13px; }
.toggle { display: flex; gap: 8px; align-items: center; font-weight: 600; }
.toggle input { width: auto; }
.hint { font-size: 12px; color: #666; }
.button { display: inline-block; background: #0066cc; color: white; border: none; border-radius: 8px; padding: 12px 24px; font-size: 16px; font-weight: 600; cursor: pointer; text-decoration: none; }
.alert { padding: 12px 16px; border-radius: 8px; margin-bottom: 16px; }
.alert.error { background: #fdecea; color: #b71c1c; }
.alert.success { background: #e8f5e9; color: #1b5e20; }
.alert.info { background: #e3f2fd; color: #0d47a1; }
.downloads li { margin-bottom: 6px; }
.downloads .primary a { font-weight: 700; }
@media (max-width: 768px) { .layout { grid-template-columns: 1fr; } }
"#;

/// Values echoed back into the input form. The API key is never echoed.
#[derive(Debug, Clone)]
pub struct FormView {
    pub demo_mode: bool,
    pub transcript: String,
}

impl FormView {
    pub fn initial(demo_mode: bool) -> Self {
        Self {
            demo_mode,
            transcript: SAMPLE_TRANSCRIPT.to_string(),
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
<title>{title}</title>\n\
<style>{base}{ui}</style>\n\
</head>\n<body>\n\
<h1>📊 Earnings News Generator</h1>\n\
<p class=\"hint\">Transform earnings call transcripts into professional news articles with infographics</p>\n\
{body}\n</body>\n</html>\n",
        title = esc(title),
        base = render::STYLESHEET,
        ui = UI_STYLESHEET,
    )
}

fn section(title: &str, inner: &str) -> String {
    format!(
        "<div class=\"section\">\n<div class=\"section-title\">{title}</div>\n{inner}</div>\n"
    )
}

pub fn input_page(form: &FormView, error: Option<&str>) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/generate\" class=\"layout\">\n");

    let _ = write!(
        body,
        "<aside class=\"sidebar\">\n\
<h2>⚙️ Settings</h2>\n\
<label class=\"toggle\"><input type=\"checkbox\" name=\"demo_mode\" value=\"on\"{checked}> 🎮 Demo Mode (No API needed)</label>\n\
<p class=\"hint\">Use sample Apple earnings data to see how the app works.</p>\n\
<label for=\"api_key\">Claude API Key</label>\n\
<input type=\"password\" id=\"api_key\" name=\"api_key\" autocomplete=\"off\">\n\
<p class=\"hint\">Ignored in demo mode. Get a key at console.anthropic.com.</p>\n\
<h2>📋 Quick Guide</h2>\n\
<ol>\n\
<li>Toggle Demo Mode ON to try the app</li>\n\
<li>Or enter a Claude API key for real data</li>\n\
<li>Paste an earnings transcript</li>\n\
<li>Click <strong>Generate News</strong></li>\n\
<li>View article &amp; infographics</li>\n\
</ol>\n\
</aside>\n",
        checked = if form.demo_mode { " checked" } else { "" },
    );

    body.push_str("<main>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<div class=\"alert error\">{}</div>", esc(error));
    }
    let _ = write!(
        body,
        "<div class=\"section\">\n\
<div class=\"section-title\">📝 Paste Earnings Call Transcript</div>\n\
<label for=\"transcript\">Transcript</label>\n\
<textarea id=\"transcript\" name=\"transcript\">{transcript}</textarea>\n\
<p><button type=\"submit\" class=\"button\">🚀 Generate News</button></p>\n\
</div>\n\
</main>\n</form>\n",
        transcript = esc(&form.transcript),
    );

    page("Earnings News Generator", &body)
}

pub fn results_page(report: &Report) -> String {
    let data = &report.financials;
    let article = &report.article;
    let charts = charts::all_charts(data);

    let mut body = String::new();
    let banner = match report.source {
        ReportSource::Demo => "✅ Demo report generated from sample Apple earnings data.",
        ReportSource::Llm => "✅ News article generated successfully!",
    };
    let _ = writeln!(body, "<div class=\"alert success\">{banner}</div>");
    body.push_str(&render::article_header(data, article, report.generated_at));

    body.push_str(&section("📊 Key Metrics", &render::metric_cards(data)));
    body.push_str(&section("📋 Estimates vs Actual", &render::comparison_table(data)));
    body.push_str(&section(
        "📈 Performance Charts",
        &render::charts_grid(&charts, true),
    ));
    if !data.segment_performance.is_empty() {
        body.push_str(&section("🏢 Segment Performance", &render::segment_table(data)));
    }
    if let Some(guidance) = render::guidance_table(data) {
        body.push_str(&section("🧭 Guidance", &guidance));
    }
    if let Some(view) = render::management_view(data) {
        body.push_str(&section("💬 Management View", &view));
    }
    body.push_str(&section("📰 Full Article", &render::article_body(article, true)));
    if let Some(highlights) = render::highlights_list(data) {
        body.push_str(&section("🎯 Key Highlights", &highlights));
    }
    body.push_str(&section("📥 Export Options", &downloads_list(report)));
    body.push_str("<p><a class=\"button\" href=\"/\">← New transcript</a></p>\n");

    page(
        &format!("{} {} Earnings News", data.display_ticker(), data.display_quarter()),
        &body,
    )
}

pub fn download_path(report: &Report, kind: ExportKind) -> String {
    format!("/reports/{}/download/{}", report.id, kind.slug())
}

fn downloads_list(report: &Report) -> String {
    let stem = report.financials.export_stem();
    let mut out = String::from("<ul class=\"downloads\">\n");
    for kind in ExportKind::all() {
        if !kind.is_available(&report.financials) {
            continue;
        }
        let class = if kind == ExportKind::HtmlReport {
            " class=\"primary\""
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<li{class}><a href=\"{href}\" download=\"{file}\">{label}</a></li>",
            href = attr(&download_path(report, kind)),
            file = attr(&kind.file_name(&stem)),
            label = kind.label(),
        );
    }
    out.push_str("</ul>\n<p class=\"hint\">💡 Open the HTML report in a browser and print to PDF to keep the charts.</p>\n");
    out
}

pub fn not_found_page() -> String {
    page(
        "Report not found",
        "<div class=\"alert info\">This report is no longer available. Reports are kept in memory only; generate it again.</div>\n\
<p><a class=\"button\" href=\"/\">← Back</a></p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use earnings_news_core::charts::ChartKind;
    use earnings_news_core::domain::financials::FinancialData;
    use earnings_news_core::pipeline::demo_report;

    #[test]
    fn input_page_escapes_transcript_and_reflects_toggle() {
        let form = FormView {
            demo_mode: false,
            transcript: "</textarea><script>alert(1)</script>".to_string(),
        };
        let html = input_page(&form, Some("Bad <input>"));
        assert!(html.contains("&lt;/textarea&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("Bad &lt;input&gt;"));
        assert!(!html.contains(" checked>"));

        let html = input_page(&FormView::initial(true), None);
        assert!(html.contains(" checked>"));
        assert!(html.contains("Apple Inc"));
    }

    #[test]
    fn results_page_links_every_available_export() {
        let report = demo_report(chrono::Utc::now());
        let html = results_page(&report);
        for kind in ExportKind::all() {
            assert!(html.contains(&download_path(&report, kind)));
        }
        assert!(html.contains("AAPL_earnings_report.html"));
        assert!(html.contains("Demo report generated"));
    }

    #[test]
    fn results_page_omits_segment_download_without_segments() {
        let mut report = demo_report(chrono::Utc::now());
        report.financials = FinancialData::default();
        let html = results_page(&report);
        assert!(!html.contains(&download_path(&report, ExportKind::Chart(ChartKind::Segment))));
        assert!(html.contains(render::SEGMENT_CHART_UNAVAILABLE));
        assert!(html.contains("earnings_metrics.csv"));
    }
}
