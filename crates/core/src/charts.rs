use crate::domain::financials::{FinancialData, HistoricalQuarter};
use crate::format;
use serde::Serialize;
use serde_json::{json, Value};

pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const CHART_HEIGHT_PX: u32 = 400;
const TITLE_FONT_SIZE: u32 = 20;
const GRID_COLOR: &str = "#EBF0F8";

const REVENUE_BAR: &str = "#4facfe";
const REVENUE_BAR_CURRENT: &str = "#00f2fe";
const REVENUE_TREND: &str = "#ff6b6b";
const EPS_LINE: &str = "#667eea";
const EPS_FILL: &str = "rgba(102, 126, 234, 0.2)";
const POSITIVE: &str = "#38ef7d";
const NEGATIVE: &str = "#ff4b2b";

const SEGMENT_PALETTE: [&str; 8] = [
    "rgb(102,194,165)",
    "rgb(252,141,98)",
    "rgb(141,160,203)",
    "rgb(231,138,195)",
    "rgb(166,216,84)",
    "rgb(255,217,47)",
    "rgb(229,196,148)",
    "rgb(179,179,179)",
];

const DEFAULT_CURRENT_REVENUE: f64 = 100.0;
const DEFAULT_CURRENT_EPS: f64 = 1.0;
const SYNTHETIC_REVENUE_RATIOS: [f64; 4] = [0.90, 0.95, 0.98, 1.00];
const SYNTHETIC_EPS_RATIOS: [f64; 4] = [0.85, 0.90, 0.95, 1.00];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Revenue,
    Eps,
    YoyComparison,
    Segment,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Revenue,
        ChartKind::Eps,
        ChartKind::YoyComparison,
        ChartKind::Segment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Revenue => "Quarterly Revenue Trend",
            ChartKind::Eps => "Earnings Per Share Trend",
            ChartKind::YoyComparison => "Year-over-Year Change",
            ChartKind::Segment => "Revenue by Segment",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Revenue => "revenue",
            ChartKind::Eps => "eps",
            ChartKind::YoyComparison => "yoy_comparison",
            ChartKind::Segment => "segment",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            ChartKind::Revenue => "revenue_chart",
            ChartKind::Eps => "eps_chart",
            ChartKind::YoyComparison => "yoy_comparison",
            ChartKind::Segment => "segment_chart",
        }
    }

    pub fn build(self, data: &FinancialData) -> Option<ChartSpec> {
        match self {
            ChartKind::Revenue => Some(revenue_chart(data)),
            ChartKind::Eps => Some(eps_chart(data)),
            ChartKind::YoyComparison => Some(comparison_chart(data)),
            ChartKind::Segment => segment_chart(data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub figure: Value,
}

impl ChartSpec {
    pub fn element_id(&self) -> String {
        format!("chart-{}", self.kind.slug())
    }

    pub fn to_html_fragment(&self, include_plotly_js: bool) -> String {
        let id = self.element_id();
        let mut out = String::new();
        if include_plotly_js {
            out.push_str(&format!("<script src=\"{PLOTLY_CDN_URL}\"></script>\n"));
        }
        out.push_str(&format!(
            "<div id=\"{id}\" class=\"plotly-chart\" style=\"width:100%;height:{CHART_HEIGHT_PX}px;\"></div>\n\
<script>Plotly.newPlot(\"{id}\", {data}, {layout}, {{\"responsive\": true}});</script>",
            data = script_json(&self.figure["data"]),
            layout = script_json(&self.figure["layout"]),
        ));
        out
    }

    pub fn to_standalone_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
<title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
            title = self.kind.title(),
            body = self.to_html_fragment(true),
        )
    }
}

/// JSON safe to embed in an inline `<script>`.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn layout(kind: ChartKind, x_title: Option<&str>, y_title: Option<&str>, show_legend: bool) -> Value {
    let axis = |title: Option<&str>| {
        let mut axis = json!({"gridcolor": GRID_COLOR, "zerolinecolor": GRID_COLOR});
        if let Some(title) = title {
            axis["title"] = json!({"text": title});
        }
        axis
    };

    json!({
        "title": {"text": kind.title(), "font": {"size": TITLE_FONT_SIZE}},
        "xaxis": axis(x_title),
        "yaxis": axis(y_title),
        "paper_bgcolor": "white",
        "plot_bgcolor": "white",
        "height": CHART_HEIGHT_PX,
        "showlegend": show_legend,
        "margin": {"t": 50, "b": 50, "l": 50, "r": 50},
    })
}

fn quarter_labels(history: &[HistoricalQuarter]) -> Vec<String> {
    history
        .iter()
        .enumerate()
        .map(|(i, q)| q.quarter.clone().unwrap_or_else(|| format!("Q{}", i + 1)))
        .collect()
}

fn synthetic_history(current: f64, ratios: [f64; 4], eps: bool) -> Vec<HistoricalQuarter> {
    ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| {
            let value = Some(current * ratio);
            HistoricalQuarter {
                quarter: Some(format!("Q{}", i + 1)),
                revenue: if eps { None } else { value },
                eps: if eps { value } else { None },
            }
        })
        .collect()
}

pub fn revenue_chart(data: &FinancialData) -> ChartSpec {
    let history = if data.historical_quarters.is_empty() {
        let current = data.revenue().unwrap_or(DEFAULT_CURRENT_REVENUE);
        synthetic_history(current, SYNTHETIC_REVENUE_RATIOS, false)
    } else {
        data.historical_quarters.clone()
    };

    let quarters = quarter_labels(&history);
    let revenues: Vec<f64> = history.iter().map(|q| q.revenue.unwrap_or(0.0)).collect();
    let colors: Vec<&str> = (0..revenues.len())
        .map(|i| {
            if i + 1 == revenues.len() {
                REVENUE_BAR_CURRENT
            } else {
                REVENUE_BAR
            }
        })
        .collect();
    let labels: Vec<String> = revenues
        .iter()
        .map(|r| if *r != 0.0 { format::millions(*r) } else { String::new() })
        .collect();

    ChartSpec {
        kind: ChartKind::Revenue,
        figure: json!({
            "data": [
                {
                    "type": "bar",
                    "x": quarters,
                    "y": revenues,
                    "marker": {"color": colors},
                    "text": labels,
                    "textposition": "outside",
                    "name": "Revenue",
                },
                {
                    "type": "scatter",
                    "x": quarters,
                    "y": revenues,
                    "mode": "lines+markers",
                    "line": {"color": REVENUE_TREND, "width": 3},
                    "marker": {"size": 10},
                    "name": "Trend",
                }
            ],
            "layout": layout(ChartKind::Revenue, Some("Quarter"), Some("Revenue ($ Millions)"), false),
        }),
    }
}

pub fn eps_chart(data: &FinancialData) -> ChartSpec {
    let history = if data.historical_quarters.is_empty() {
        let current = data.eps().unwrap_or(DEFAULT_CURRENT_EPS);
        synthetic_history(current, SYNTHETIC_EPS_RATIOS, true)
    } else {
        data.historical_quarters.clone()
    };

    let quarters = quarter_labels(&history);
    let eps_values: Vec<f64> = history.iter().map(|q| q.eps.unwrap_or(0.0)).collect();
    let labels: Vec<String> = eps_values
        .iter()
        .map(|e| if *e != 0.0 { format::per_share(*e) } else { String::new() })
        .collect();

    ChartSpec {
        kind: ChartKind::Eps,
        figure: json!({
            "data": [{
                "type": "scatter",
                "x": quarters,
                "y": eps_values,
                "mode": "lines+markers+text",
                "fill": "tozeroy",
                "fillcolor": EPS_FILL,
                "line": {"color": EPS_LINE, "width": 3},
                "marker": {"size": 12, "color": EPS_LINE},
                "text": labels,
                "textposition": "top center",
                "name": "EPS",
            }],
            "layout": layout(ChartKind::Eps, Some("Quarter"), Some("EPS ($)"), false),
        }),
    }
}

pub fn comparison_chart(data: &FinancialData) -> ChartSpec {
    let yoy = &data.year_over_year;
    let metrics = ["Revenue", "EPS", "Net Income"];
    let changes = [
        yoy.revenue_change.unwrap_or(0.0),
        yoy.eps_change.unwrap_or(0.0),
        yoy.net_income_change.unwrap_or(0.0),
    ];
    let colors: Vec<&str> = changes
        .iter()
        .map(|c| if *c >= 0.0 { POSITIVE } else { NEGATIVE })
        .collect();
    let labels: Vec<String> = changes.iter().map(|c| format::signed_percent(*c)).collect();

    let mut layout = layout(ChartKind::YoyComparison, Some("Metric"), Some("Change (%)"), false);
    layout["shapes"] = json!([{
        "type": "line",
        "xref": "paper",
        "x0": 0,
        "x1": 1,
        "yref": "y",
        "y0": 0,
        "y1": 0,
        "line": {"dash": "dash", "color": "gray"},
    }]);

    ChartSpec {
        kind: ChartKind::YoyComparison,
        figure: json!({
            "data": [{
                "type": "bar",
                "x": metrics,
                "y": changes,
                "marker": {"color": colors},
                "text": labels,
                "textposition": "outside",
            }],
            "layout": layout,
        }),
    }
}

/// Donut of segment revenues, or `None` when no segment carries revenue.
pub fn segment_chart(data: &FinancialData) -> Option<ChartSpec> {
    let segments: Vec<_> = data
        .segment_performance
        .iter()
        .filter(|s| s.revenue.is_some_and(|r| r > 0.0))
        .collect();
    if segments.is_empty() {
        return None;
    }

    let names: Vec<&str> = segments.iter().map(|s| s.display_name()).collect();
    let revenues: Vec<f64> = segments.iter().map(|s| s.revenue.unwrap_or(0.0)).collect();

    Some(ChartSpec {
        kind: ChartKind::Segment,
        figure: json!({
            "data": [{
                "type": "pie",
                "labels": names,
                "values": revenues,
                "hole": 0.4,
                "marker": {"colors": SEGMENT_PALETTE},
            }],
            "layout": layout(ChartKind::Segment, None, None, true),
        }),
    })
}

pub fn all_charts(data: &FinancialData) -> Vec<ChartSpec> {
    ChartKind::ALL
        .into_iter()
        .filter_map(|kind| kind.build(data))
        .collect()
}
