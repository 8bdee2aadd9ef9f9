use crate::pages::{self, FormView};
use crate::session::ReportStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use earnings_news_core::charts;
use earnings_news_core::config::Settings;
use earnings_news_core::domain::article::Article;
use earnings_news_core::domain::financials::FinancialData;
use earnings_news_core::domain::report::Report;
use earnings_news_core::export::{self, ExportKind};
use earnings_news_core::pipeline::{self, ClientFactory, GenerateRequest, PipelineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub factory: Arc<dyn ClientFactory>,
    pub reports: Arc<ReportStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate_form))
        .route("/reports/:id", get(show_report))
        .route("/reports/:id/download/:export", get(download))
        .route("/api/generate", post(api_generate))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::input_page(
        &FormView::initial(state.settings.demo_mode_default),
        None,
    ))
}

/// Checkbox semantics: the field is present only when ticked.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub demo_mode: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub transcript: String,
}

fn error_status(err: &PipelineError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Runs the pipeline for one request. Upstream failures are reported to
/// Sentry; input errors are only logged.
async fn run_pipeline(
    state: &AppState,
    request: &GenerateRequest,
) -> Result<Arc<Report>, (StatusCode, String)> {
    match pipeline::generate(
        request,
        state.settings.anthropic_api_key.as_deref(),
        state.factory.as_ref(),
    )
    .await
    {
        Ok(report) => {
            let report = state.reports.insert(report);
            tracing::info!(
                report_id = %report.id,
                source = ?report.source,
                ticker = report.financials.display_ticker(),
                stored = state.reports.len(),
                "report generated"
            );
            Ok(report)
        }
        Err(err) => {
            let status = error_status(&err);
            let message = err.user_message();
            if err.is_input_error() {
                tracing::warn!(error = %err, "rejected generate request");
            } else {
                let err = anyhow::Error::new(err);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "generate failed");
            }
            Err((status, message))
        }
    }
}

async fn generate_form(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> Response {
    let request = GenerateRequest {
        demo_mode: form.demo_mode.is_some(),
        api_key: form.api_key,
        transcript: form.transcript,
    };

    match run_pipeline(&state, &request).await {
        Ok(report) => Redirect::to(&format!("/reports/{}", report.id)).into_response(),
        Err((status, message)) => {
            let view = FormView {
                demo_mode: request.demo_mode,
                transcript: request.transcript,
            };
            (status, Html(pages::input_page(&view, Some(&message)))).into_response()
        }
    }
}

async fn show_report(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.reports.get(id) {
        Some(report) => Html(pages::results_page(&report)).into_response(),
        None => (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response(),
    }
}

async fn download(
    State(state): State<AppState>,
    Path((id, export)): Path<(Uuid, String)>,
) -> Response {
    let Some(kind) = ExportKind::from_slug(&export) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(report) = state.reports.get(id) else {
        return (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response();
    };

    let rendered = export::render_export(
        kind,
        &report.financials,
        &report.article,
        report.generated_at,
    );
    match rendered {
        Ok(Some(body)) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                kind.file_name(&report.financials.export_stem())
            );
            (
                [
                    (header::CONTENT_TYPE, kind.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, report_id = %id, export = %export, "export render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiGenerateRequest {
    #[serde(default)]
    pub demo_mode: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ApiReport {
    pub report_id: Uuid,
    pub financial_data: FinancialData,
    pub article: Article,
    /// Plotly figures keyed by chart slug; the segment chart may be absent.
    pub charts: BTreeMap<&'static str, Value>,
}

impl ApiReport {
    fn from_report(report: &Report) -> Self {
        Self {
            report_id: report.id,
            financial_data: report.financials.clone(),
            article: report.article.clone(),
            charts: charts::all_charts(&report.financials)
                .into_iter()
                .map(|spec| (spec.kind.slug(), spec.figure))
                .collect(),
        }
    }
}

fn api_error(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn api_generate(
    State(state): State<AppState>,
    payload: Result<Json<ApiGenerateRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "rejected API generate body");
            return api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };
    let request = GenerateRequest {
        demo_mode: body.demo_mode,
        api_key: body.api_key,
        transcript: body.transcript,
    };

    match run_pipeline(&state, &request).await {
        Ok(report) => Json(ApiReport::from_report(&report)).into_response(),
        Err((status, message)) => api_error(status, message),
    }
}
