use anyhow::Context;
use clap::{Parser, ValueEnum};
use earnings_news_core::charts::ChartKind;
use earnings_news_core::config::Settings;
use earnings_news_core::domain::demo::SAMPLE_TRANSCRIPT;
use earnings_news_core::domain::report::Report;
use earnings_news_core::export::{self, ExportKind};
use earnings_news_core::llm::error::LlmDiagnosticsError;
use earnings_news_core::pipeline::{self, AnthropicFactory, GenerateRequest};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "earnings_news_cli")]
struct Args {
    /// Use the built-in Apple sample instead of calling the model.
    #[arg(long)]
    demo: bool,

    /// Transcript file, or `-` for stdin. Defaults to the sample transcript.
    #[arg(long)]
    transcript: Option<String>,

    /// Overrides ANTHROPIC_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write only one family of exports.
    #[arg(long, value_enum)]
    only: Option<Only>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Only {
    Html,
    Json,
    Txt,
    Csv,
    Charts,
}

impl Only {
    fn kinds(self) -> Vec<ExportKind> {
        match self {
            Only::Html => vec![ExportKind::HtmlReport],
            Only::Json => vec![ExportKind::Json],
            Only::Txt => vec![ExportKind::ArticleText],
            Only::Csv => vec![ExportKind::MetricsCsv],
            Only::Charts => ChartKind::ALL.into_iter().map(ExportKind::Chart).collect(),
        }
    }
}

fn selected_kinds(only: Option<Only>) -> Vec<ExportKind> {
    only.map(Only::kinds).unwrap_or_else(ExportKind::all)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let transcript = if args.demo {
        String::new()
    } else {
        read_transcript(args.transcript.as_deref()).await?
    };
    let request = GenerateRequest {
        demo_mode: args.demo,
        api_key: args.api_key,
        transcript,
    };

    let factory = AnthropicFactory::new(settings.clone());
    let report = match pipeline::generate(
        &request,
        settings.anthropic_api_key.as_deref(),
        &factory,
    )
    .await
    {
        Ok(report) => report,
        Err(err) => {
            let message = err.user_message();
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            if let Some(diag) = err
                .chain()
                .find_map(|e| e.downcast_ref::<LlmDiagnosticsError>())
            {
                if let Some(raw) = diag.raw_output.as_deref() {
                    tracing::debug!(stage = diag.stage, raw_output = raw, "unparseable model reply");
                }
            }
            tracing::error!(error = %err, "generate failed");
            anyhow::bail!(message);
        }
    };

    let written = write_exports(&report, &selected_kinds(args.only), &args.out_dir).await?;
    tracing::info!(
        report_id = %report.id,
        ticker = report.financials.display_ticker(),
        files = written.len(),
        "exports written"
    );
    Ok(())
}

async fn read_transcript(source: Option<&str>) -> anyhow::Result<String> {
    match source {
        None => {
            tracing::info!("no --transcript given; using the sample transcript");
            Ok(SAMPLE_TRANSCRIPT.to_string())
        }
        Some("-") => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("read transcript from stdin failed")?;
            Ok(buf)
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read transcript {path} failed")),
    }
}

/// Renders each requested export into `out_dir`. Unavailable exports
/// (a segment chart without segment data) are skipped.
async fn write_exports(
    report: &Report,
    kinds: &[ExportKind],
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("create {} failed", out_dir.display()))?;

    let stem = report.financials.export_stem();
    let mut written = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let Some(body) = export::render_export(
            kind,
            &report.financials,
            &report.article,
            report.generated_at,
        )?
        else {
            tracing::info!(export = %kind.slug(), "export unavailable for this report; skipped");
            continue;
        };

        let path = out_dir.join(kind.file_name(&stem));
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {} failed", path.display()))?;
        tracing::info!(path = %path.display(), "wrote export");
        written.push(path);
    }
    Ok(written)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
