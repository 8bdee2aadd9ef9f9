pub mod charts;
pub mod domain;
pub mod export;
pub mod format;
pub mod llm;
pub mod pipeline;
pub mod render;

pub mod config {
    use anyhow::Context;

    const DEFAULT_SESSION_CAPACITY: usize = 64;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub anthropic_api_key: Option<String>,
        pub anthropic_model: Option<String>,
        pub anthropic_base_url: Option<String>,
        pub anthropic_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
        pub demo_mode_default: bool,
        pub session_capacity: usize,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                anthropic_api_key: None,
                anthropic_model: None,
                anthropic_base_url: None,
                anthropic_timeout_secs: None,
                sentry_dsn: None,
                port: None,
                demo_mode_default: true,
                session_capacity: DEFAULT_SESSION_CAPACITY,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match non_empty_var("PORT") {
                Some(raw) => Some(
                    raw.parse::<u16>()
                        .with_context(|| format!("PORT must be a port number (got {raw})"))?,
                ),
                None => None,
            };
            let anthropic_timeout_secs = non_empty_var("ANTHROPIC_TIMEOUT_SECS")
                .map(|raw| parse_timeout_secs(&raw))
                .transpose()?;

            Ok(Self {
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
                anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL"),
                anthropic_timeout_secs,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port,
                demo_mode_default: non_empty_var("DEMO_MODE_DEFAULT")
                    .map(|s| parse_bool_flag(&s))
                    .unwrap_or(true),
                session_capacity: non_empty_var("SESSION_CAPACITY")
                    .and_then(|s| s.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_SESSION_CAPACITY),
            })
        }
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_timeout_secs(raw: &str) -> anyhow::Result<u64> {
        let secs = raw.parse::<u64>().with_context(|| {
            format!("ANTHROPIC_TIMEOUT_SECS must be a whole number of seconds (got {raw})")
        })?;
        anyhow::ensure!(secs > 0, "ANTHROPIC_TIMEOUT_SECS must be greater than 0");
        Ok(secs)
    }

    fn parse_bool_flag(raw: &str) -> bool {
        !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    }

}
