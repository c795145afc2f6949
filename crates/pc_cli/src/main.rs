use anyhow::{anyhow, Context};
use clap::Parser;
use pc_core::logging::init_logging;
use pc_core::{
    ColumnRequest, LlmClient, NewsSource, RetryPolicy, SearchMode, DEFAULT_DAYS_BACK,
    DEFAULT_REVISION_ATTEMPTS,
};
use pc_inference::models::openai;
use pc_inference::{create_model, ModelConfig, ModelKind, OpenAiConfig};
use pc_news::{DisabledNewsSource, NaverNewsClient, NewsConfig};
use pc_pipeline::{ColumnService, PipelineConfig};
use pc_web::{create_app, AppState, WebConfig};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on a single news search attempt.
const NEWS_CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_value = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number means seconds.
        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            has_value = true;
        }

        if !has_value || total_seconds == 0 {
            return Err("Duration must be a positive number (e.g. 90s, 5m, 1m30s)".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

fn parse_search_mode(s: &str) -> std::result::Result<SearchMode, String> {
    match s.trim().to_lowercase().as_str() {
        "title" => Ok(SearchMode::Title),
        "all" => Ok(SearchMode::All),
        other => Err(format!("search mode must be 'title' or 'all', got '{}'", other)),
    }
}

#[derive(Parser, Debug)]
#[command(name = "pc", author, version, about = "Balanced political column generator", long_about = None)]
pub struct Cli {
    #[arg(long, env = "PC_MODEL", default_value = "openai", help = "Model backend. Available models: openai (default), dummy")]
    model: String,
    #[arg(long, env = "PC_MODEL_NAME", default_value = openai::DEFAULT_MODEL)]
    model_name: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    naver_client_id: Option<String>,
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    naver_client_secret: Option<String>,
    /// Wall-clock limit for one column (e.g. 5m, 90s)
    #[arg(long, env = "PC_REQUEST_DEADLINE", default_value = "5m")]
    request_deadline: HumanDuration,
    /// Limit for a single model call before it is retried
    #[arg(long, env = "PC_CALL_TIMEOUT", default_value = "60s")]
    call_timeout: HumanDuration,
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate one column and print the JSON envelope
    Generate {
        topic: String,
        #[arg(long, default_value_t = DEFAULT_REVISION_ATTEMPTS)]
        max_revision_attempts: u32,
        #[arg(long, default_value_t = DEFAULT_DAYS_BACK)]
        days_back: u32,
        #[arg(long, default_value = "title", value_parser = parse_search_mode)]
        search_mode: SearchMode,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "PC_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
        #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = pc_web::config::DEFAULT_RATE_LIMIT_PER_MINUTE)]
        rate_limit_per_minute: u32,
        #[arg(long, env = "MAX_REQUEST_SIZE", default_value_t = pc_web::config::DEFAULT_MAX_REQUEST_SIZE)]
        max_request_size: usize,
        /// Comma-separated CORS origins
        #[arg(long, env = "ALLOWED_ORIGINS")]
        allowed_origins: Option<String>,
    },
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn build_news(cli: &Cli) -> anyhow::Result<Arc<dyn NewsSource>> {
    match (non_empty(&cli.naver_client_id), non_empty(&cli.naver_client_secret)) {
        (Some(id), Some(secret)) => {
            let retry = RetryPolicy::default().with_call_timeout(NEWS_CALL_TIMEOUT.min(cli.call_timeout.0));
            let client = NaverNewsClient::new(NewsConfig::new(id, secret).with_retry(retry))?;
            info!("📰 News search enabled");
            Ok(Arc::new(client))
        }
        _ => {
            warn!("⚠️ Naver credentials missing, columns will be written without news sources");
            Ok(Arc::new(DisabledNewsSource))
        }
    }
}

fn build_model(cli: &Cli) -> anyhow::Result<Arc<dyn LlmClient>> {
    let kind: ModelKind = cli.model.parse()?;
    let config = match kind {
        ModelKind::OpenAi => {
            let key = non_empty(&cli.openai_api_key)
                .ok_or_else(|| anyhow!("OPENAI_API_KEY is required for the openai model"))?;
            ModelConfig::openai(
                OpenAiConfig::new(key)
                    .with_base_url(cli.openai_base_url.as_str())
                    .with_model(cli.model_name.as_str()),
            )
        }
        ModelKind::Dummy => ModelConfig::dummy(),
    };
    let retry = RetryPolicy::default().with_call_timeout(cli.call_timeout.0);
    let model = create_model(config.with_retry(retry))?;
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}

fn build_service(cli: &Cli) -> anyhow::Result<ColumnService> {
    let news = build_news(cli)?;
    let model = build_model(cli)?;
    let config = PipelineConfig::default().with_request_deadline(cli.request_deadline.0);
    Ok(ColumnService::new(news, model, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level.to_lowercase());

    let service = build_service(&cli)?;

    match cli.command {
        Commands::Generate {
            topic,
            max_revision_attempts,
            days_back,
            search_mode,
        } => {
            let request = ColumnRequest {
                topic,
                max_revision_attempts,
                days_back,
                search_mode,
            };
            let outcome = service.respond(&request).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Serve {
            bind,
            rate_limit_per_minute,
            max_request_size,
            allowed_origins,
        } => {
            let mut config = WebConfig {
                rate_limit_per_minute,
                max_request_size,
                ..WebConfig::default()
            };
            if let Some(origins) = allowed_origins.as_deref() {
                config = config.with_origins_csv(origins);
            }
            let app = create_app(AppState::new(service, &config), &config);
            pc_web::serve(app, bind)
                .await
                .with_context(|| format!("server on {} stopped", bind))?;
        }
    }

    Ok(())
}
