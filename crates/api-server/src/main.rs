use std::net::SocketAddr;
use std::sync::Arc;

use teger_api::http::{self, AppState};
use teger_shared::analysis::MessageAnalyzer;
use teger_shared::config::{ApiConfig, LogFormat, load_dotenv};
use teger_shared::llm::{GeminiGateway, GeminiGatewayConfig, LlmGateway};
use tokio::signal;
use tracing::{error, info, warn};

const DEFAULT_LOG_FILTER: &str = "teger_api=info,teger_shared=info,tower_http=info";

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let gateway_config = match GeminiGatewayConfig::from_env() {
        Ok(gateway_config) => gateway_config,
        Err(err) => {
            error!(error = %err, "failed to read gemini config");
            std::process::exit(1);
        }
    };

    let analyzer = match gateway_config {
        Some(gateway_config) => match GeminiGateway::new(gateway_config) {
            Ok(gateway) => {
                info!(model = gateway.model(), "gemini gateway configured");
                let gateway: Arc<dyn LlmGateway> = Arc::new(gateway);
                MessageAnalyzer::new(Some(gateway))
            }
            Err(err) => {
                error!(error = %err, "failed to initialize gemini gateway");
                std::process::exit(1);
            }
        },
        None if config.require_model_api_key => {
            error!("GEMINI_API_KEY is not set and GEMINI_REQUIRE_API_KEY is enabled");
            std::process::exit(1);
        }
        None => {
            warn!("GEMINI_API_KEY is not set; /analyze will fail until it is configured");
            MessageAnalyzer::unconfigured()
        }
    };

    if config.cors_allowed_origins.is_empty() {
        warn!("CORS allows any origin; set CORS_ALLOWED_ORIGINS to restrict it");
    }

    let app = http::build_router(AppState {
        analyzer,
        health_engine_label: config.health_engine_label,
        cors_allowed_origins: config.cors_allowed_origins,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(bind_addr = %config.bind_addr, error = %err, "invalid API_BIND_ADDR");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(
        "analysis gateway listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}

fn init_tracing(log_format: LogFormat) {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
