//! Contract API Server - Backend for employment contract summarization
//!
//! Provides REST endpoints for:
//! - Contract upload with text, language and entity extraction
//! - Summary generation (brief, standard, detailed) with review and feedback
//! - Model status and the audit trail

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use contract_nlp::ContractAnalyzer;
use summarizer_core::{ContractSummarizer, ModelInfo, SummarizerConfig, EXTRACTIVE_MODEL_NAME};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod handlers;
mod models;
mod state;
mod storage;
#[cfg(test)]
mod tests;

use config::Args;
use state::{AppState, SharedState};

/// All API routes with tracing and the upload size limit applied
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Contracts
        .route(
            "/api/contracts/upload",
            post(handlers::contracts::upload_contract),
        )
        .route("/api/contracts", get(handlers::contracts::list_contracts))
        .route(
            "/api/contracts/:id",
            get(handlers::contracts::get_contract).delete(handlers::contracts::delete_contract),
        )
        // Summaries
        .route(
            "/api/summaries/generate/:contract_id",
            post(handlers::summaries::generate_summary),
        )
        .route("/api/summaries/:id", get(handlers::summaries::get_summary))
        .route(
            "/api/summaries/contract/:contract_id",
            get(handlers::summaries::list_contract_summaries),
        )
        .route(
            "/api/summaries/:id/approve",
            put(handlers::summaries::approve_summary),
        )
        .route(
            "/api/summaries/:id/feedback",
            post(handlers::summaries::submit_feedback),
        )
        // Model and audit
        .route("/api/model/info", get(handlers::model_info))
        .route("/api/audit", get(handlers::list_audit_logs))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// One-line description of the loaded model for the startup log
pub fn describe_model(info: &ModelInfo) -> String {
    format!(
        "model={} device={} loaded={}",
        info.model_name.as_deref().unwrap_or(EXTRACTIVE_MODEL_NAME),
        info.device,
        info.is_loaded
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("contract_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing contract API...");

    let db = AppState::connect(&args.database_url, 5).await?;
    tokio::fs::create_dir_all(&args.upload_folder).await?;

    // Model loading reads weights from disk (or the network), keep it off the runtime
    let summarizer = if args.no_model {
        info!("Model loading disabled, serving extractive summaries");
        ContractSummarizer::extractive_only()
    } else {
        let model_config = args.model_config();
        let summarizer_config = SummarizerConfig {
            emphasize_keywords: args.emphasize_keywords,
            ..SummarizerConfig::default()
        };
        tokio::task::spawn_blocking(move || {
            ContractSummarizer::load(&model_config, summarizer_config)
        })
        .await?
    };
    let summarizer = Arc::new(summarizer);

    info!("Summarizer ready: {}", describe_model(&summarizer.model_info()));

    let state = Arc::new(AppState {
        db,
        summarizer: summarizer.clone(),
        analyzer: ContractAnalyzer::new(),
        upload_dir: args.upload_folder.clone(),
        summary_timeout: args.summary_timeout(),
        max_upload_bytes: args.max_content_length,
    });

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit: {}", args.rate_limit))?,
    );

    // CORS configuration for the review frontend
    let cors = CorsLayer::new()
        .allow_origin(args.cors_origin.parse::<HeaderValue>()?)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Summary timeout: {}ms", args.summary_timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down, releasing model");
    summarizer.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
