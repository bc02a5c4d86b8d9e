use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use headcount::config::Args;
use headcount::fetch::ImageFetcher;
use headcount::logging::init_logging;
use headcount::pipeline::PersonCounter;
use headcount::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let model_details = args.model_config()?;
    let addr = args.socket_addr()?;

    // session creation and the dry run are blocking
    let detector = tokio::task::spawn_blocking(move || headcount::init_detector(&model_details))
        .await
        .context("Detector initialisation task panicked")??;

    let fetcher = ImageFetcher::new(args.fetch_timeout(), args.max_image_bytes);
    let counter = PersonCounter::new(Arc::new(detector), fetcher);
    let app = router(AppState::new(counter).with_strict_status(args.strict_status));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, strict_status = args.strict_status, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
