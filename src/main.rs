#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod calendar;
mod config;
mod daily_url;
mod error;
mod fetch;
mod notify;
mod parse;
mod pipeline;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{on, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    config::Config,
    fetch::{make_client, Fetcher},
    notify::Webhook,
    pipeline::Pipeline,
};

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug)]
struct App {
    config: Config,
    client: reqwest::Client,
    webhook: Webhook,
}

async fn lunch(State(app): State<Arc<App>>) -> (StatusCode, String) {
    log::info!("Run lunch pipeline");
    let date = app.config.calendar.today();
    let fetcher = Fetcher::new(app.client.clone(), app.config.site_root.host());
    let pipeline = Pipeline::new(
        &app.config.site_root,
        &app.config.template,
        fetcher,
        &app.webhook,
    );
    match pipeline.run(&date).await {
        Ok(outcome) => {
            log::info!("Run finished: {outcome}");
            (StatusCode::OK, outcome.response_text())
        }
        Err(e) => {
            log::error!("Run failed: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    log::info!(
        "environment: {:?}, site: {}, utc offset: {}",
        config.environment,
        config.site_root.url(),
        config.calendar.offset()
    );
    let webhook = Webhook::new(config.webhook_url.clone(), config.webhook_proxy.as_ref())?
        .with_overrides(
            config.webhook_username.clone(),
            config.webhook_channel.clone(),
        );
    let addr = config.addr;
    let app = Arc::new(App {
        config,
        client: make_client(),
        webhook,
    });

    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let router = Router::new()
        .route("/lunch", on(MethodFilter::GET.or(MethodFilter::POST), lunch))
        .with_state(app)
        .layer(compression_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to listen on {addr}: {e}"));
    log::info!("listening on http://{addr}/lunch");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
