mod admin;
mod config;
mod engine;
mod error;
mod handlers;
mod models;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{Router, http};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    engine::Engine,
    state::AppState,
    stores::{Keyspace, KvStore, MemoryKvStore, RedisKvStore},
};

#[derive(Parser)]
#[command(name = "linkrank-api")]
#[command(about = "Link voting and ranking API server")]
struct Args {
    /// Log every key in the store and exit
    #[arg(long, conflicts_with_all = ["flush", "reconcile"])]
    dump: bool,

    /// Delete every key in the store and exit
    #[arg(long, conflicts_with = "reconcile")]
    flush: bool,

    /// Repair drift left by partially committed writes and exit
    #[arg(long)]
    reconcile: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = envy::prefixed("LINKRANK_").from_env::<Config>()?;

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let (store, keyspace): (Arc<dyn KvStore>, Arc<dyn Keyspace>) = match &config.redis_url {
        Some(url) => {
            let redis = Arc::new(RedisKvStore::new(redis::Client::open(url.as_str())?));
            (redis.clone(), redis)
        }
        None => {
            tracing::warn!("LINKRANK_REDIS_URL not set, using in-memory store");
            let memory = Arc::new(MemoryKvStore::new());
            (memory.clone(), memory)
        }
    };

    let engine = Engine::new(store.clone());

    // One-shot administrative runs
    if args.dump {
        admin::dump(keyspace.as_ref(), store.as_ref()).await?;
        return Ok(());
    }
    if args.flush {
        admin::flush(keyspace.as_ref()).await?;
        return Ok(());
    }
    if args.reconcile {
        let report = engine.reconcile().await?;
        tracing::info!(?report, "reconcile complete");
        return Ok(());
    }

    let state = AppState {
        config: config.clone(),
        store,
        engine,
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .nest("/health", handlers::health::router())
        .nest("/articles", handlers::articles::router())
        .nest("/groups", handlers::groups::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // 64KB limit

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flags_are_exclusive() {
        assert!(Args::try_parse_from(["linkrank-api", "--dump", "--flush"]).is_err());
        assert!(Args::try_parse_from(["linkrank-api", "--flush", "--reconcile"]).is_err());
    }

    #[test]
    fn no_flags_serves() {
        let args = Args::try_parse_from(["linkrank-api"]).unwrap();

        assert!(!args.dump && !args.flush && !args.reconcile);
    }
}
