#![forbid(unsafe_code)]

//! Notification gateway: accepts notify requests and answers status polls.

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use notify_core::config::{BROKER_URL_ENV, DEFAULT_BROKER_URL, DEFAULT_DATABASE, DEFAULT_NAMESPACE};
use notify_core::{BrokerConfig, SurrealStore};
use notify_gateway::{router, NotificationService};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "notify-gateway", version, about = "HTTP front-end for the notification queue")]
struct Args {
    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Broker / result store endpoint.
    #[arg(long, env = BROKER_URL_ENV, default_value = DEFAULT_BROKER_URL)]
    broker_url: String,

    #[arg(long, env = "BROKER_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    #[arg(long, env = "BROKER_DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,

    /// Root user for brokers that require sign-in. Needs --broker-pass.
    #[arg(long, env = "BROKER_USER", requires = "broker_pass")]
    broker_user: Option<String>,

    #[arg(long, env = "BROKER_PASS", hide_env_values = true, requires = "broker_user")]
    broker_pass: Option<String>,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let broker = BrokerConfig {
        url: args.broker_url,
        namespace: args.namespace,
        database: args.database,
        username: args.broker_user,
        password: args.broker_pass,
    };
    let store = SurrealStore::connect(&broker).await?;
    tracing::info!(broker = %broker.url, "connected to job store");

    let app = router(NotificationService::new(Arc::new(store)));

    tracing::info!(listen = %args.listen, "gateway starting");
    axum::serve(tokio::net::TcpListener::bind(args.listen).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
