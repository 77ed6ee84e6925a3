#![forbid(unsafe_code)]

//! Notification worker binary.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use notify_core::config::{BROKER_URL_ENV, DEFAULT_BROKER_URL, DEFAULT_DATABASE, DEFAULT_NAMESPACE};
use notify_core::{BrokerConfig, SurrealStore};
use notify_worker::{AppendLog, NotificationTask, Worker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "notify-worker", version, about = "Consumes notification jobs")]
struct Args {
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

    /// Worker identifier. If omitted, a random UUID is used.
    #[arg(long)]
    worker_id: Option<String>,

    /// Simulated send latency per job, in seconds.
    #[arg(long, default_value_t = 10)]
    delay_secs: u64,

    /// Poll interval in milliseconds when the queue is empty.
    #[arg(long, default_value_t = 1_000)]
    poll_ms: u64,

    /// Append-only record of sent notifications.
    #[arg(long, default_value = "notification_log.txt")]
    log_file: PathBuf,

    /// Process at most one job, then exit.
    #[arg(long)]
    once: bool,

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

    let worker_id = args
        .worker_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let broker = BrokerConfig {
        url: args.broker_url,
        namespace: args.namespace,
        database: args.database,
        username: args.broker_user,
        password: args.broker_pass,
    };
    let store = SurrealStore::connect(&broker).await?;
    tracing::info!(broker = %broker.url, worker_id = %worker_id, "connected to job store");

    let handler = NotificationTask::new(
        Duration::from_secs(args.delay_secs),
        AppendLog::new(&args.log_file),
    );
    let worker = Worker::new(
        worker_id,
        Arc::new(store),
        Arc::new(handler),
        Duration::from_millis(args.poll_ms),
    );

    if args.once {
        match worker.run_once().await? {
            Some(job) => tracing::info!(job_id = %job.id, state = %job.state, "processed one job"),
            None => tracing::info!("queue empty"),
        }
        return Ok(());
    }

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested; finishing current job");
        let _ = stop_tx.send(true);
    });

    worker.run(stop_rx).await;
    Ok(())
}
