//! # Example: compose_logs
//!
//! Streams the logs of every service of a docker-compose project and reacts to
//! services being added and removed at runtime.
//!
//! Demonstrates how to:
//! - Build a `LogManager` with the built-in `LogWriter` subscriber.
//! - Drive reconciliation by mutating a `StateStore` and sending change notifications.
//! - Stop on Ctrl-C (handled by `LogManager::run`).
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► StateStore { web }
//!   ├─► spawn LogManager::run(changes)
//!   │     └─► consume_logs(web) ─► docker-compose logs --follow web
//!   └─► controller task
//!         ├─► upsert(db)  + notify ─► consume_logs(db)
//!         └─► remove(web) + notify ─► web cancelled
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example compose_logs -- path/to/docker-compose.yml
//! ```

use std::{sync::Arc, time::Duration};

use logvisor::{ComposeCli, Config, LogManager, LogWriter, Snapshot, Source, StateStore, Subscribe};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let compose_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "docker-compose.yml".to_string());

    // 1) Desired state: start with a single service.
    let store = StateStore::new(Snapshot::enabled([Source::compose("web", &compose_file)]));

    // 2) Manager with lifecycle events rendered through tracing.
    let mut cfg = Config::default();
    cfg.grace = Duration::from_secs(3);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let manager = LogManager::builder(cfg)
        .with_subscribers(subs)
        .build(store.clone(), Arc::new(ComposeCli::new()));

    // 3) Controller: change the desired state over time.
    let (changes, rx) = mpsc::channel(8);
    let token = CancellationToken::new();
    let controller_token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        store.upsert(Source::compose("db", &compose_file)).await;
        let _ = changes.send(()).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        store.remove("web").await;
        let _ = changes.send(()).await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        controller_token.cancel();
    });

    // 4) Run until the controller is done or Ctrl-C.
    manager.run(rx, token).await?;
    Ok(())
}
