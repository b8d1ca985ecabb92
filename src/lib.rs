pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod scheduler;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
pub use config::Config;
use scheduler::MaintenanceScheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    // A .env file may carry WARDENNET_* overrides; absence is fine.
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "wardennet")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    // Must run after the subscriber is initialized or the info! is lost.
    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve" | "daemon" | "-d" | "--daemon") => {
            run_daemon(config, prometheus_handle).await
        }

        Some("init") => {
            if config::Config::create_default_if_missing()? {
                println!("Created default config.toml");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }

        Some("purge-sessions") => {
            let shared = SharedState::new(config.clone()).await?;
            let scheduler = MaintenanceScheduler::new(shared.store, config.scheduler);
            let purged = scheduler.run_once().await?;
            println!("Purged {purged} expired sessions");
            Ok(())
        }

        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }

        Some(other) => {
            println!("Unknown command: {other}");
            println!();
            print_help();
            Ok(())
        }
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "WardenNet v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let api_state = api::create_app_state(shared.clone(), prometheus_handle);

    let scheduler = MaintenanceScheduler::new(shared.store.clone(), config.scheduler.clone());
    let scheduler_handle = scheduler.start().await?;

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api_state).await;
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("Web Server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    if let Some(sched) = scheduler_handle {
        let mut sched = sched;
        if let Err(e) = sched.shutdown().await {
            error!("Scheduler shutdown error: {}", e);
        }
    }
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}

fn print_help() {
    println!("WardenNet - Case Management Server");
    println!("Track cases, criminals, evidence, statutes, and crime records");
    println!();
    println!("USAGE:");
    println!("  wardennet [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("  serve, daemon     Run the API server (default)");
    println!("  init              Create default config file");
    println!("  purge-sessions    Delete expired sessions and exit");
    println!("  help              Show this help message");
}
