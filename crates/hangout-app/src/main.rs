use std::sync::Arc;

use hangout_app::app::api::routes;
use hangout_app::bootstrap::{build_context, build_notifier, build_places, build_store, http_client};
use hangout_app::config::ConfigHandler;
use hangout_app::runtime_handler::RuntimeHandler;
use hangout_core::config::load_config;
use hangout_service::recovery::recover;
use hangout_service::runtime::CoordinatorRuntime;
use salvo::conn::TcpListener;
use salvo::logging::Logger;
use salvo::{Listener, Router};
use tracing_futures::Instrument;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(filter_layer).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true),
    );
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    tracing::info!("Starting hangout scheduler");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = build_store(&config).await?;
    let client = http_client()?;
    let ctx = build_context(
        &config,
        store,
        build_notifier(&config, client.clone()),
        build_places(&config, client),
    );
    tracing::info!(holder_id = %ctx.holder_id, wait_policy = ?ctx.wait_policy, "Coordinator runtime ready");
    let runtime = CoordinatorRuntime::new(ctx);

    let report = recover(&runtime).await?;
    tracing::info!(
        started = report.started,
        claimed_elsewhere = report.claimed_elsewhere,
        "Startup recovery finished"
    );

    let rescan = config.scheduler.rescan_interval().map(|every| {
        let runtime = runtime.clone();
        tokio::spawn(
            async move {
                let mut ticker =
                    tokio::time::interval_at(tokio::time::Instant::now() + every, every);
                loop {
                    ticker.tick().await;
                    if let Err(error) = recover(&runtime).await {
                        tracing::warn!(%error, "Periodic recovery scan failed");
                    }
                    let active = runtime.active_count().await;
                    let pending_retries = runtime.pending_retries().await;
                    tracing::debug!(
                        active,
                        pending_retries,
                        "Coordinator runtime status"
                    );
                }
            }
            .instrument(tracing::info_span!("rescan")),
        )
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(Logger::new())
        .hoop(RuntimeHandler {
            runtime: runtime.clone(),
        })
        .hoop(ConfigHandler {
            settings: Arc::new(config.clone()),
        })
        .push(routes());

    let server = salvo::Server::new(acceptor);
    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested");
        handle.stop_graceful(None);
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(router).await;

    if let Some(rescan) = rescan {
        rescan.abort();
    }
    tracing::info!(
        active = runtime.active_count().await,
        "Releasing coordinator leases"
    );
    runtime.shutdown().await;
    tracing::info!("Stopped");

    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM. A listener that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
