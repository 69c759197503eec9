mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use kstate_api::{HttpApi, WriterAdapter};
use kstate_core::{AllowDenyList, CompositeFamilyGeneratorFilter, FamilyGeneratorFilter, OptInFilter};
use kstate_observe::logger_init;
use kstate_prometheus::PrometheusMetrics;
use kstate_store::Builder;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Cli, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1) Configuration, fully validated before anything is bound or watched
    let settings = Settings::load(Cli::parse())?;
    logger_init(&settings.logger).context("init logger")?;
    info!(version = VERSION, "starting kstate-agentd");

    let telemetry = Arc::new(PrometheusMetrics::new(VERSION).context("register self metrics")?);
    let builder = Builder::new()
        .with_enabled_resources(settings.resources.clone())
        .with_namespaces(settings.namespaces.clone())
        .with_namespaces_denylist(settings.namespaces_denylist.clone())
        .with_field_selector(settings.field_selector.clone())
        .with_allow_labels(settings.labels_allowlist.clone())
        .with_allow_annotations(settings.annotations_allowlist.clone())
        .with_family_filter(family_filter(&settings)?)
        .with_telemetry(telemetry.clone());
    let wiring = builder.build().context("invalid exporter configuration")?;

    // 2) Cluster connection and watchers
    let client = kube::Client::try_default()
        .await
        .context("create kubernetes client")?;
    let cancel = CancellationToken::new();
    let (writer, reflectors) = wiring.spawn(client.clone(), &cancel);
    info!(reflectors = reflectors.len(), "reflectors started");

    // 3) HTTP listeners
    let handler = Arc::new(WriterAdapter::new(writer, telemetry).with_liveness_client(client));
    let api = HttpApi::new(handler);

    tokio::spawn(shutdown_on_signal(cancel.clone()));
    tokio::try_join!(
        serve(&settings.listen, api.router(), cancel.clone()),
        serve(&settings.telemetry_listen, api.telemetry_router(), cancel.clone()),
    )?;

    // 4) Drain watchers
    cancel.cancel();
    for handle in reflectors {
        if let Err(e) = handle.await {
            warn!(error = %e, "reflector task ended abnormally");
        }
    }
    info!("shutdown complete");
    Ok(())
}

/// Metric name allow/deny list combined with the opt-in list.
fn family_filter(settings: &Settings) -> Result<Arc<dyn FamilyGeneratorFilter>> {
    let allow_deny = AllowDenyList::new(&settings.metric_allowlist, &settings.metric_denylist)
        .context("invalid metric allow/deny list")?;
    if !settings.metric_allowlist.is_empty() || !settings.metric_denylist.is_empty() {
        info!(status = %allow_deny.status(), "metric allow/deny list");
    }
    let opt_in = OptInFilter::new(&settings.metric_opt_in_list).context("invalid metric opt-in list")?;
    if opt_in.count() > 0 {
        info!(metrics = %opt_in.status(), "opt-in metrics enabled");
    }
    Ok(Arc::new(CompositeFamilyGeneratorFilter::new(vec![
        Arc::new(allow_deny),
        Arc::new(opt_in),
    ])))
}

async fn serve(addr: &str, router: Router, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(address = %addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .with_context(|| format!("serve {addr}"))
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c, shutting down"),
    }
    cancel.cancel();
}
