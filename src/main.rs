use std::sync::Arc;

use env_logger::Env;

pub mod cert_probe;
pub mod config;
pub mod evaluator;
pub mod http_probe;
pub mod liveness;
pub mod monitor;
pub mod notifier;
pub mod probe;
pub mod shutdown;
#[cfg(test)]
mod test_support;

use cert_probe::{CertificateProbe, insecure_diagnostic_connector};
use config::{load_config, setup_resolver};
use http_probe::prelude::HttpProbe;
use liveness::LivenessServer;
use monitor::{RoundRunner, Scheduler};
use notifier::{LogNotifier, Notifier, TelegramNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app_config = load_config()?;
    let monitor_config = &app_config.monitor;

    let resolver = setup_resolver(&app_config.dns_hosts)?;
    let http_probe = HttpProbe::new(monitor_config.request_timeout())?;
    let cert_probe = CertificateProbe::new(
        insecure_diagnostic_connector()?,
        resolver,
        monitor_config.tls_timeout(),
    );

    let notifier: Arc<dyn Notifier> = match &app_config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(&telegram.bot_token, &telegram.chat_id)),
        None => {
            log::warn!("No Telegram credentials configured, alerts will only be logged");
            Arc::new(LogNotifier)
        }
    };
    log::info!("Delivering alerts via {}", notifier.name());

    let (trigger, cancel) = shutdown::channel();
    tokio::spawn(async move {
        if let Err(e) = shutdown::wait_for_system_signal(trigger).await {
            log::error!("Failed to listen for shutdown signals: {e}");
        }
    });

    let liveness = LivenessServer::bind(app_config.liveness_addr).await?;
    let liveness_task = tokio::spawn(liveness.serve(cancel.clone()));

    let runner = RoundRunner::new(
        Arc::new(http_probe),
        Arc::new(cert_probe),
        notifier,
        monitor_config.alert_policy(),
    )
    .with_max_concurrency(monitor_config.max_concurrent_probes)
    .with_pipeline_timeout(monitor_config.pipeline_timeout());

    let targets = probe::default_targets();
    let mut scheduler = Scheduler::new(runner, monitor_config.polling_interval());
    scheduler.run(&targets, &cancel).await;

    if let Err(e) = liveness_task.await {
        log::error!("Liveness endpoint task failed: {e}");
    }
    Ok(())
}
