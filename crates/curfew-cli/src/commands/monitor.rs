use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use curfew_core::{
    supervise, Config, ConsoleNotifier, CurfewMonitor, FileLocationSource, LocationSource,
    MonitorSettings, RestartPolicy, SystemClock,
};
use tokio::sync::watch;
use tracing::{info, warn};

use super::open_preferences;

pub fn run(location_file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settings = MonitorSettings::from_config(&config)?;
    let prefs = Arc::new(open_preferences()?);
    let notifier = Arc::new(ConsoleNotifier::new(config.notifications.enabled));
    let location: Option<Arc<dyn LocationSource>> = location_file
        .or_else(|| config.location.fix_file.clone().map(PathBuf::from))
        .map(|path| Arc::new(FileLocationSource::new(path)) as Arc<dyn LocationSource>);
    let policy = RestartPolicy::from_config(&config.supervisor);
    let backoff = Duration::from_millis(config.supervisor.backoff_ms);

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ctrl-c");
                return;
            }
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        });

        supervise(policy, backoff, shutdown_rx, move |_, shutdown| {
            let mut monitor = CurfewMonitor::new(
                settings.clone(),
                Arc::new(SystemClock),
                prefs.clone(),
                notifier.clone(),
            );
            if let Some(source) = &location {
                monitor = monitor.with_location_source(source.clone());
            }
            monitor.run(shutdown)
        })
        .await
    });

    eprintln!("{}", serde_json::to_string(&report)?);
    match report.last_error {
        Some(e) if report.gave_up => Err(format!("monitor stopped: {e}").into()),
        _ => Ok(()),
    }
}
