use std::sync::Arc;

use curfew_core::{Config, ConsoleNotifier, CurfewMonitor, MonitorSettings, SystemClock};

use super::open_preferences;

pub fn run(minutes: u32) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settings = MonitorSettings::from_config(&config)?;
    let notifier = ConsoleNotifier::new(config.notifications.enabled);
    let mut monitor = CurfewMonitor::new(
        settings,
        Arc::new(SystemClock),
        Arc::new(open_preferences()?),
        Arc::new(notifier),
    );

    let event = monitor.emulate(minutes)?;
    println!("{}", serde_json::to_string(&event)?);
    Ok(())
}
