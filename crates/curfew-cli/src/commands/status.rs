use std::sync::Arc;

use curfew_core::{Config, ConsoleNotifier, CurfewMonitor, MonitorSettings, SystemClock};

use super::open_preferences;

pub fn run(text: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settings = MonitorSettings::from_config(&config)?;
    let monitor = CurfewMonitor::new(
        settings,
        Arc::new(SystemClock),
        Arc::new(open_preferences()?),
        Arc::new(ConsoleNotifier::default()),
    );

    if text {
        let curfew = monitor.curfew_status();
        println!("{}", curfew.summary());
        println!("{}", curfew.boundary_line());
        println!("{}", monitor.sampler().status_text());
    } else {
        println!("{}", serde_json::to_string_pretty(&monitor.snapshot())?);
    }
    Ok(())
}
