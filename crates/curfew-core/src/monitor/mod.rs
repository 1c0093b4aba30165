mod engine;
mod supervisor;

pub use engine::{CurfewMonitor, MonitorSettings};
pub use supervisor::{supervise, RestartPolicy, SupervisorReport};
