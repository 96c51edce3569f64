pub mod monitor;

pub use monitor::{HealthMonitor, MonitorStatus, DEFAULT_THRESHOLD};
