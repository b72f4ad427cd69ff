/// Disk, RAM and CPU resource probes
pub mod metrics;

/// Supervised application and OS process probes
pub mod services;

pub use metrics::{check_cpu, check_disk, check_ram};
pub use services::{check_pm2_apps, check_processes};
