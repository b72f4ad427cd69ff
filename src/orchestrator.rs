use crate::config::Config;
use crate::notifier::Notifier;
use crate::probes;
use crate::scanner;
use crate::state::OffsetStore;
use log::{error, info, warn};

/// Fixed subject line for every alert email
pub const ALERT_SUBJECT: &str = "System Monitoring Alert";

/// Runs every enabled check and turns the findings into one notification
///
/// A probe runs iff its governing configuration value was supplied; the run
/// order is fixed (disk, RAM, CPU, pm2 apps, processes, logs) so successive
/// runs produce comparable logs. Every probe failure degrades to "no issue"
/// inside the probe itself, so the orchestrator only ever sees clean
/// `Option<String>` results.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all enabled probes and collect their issue descriptions
    ///
    /// The log scan commits updated offsets to the store as a side effect,
    /// independent of what the other probes find.
    pub fn run_checks(&self, store: &mut OffsetStore) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(threshold) = self.config.disk_threshold {
            issues.extend(probes::check_disk(threshold));
        }
        if let Some(threshold) = self.config.ram_threshold {
            issues.extend(probes::check_ram(threshold));
        }
        if let Some(threshold) = self.config.cpu_threshold {
            issues.extend(probes::check_cpu(threshold));
        }
        if let Some(apps) = &self.config.pm2_apps {
            issues.extend(probes::check_pm2_apps(apps));
        }
        if let Some(patterns) = &self.config.processes {
            issues.extend(probes::check_processes(patterns));
        }
        if let Some(files) = &self.config.log_files {
            let keywords = self.config.search_words.clone().unwrap_or_default();
            issues.extend(scanner::scan_logs(files, &keywords, store));
        }

        issues
    }

    /// Run one full check cycle: probe, aggregate, notify
    pub fn run(&self, store: &mut OffsetStore) {
        let issues = self.run_checks(store);

        if issues.is_empty() {
            info!("All checks passed");
            return;
        }

        warn!("{} issue(s) detected", issues.len());
        let body = issues.join("\n");

        match &self.config.mail {
            Some(mail) => {
                let notifier = Notifier::new(mail.clone());
                if let Err(e) = notifier.send(ALERT_SUBJECT, &body) {
                    error!("Failed to send alert email: {}", e);
                }
            }
            None => {
                warn!("No mail transport configured; issues:\n{}", body);
            }
        }
    }
}
