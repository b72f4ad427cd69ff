use log::warn;
use std::fs;
use std::path::Path;
use sysinfo::{Disks, System};

/// Check free disk space on the root filesystem
///
/// Reports an issue iff the free percentage is strictly below the threshold.
/// Measurement failure (no root mount in the disk list, or a zero-sized
/// one) is logged and yields `None`; a transient OS query problem must
/// never crash the agent, and no other filesystem is substituted.
pub fn check_disk(threshold: f64) -> Option<String> {
    let disks = Disks::new_with_refreshed_list();
    let free_pct = root_free_pct(
        disks
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space())),
    );

    match free_pct {
        Some(free_pct) => disk_issue(free_pct, threshold),
        None => {
            warn!("No root filesystem in disk list, skipping disk check");
            None
        }
    }
}

/// Free-space percentage of the filesystem mounted at `/`
///
/// `None` when no disk is mounted at the root or its reported size is zero.
fn root_free_pct<'a, I>(disks: I) -> Option<f64>
where
    I: IntoIterator<Item = (&'a Path, u64, u64)>,
{
    disks
        .into_iter()
        .find(|(mount, total, _)| *mount == Path::new("/") && *total > 0)
        .map(|(_, total, available)| available as f64 / total as f64 * 100.0)
}

/// Check the free/total memory ratio
pub fn check_ram(threshold: f64) -> Option<String> {
    let mut system = System::new();
    system.refresh_memory();

    if system.total_memory() == 0 {
        warn!("Failed to measure memory, skipping RAM check");
        return None;
    }

    let free_pct = system.free_memory() as f64 / system.total_memory() as f64 * 100.0;
    ram_issue(free_pct, threshold)
}

/// Check average per-core CPU utilization
///
/// Reads `/proc/stat` once and computes `100 * (1 - idle/total)` per core
/// over the cumulative counters, averaged across cores. A single snapshot
/// measures utilization since boot rather than instantaneous load; this is
/// a deliberate carry-over from the original check's semantics.
pub fn check_cpu(threshold: f64) -> Option<String> {
    let contents = match fs::read_to_string("/proc/stat") {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to read /proc/stat, skipping CPU check: {}", e);
            return None;
        }
    };

    match cpu_utilization_from_stat(&contents) {
        Some(avg_util) => cpu_issue(avg_util, threshold),
        None => {
            warn!("No per-core counters in /proc/stat, skipping CPU check");
            None
        }
    }
}

fn disk_issue(free_pct: f64, threshold: f64) -> Option<String> {
    if free_pct < threshold {
        Some(format!(
            "Low disk space: {:.1}% free (threshold {}%)",
            free_pct, threshold
        ))
    } else {
        None
    }
}

fn ram_issue(free_pct: f64, threshold: f64) -> Option<String> {
    if free_pct < threshold {
        Some(format!(
            "Low free RAM: {:.1}% free (threshold {}%)",
            free_pct, threshold
        ))
    } else {
        None
    }
}

fn cpu_issue(avg_util: f64, threshold: f64) -> Option<String> {
    if avg_util > threshold {
        Some(format!(
            "High CPU utilization: {:.1}% (threshold {}%)",
            avg_util, threshold
        ))
    } else {
        None
    }
}

/// Average per-core utilization from `/proc/stat` contents
///
/// Parses the `cpu0`, `cpu1`, ... lines (skipping the aggregate `cpu`
/// line); idle is the fourth field, total the sum of all fields.
fn cpu_utilization_from_stat(contents: &str) -> Option<f64> {
    let mut utils = Vec::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let label = match fields.next() {
            Some(label) => label,
            None => continue,
        };
        if !label.starts_with("cpu") || label == "cpu" {
            continue;
        }

        let ticks: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
        if ticks.len() < 4 {
            continue;
        }
        let total: u64 = ticks.iter().sum();
        if total == 0 {
            continue;
        }
        let idle = ticks[3];
        utils.push(100.0 * (1.0 - idle as f64 / total as f64));
    }

    if utils.is_empty() {
        None
    } else {
        Some(utils.iter().sum::<f64>() / utils.len() as f64)
    }
}
