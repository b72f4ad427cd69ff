use log::warn;
use serde::Deserialize;
use std::process::Command;

/// One entry of the `pm2 jlist` process list
///
/// Only the fields the probe inspects; pm2 emits many more.
#[derive(Debug, Deserialize)]
struct Pm2Process {
    name: String,
    pm2_env: Pm2Env,
}

#[derive(Debug, Deserialize)]
struct Pm2Env {
    status: String,
}

/// Check that every expected pm2 application is registered and online
///
/// Runs `pm2 jlist` and parses its JSON output. An app is reported when it
/// is absent from the list or its status is anything other than `online`.
/// A subprocess or parse failure disables the probe for this run (logged).
pub fn check_pm2_apps(expected: &[String]) -> Option<String> {
    let output = match Command::new("pm2").arg("jlist").output() {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run pm2 jlist, skipping supervisor check: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "pm2 jlist exited with {}, skipping supervisor check",
            output.status
        );
        return None;
    }

    let list: Vec<Pm2Process> = match serde_json::from_slice(&output.stdout) {
        Ok(list) => list,
        Err(e) => {
            warn!("Unparsable pm2 jlist output, skipping supervisor check: {}", e);
            return None;
        }
    };

    let missing = missing_apps(&list, expected);
    if missing.is_empty() {
        None
    } else {
        Some(format!("pm2 apps not online: {}", missing.join(", ")))
    }
}

/// Expected app names that are absent or not online, in configured order
fn missing_apps(list: &[Pm2Process], expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|name| {
            !list
                .iter()
                .any(|p| &p.name == *name && p.pm2_env.status == "online")
        })
        .cloned()
        .collect()
}

/// Check that a process matching each configured pattern is running
///
/// Uses `pgrep -f` per pattern: exit code 0 means running, 1 means no match
/// (reported as not running), anything else is a lookup error for that
/// pattern only — logged and skipped, the remaining patterns are still
/// checked.
pub fn check_processes(patterns: &[String]) -> Option<String> {
    let mut not_running = Vec::new();

    for pattern in patterns {
        match Command::new("pgrep").args(["-f", pattern]).output() {
            Ok(output) => match output.status.code() {
                Some(0) => {}
                Some(1) => not_running.push(pattern.clone()),
                status => {
                    warn!(
                        "pgrep failed for pattern '{}' (exit {:?}), skipping it",
                        pattern, status
                    );
                }
            },
            Err(e) => {
                warn!("Failed to run pgrep for pattern '{}': {}", pattern, e);
            }
        }
    }

    if not_running.is_empty() {
        None
    } else {
        Some(format!("Processes not running: {}", not_running.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn process(name: &str, status: &str) -> Pm2Process {
        Pm2Process {
            name: name.to_string(),
            pm2_env: Pm2Env {
                status: status.to_string(),
            },
        }
    }

    #[test]
    fn test_all_apps_online() {
        let list = vec![process("api", "online"), process("worker", "online")];
        assert!(missing_apps(&list, &names(&["api", "worker"])).is_empty());
    }

    #[test]
    fn test_absent_app_is_missing() {
        let list = vec![process("api", "online")];
        assert_eq!(missing_apps(&list, &names(&["api", "worker"])), vec!["worker"]);
    }

    #[test]
    fn test_stopped_app_is_missing() {
        let list = vec![process("api", "stopped"), process("worker", "errored")];
        assert_eq!(
            missing_apps(&list, &names(&["api", "worker"])),
            vec!["api", "worker"]
        );
    }

    #[test]
    fn test_missing_apps_preserve_configured_order() {
        let list = vec![process("b", "online")];
        assert_eq!(missing_apps(&list, &names(&["c", "b", "a"])), vec!["c", "a"]);
    }

    #[test]
    fn test_jlist_output_parses() {
        let json = r#"[
            {"name": "api", "pm2_env": {"status": "online", "pm_uptime": 123}, "pid": 42},
            {"name": "worker", "pm2_env": {"status": "stopped"}}
        ]"#;
        let list: Vec<Pm2Process> = serde_json::from_str(json).unwrap();
        assert_eq!(missing_apps(&list, &names(&["api", "worker"])), vec!["worker"]);
    }

    #[test]
    fn test_check_processes_reports_bogus_pattern() {
        // A pattern that cannot match any real command line. If pgrep is not
        // installed the probe degrades to no issue, which is also correct.
        let result = check_processes(&names(&["hostwatch-test-no-such-process-zzz"]));
        if let Some(issue) = result {
            assert!(issue.contains("hostwatch-test-no-such-process-zzz"));
        }
    }
}
