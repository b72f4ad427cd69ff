use log::warn;
use std::env;

/// Default free-disk threshold in percent, used when `FREE_DISK_THRESHOLD`
/// is present but unparsable
pub const DEFAULT_DISK_THRESHOLD: f64 = 20.0;
/// Default free-RAM threshold in percent
pub const DEFAULT_RAM_THRESHOLD: f64 = 20.0;
/// Default CPU utilization threshold in percent
pub const DEFAULT_CPU_THRESHOLD: f64 = 90.0;
/// Default SMTP submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP transport settings
///
/// Present only when both `SMTP_HOST` and `NOTIFY_EMAIL` are configured;
/// without a host and a recipient there is nowhere to deliver alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// Whether to use a TLS relay (STARTTLS) or a plain connection
    pub tls: bool,
    /// Optional SMTP username
    pub user: Option<String>,
    /// Optional SMTP password
    pub password: Option<String>,
    /// Sender address for outgoing alerts
    pub from: String,
    /// Recipient address for alerts
    pub recipient: String,
}

/// Agent configuration, read once from the environment at startup
///
/// Every probe is gated on the *presence* of its governing variable: a probe
/// with no configured trigger does not run at all, even though built-in
/// defaults exist for the thresholds. This distinguishes "not configured"
/// from "configured with the default value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Free-disk-space threshold in percent (`FREE_DISK_THRESHOLD`)
    pub disk_threshold: Option<f64>,
    /// Free-RAM threshold in percent (`FREE_RAM_THRESHOLD`)
    pub ram_threshold: Option<f64>,
    /// CPU utilization threshold in percent (`CPU_UTIL_THRESHOLD`)
    pub cpu_threshold: Option<f64>,
    /// pm2 application names expected to be online (`PM2_APPS`)
    pub pm2_apps: Option<Vec<String>>,
    /// OS process name patterns expected to be running (`PROCESSES`)
    pub processes: Option<Vec<String>>,
    /// Absolute paths of log files to scan (`LOG_FILES`)
    pub log_files: Option<Vec<String>>,
    /// Keywords to search for in log lines (`SEARCH_WORDS`)
    pub search_words: Option<Vec<String>>,
    /// Outbound mail settings, if notification is configured
    pub mail: Option<MailConfig>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function
    ///
    /// Factored out so tests can supply a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(lookup("SMTP_HOST"));
        let recipient = non_empty(lookup("NOTIFY_EMAIL"));
        let user = non_empty(lookup("SMTP_USER"));

        let mail = match (host, recipient) {
            (Some(host), Some(recipient)) => {
                let from = non_empty(lookup("SMTP_FROM"))
                    .or_else(|| user.clone())
                    .unwrap_or_else(|| "hostwatch@localhost".to_string());
                Some(MailConfig {
                    host,
                    port: parse_port(lookup("SMTP_PORT")),
                    tls: parse_flag(lookup("SMTP_TLS"), true),
                    user,
                    password: non_empty(lookup("SMTP_PASS")),
                    from,
                    recipient,
                })
            }
            _ => None,
        };

        Self {
            disk_threshold: parse_threshold(
                "FREE_DISK_THRESHOLD",
                lookup("FREE_DISK_THRESHOLD"),
                DEFAULT_DISK_THRESHOLD,
            ),
            ram_threshold: parse_threshold(
                "FREE_RAM_THRESHOLD",
                lookup("FREE_RAM_THRESHOLD"),
                DEFAULT_RAM_THRESHOLD,
            ),
            cpu_threshold: parse_threshold(
                "CPU_UTIL_THRESHOLD",
                lookup("CPU_UTIL_THRESHOLD"),
                DEFAULT_CPU_THRESHOLD,
            ),
            pm2_apps: parse_list(lookup("PM2_APPS")),
            processes: parse_list(lookup("PROCESSES")),
            log_files: parse_list(lookup("LOG_FILES")),
            search_words: parse_list(lookup("SEARCH_WORDS")),
            mail,
        }
    }
}

/// Treat empty or whitespace-only values the same as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a threshold variable: presence enables the probe, an unparsable
/// value falls back to the built-in default
fn parse_threshold(name: &str, value: Option<String>, default: f64) -> Option<f64> {
    let raw = non_empty(value)?;
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(
                "Unparsable value '{}' for {}, using default {}",
                raw, name, default
            );
            Some(default)
        }
    }
}

/// Parse a comma-separated list, dropping empty entries
fn parse_list(value: Option<String>) -> Option<Vec<String>> {
    let raw = non_empty(value)?;
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn parse_port(value: Option<String>) -> u16 {
    match non_empty(value) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                "Unparsable SMTP_PORT '{}', using default {}",
                raw, DEFAULT_SMTP_PORT
            );
            DEFAULT_SMTP_PORT
        }),
        None => DEFAULT_SMTP_PORT,
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match non_empty(value).as_deref() {
        Some("false") | Some("0") | Some("no") => false,
        Some("true") | Some("1") | Some("yes") => true,
        Some(other) => {
            warn!("Unparsable boolean '{}' for SMTP_TLS, using {}", other, default);
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_disables_everything() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_threshold_enabled_only_when_present() {
        let config = config_from(&[("FREE_DISK_THRESHOLD", "25.5")]);
        assert_eq!(config.disk_threshold, Some(25.5));
        assert_eq!(config.ram_threshold, None);
        assert_eq!(config.cpu_threshold, None);
    }

    #[test]
    fn test_unparsable_threshold_falls_back_to_default() {
        let config = config_from(&[("CPU_UTIL_THRESHOLD", "lots")]);
        assert_eq!(config.cpu_threshold, Some(DEFAULT_CPU_THRESHOLD));
    }

    #[test]
    fn test_empty_value_is_treated_as_unset() {
        let config = config_from(&[("FREE_RAM_THRESHOLD", "  "), ("LOG_FILES", "")]);
        assert_eq!(config.ram_threshold, None);
        assert_eq!(config.log_files, None);
    }

    #[test]
    fn test_list_parsing_trims_and_drops_empty_entries() {
        let config = config_from(&[("PROCESSES", " nginx , postgres ,, redis ")]);
        assert_eq!(
            config.processes,
            Some(vec![
                "nginx".to_string(),
                "postgres".to_string(),
                "redis".to_string()
            ])
        );
    }

    #[test]
    fn test_list_of_only_commas_is_unset() {
        let config = config_from(&[("SEARCH_WORDS", ", ,")]);
        assert_eq!(config.search_words, None);
    }

    #[test]
    fn test_mail_requires_host_and_recipient() {
        let config = config_from(&[("SMTP_HOST", "smtp.example.com")]);
        assert!(config.mail.is_none());

        let config = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("NOTIFY_EMAIL", "ops@example.com"),
        ]);
        let mail = config.mail.unwrap();
        assert_eq!(mail.host, "smtp.example.com");
        assert_eq!(mail.recipient, "ops@example.com");
        assert_eq!(mail.port, DEFAULT_SMTP_PORT);
        assert!(mail.tls);
        assert_eq!(mail.from, "hostwatch@localhost");
    }

    #[test]
    fn test_mail_from_defaults_to_user() {
        let config = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("NOTIFY_EMAIL", "ops@example.com"),
            ("SMTP_USER", "monitor@example.com"),
            ("SMTP_PASS", "secret"),
            ("SMTP_PORT", "2525"),
            ("SMTP_TLS", "false"),
        ]);
        let mail = config.mail.unwrap();
        assert_eq!(mail.from, "monitor@example.com");
        assert_eq!(mail.user.as_deref(), Some("monitor@example.com"));
        assert_eq!(mail.password.as_deref(), Some("secret"));
        assert_eq!(mail.port, 2525);
        assert!(!mail.tls);
    }
}
