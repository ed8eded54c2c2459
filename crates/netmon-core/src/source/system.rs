// ── Host interface counters ──

use std::sync::{Mutex, PoisonError};

use sysinfo::Networks;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{ConnectionInfo, Counters};

use super::DataSource;

const LOOPBACK_PREFIXES: &[&str] = &["lo"];

/// Reads cumulative interface counters from the operating system.
///
/// Counters are summed over every non-loopback interface. Connection
/// listing is only available on Linux.
pub struct SystemSource {
    networks: Mutex<Networks>,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSource").finish_non_exhaustive()
    }
}

fn is_loopback(name: &str) -> bool {
    LOOPBACK_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Sum counters over non-loopback interfaces.
///
/// An empty listing means the host exposes no interface statistics at
/// all, which is an error rather than a silent zero.
fn sum_interfaces<'a>(
    interfaces: impl IntoIterator<Item = (&'a str, u64, u64)>,
) -> Result<Counters, CoreError> {
    let mut seen = 0_usize;
    let mut counters = Counters::default();
    for (name, received, transmitted) in interfaces {
        seen += 1;
        if is_loopback(name) {
            continue;
        }
        counters.bytes_in = counters.bytes_in.saturating_add(received);
        counters.bytes_out = counters.bytes_out.saturating_add(transmitted);
    }
    if seen == 0 {
        return Err(CoreError::Source {
            message: "no network interfaces reported by the system".into(),
        });
    }
    Ok(counters)
}

impl DataSource for SystemSource {
    fn sample_counters(&self) -> Result<Counters, CoreError> {
        let mut networks = self.networks.lock().unwrap_or_else(PoisonError::into_inner);
        networks.refresh();

        let counters = sum_interfaces(networks.iter().map(|(name, data)| {
            (name.as_str(), data.total_received(), data.total_transmitted())
        }))?;
        debug!(
            bytes_in = counters.bytes_in,
            bytes_out = counters.bytes_out,
            "sampled interface counters"
        );
        Ok(counters)
    }

    #[cfg(target_os = "linux")]
    fn list_connections(&self) -> Vec<ConnectionInfo> {
        const TABLES: &[(&str, &str)] = &[
            ("TCP", "/proc/net/tcp"),
            ("TCP", "/proc/net/tcp6"),
            ("UDP", "/proc/net/udp"),
            ("UDP", "/proc/net/udp6"),
        ];
        let mut out = Vec::new();
        for (protocol, path) in TABLES {
            match std::fs::read_to_string(path) {
                Ok(contents) => out.extend(super::parse_proc_net(protocol, &contents)),
                Err(e) => debug!(path, error = %e, "socket table unavailable"),
            }
        }
        out
    }

    #[cfg(not(target_os = "linux"))]
    fn list_connections(&self) -> Vec<ConnectionInfo> {
        Vec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sums_all_but_loopback() {
        let counters = sum_interfaces([
            ("lo", 9_000, 9_000),
            ("eth0", 1_000, 200),
            ("wlan0", 24, 6),
        ])
        .unwrap();
        assert_eq!(counters, Counters::new(1_024, 206));
    }

    #[test]
    fn loopback_only_host_reads_zero() {
        assert_eq!(sum_interfaces([("lo", 5, 5)]).unwrap(), Counters::default());
    }

    #[test]
    fn no_interfaces_is_a_source_error() {
        let err = sum_interfaces(Vec::<(&str, u64, u64)>::new()).unwrap_err();
        assert!(matches!(err, CoreError::Source { .. }), "{err}");
    }

    #[test]
    fn loopback_names() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("wlan0"));
    }
}
