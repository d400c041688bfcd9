use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Server settings, read from `BEACON_*` environment variables (a `.env`
/// file is loaded first by the binary).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Period of the liveness sweep. Clients must keepalive faster than this.
    pub sweep_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("BEACON_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("BEACON_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("BEACON_PORT must be a port number")?;
        let db_path = lookup("BEACON_DB_PATH").unwrap_or_else(|| "beacon.db".into());
        let sweep_secs: u64 = lookup("BEACON_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("BEACON_SWEEP_INTERVAL_SECS must be a whole number of seconds")?;

        if sweep_secs == 0 {
            anyhow::bail!("BEACON_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            host,
            port,
            db_path: PathBuf::from(db_path),
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides_are_read() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BEACON_HOST", "127.0.0.1"),
            ("BEACON_PORT", "8088"),
            ("BEACON_DB_PATH", "/tmp/activity.db"),
            ("BEACON_SWEEP_INTERVAL_SECS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8088");
        assert_eq!(config.db_path, PathBuf::from("/tmp/activity.db"));
        assert_eq!(config.sweep_interval, Duration::from_secs(10));
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(ServerConfig::from_lookup(lookup(&[("BEACON_PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("BEACON_SWEEP_INTERVAL_SECS", "0")])).is_err());
    }
}
