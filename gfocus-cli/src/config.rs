//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use gfocus_checkout::PollPolicy;

/// Polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = PollPolicy::default();
        let seconds = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => {
                    let secs: u64 = raw
                        .trim()
                        .parse()
                        .map_err(|e| anyhow::anyhow!("{} must be whole seconds: {}", key, e))?;
                    if secs == 0 {
                        anyhow::bail!("{} must be greater than zero", key);
                    }
                    Ok(Duration::from_secs(secs))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            poll_interval: seconds("GFOCUS_POLL_INTERVAL_SECS", defaults.interval)?,
            poll_timeout: seconds("GFOCUS_POLL_TIMEOUT_SECS", defaults.timeout)?,
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.poll_interval, self.poll_timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GFOCUS_POLL_INTERVAL_SECS", "2"),
            ("GFOCUS_POLL_TIMEOUT_SECS", " 60 "),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_garbage_and_zero() {
        assert!(Config::from_lookup(lookup(&[("GFOCUS_POLL_INTERVAL_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GFOCUS_POLL_TIMEOUT_SECS", "0")])).is_err());
    }
}
