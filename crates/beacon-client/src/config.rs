use std::time::Duration;

use crate::backoff::ReconnectSchedule;
use crate::toast::DEFAULT_TOAST_DURATION;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// `ws://` or `wss://` endpoint of the notification socket.
    pub url: String,
    /// Pause before the very first connect, so a page full of clients
    /// loading at once does not hit the server in the same instant.
    pub initial_delay: Duration,
    /// Upper bound on a single handshake. Expiry counts as a failed attempt.
    pub connect_timeout: Duration,
    /// Must stay below the server's liveness sweep period.
    pub keepalive_interval: Duration,
    pub backoff: ReconnectSchedule,
    /// Timed attempts before switching to the long cooldown.
    pub max_attempts: u32,
    pub cooldown: Duration,
}

impl SupervisorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            initial_delay: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(25),
            backoff: ReconnectSchedule::default(),
            max_attempts: 10,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub supervisor: SupervisorConfig,
    pub toast_duration: Duration,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            supervisor: SupervisorConfig::new(url),
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }
}
