use std::time::Duration;

/// Attempt-indexed reconnect delays. Grows roughly geometrically, then holds
/// at the last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectSchedule {
    delays: Vec<Duration>,
}

impl Default for ReconnectSchedule {
    fn default() -> Self {
        Self {
            delays: [1, 2, 4, 8, 16, 30].into_iter().map(Duration::from_secs).collect(),
        }
    }
}

impl ReconnectSchedule {
    /// An empty list falls back to the default schedule.
    pub fn new(delays: Vec<Duration>) -> Self {
        if delays.is_empty() {
            return Self::default();
        }
        Self { delays }
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = attempt.saturating_sub(1) as usize;
        self.delays[index.min(self.delays.len() - 1)]
    }

    pub fn ceiling(&self) -> Duration {
        self.delays[self.delays.len() - 1]
    }
}
