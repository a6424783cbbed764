//! Reconnect schedule and connection state.

use std::fmt;
use std::time::Duration;

/// Capped exponential reconnect schedule.
///
/// The delay before reconnect attempt `n` (counting from zero) is
/// `min(base × 2ⁿ, max_delay)`. After `max_attempts` consecutive failures the
/// client gives up. A successful connection resets the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect.
    pub base: Duration,
    /// Upper bound on any delay.
    pub max_delay: Duration,
    /// Reconnects attempted before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect `attempt`, or `None` once attempts are
    /// exhausted.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(factor).min(self.max_delay))
    }
}

/// Consecutive-failure counter driving a [`ReconnectPolicy`].
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl Backoff {
    /// A counter with no failures recorded.
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Reconnects scheduled since the last successful connect.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forgets past failures after a connection is established.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Delay before the next reconnect, counting it as an attempt, or
    /// `None` once the policy is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_for(self.attempts)?;
        self.attempts += 1;
        Some(delay)
    }
}

/// Lifecycle of the relay socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket; possibly waiting to reconnect.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Socket open.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}
