use crate::error::{Error, HubErrorKind};
use std::time::Duration;

/// Tuning knobs for the hub and every connection it owns.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity K of each connection's outbound queue. A broadcast that finds the
    /// queue full disconnects that connection.
    pub outbound_queue_capacity: usize,

    /// How often the writer pump sends a ping frame to the client.
    pub ping_interval: Duration,

    /// Read deadline. A client that sends nothing (not even a pong) for this long
    /// is treated as disconnected.
    pub keepalive_timeout: Duration,

    /// Deadline for writing a single frame.
    pub write_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 32,
            ping_interval: Duration::from_secs(30),
            keepalive_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
        }
    }
}

impl HubConfig {
    pub fn with_outbound_queue_capacity(mut self, capacity: usize) -> Self {
        // tokio's bounded channel panics on a zero capacity
        self.outbound_queue_capacity = capacity.max(1);
        self
    }

    pub fn with_ping_interval(mut self, ping_interval: Duration) -> Self {
        self.ping_interval = ping_interval;
        self
    }

    pub fn with_keepalive_timeout(mut self, keepalive_timeout: Duration) -> Self {
        self.keepalive_timeout = keepalive_timeout;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Checks the timing settings a connection's pumps depend on. The keepalive
    /// deadline has to outlast the ping interval, or an idle but healthy client
    /// is dropped before it ever gets the chance to answer a ping.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ping_interval.is_zero() {
            return Err(Error::invalid_config("ping_interval must be greater than zero"));
        }
        if self.keepalive_timeout.is_zero() {
            return Err(Error::invalid_config(
                "keepalive_timeout must be greater than zero",
            ));
        }
        if self.write_timeout.is_zero() {
            return Err(Error::invalid_config("write_timeout must be greater than zero"));
        }
        if self.keepalive_timeout <= self.ping_interval {
            return Err(Error::invalid_config(format!(
                "keepalive_timeout ({:?}) must be longer than ping_interval ({:?})",
                self.keepalive_timeout, self.ping_interval
            )));
        }
        Ok(())
    }
}
