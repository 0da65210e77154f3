//! Monitor configuration with sensible defaults.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::MonitorError;

/// Overlay group of online brokers.
pub const ONLINE_GROUP: &str = "broker.online";

/// Online group maintained by the service manager shim, used when
/// `systemd_enable` is set.
pub const SDMON_ONLINE_GROUP: &str = "sdmon.online";

/// Overlay group of unresponsive-but-not-evicted brokers.
pub const TORPID_GROUP: &str = "broker.torpid";

/// The rank that runs the fully active monitor.
pub const LEADER_RANK: usize = 0;

/// Per-rank monitor configuration.
///
/// # Examples
///
/// ```rust
/// use resmesh_membership::monitor::MonitorConfig;
///
/// let config = MonitorConfig::builder()
///     .with_size(16)
///     .with_hostlist("node[0-15]")
///     .build()?;
/// assert_eq!(config.effective_size(), 16);
/// # Ok::<(), resmesh_membership::MonitorError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// This broker's rank in `[0, size)`
    pub rank: usize,

    /// Instance size (number of ranks)
    pub size: usize,

    /// Ranks known from inventory; the working universe is
    /// `max(size, inventory_size)`
    pub inventory_size: usize,

    /// Treat every rank as up from the start and skip stream
    /// subscriptions
    pub force_up: bool,

    /// Observe `sdmon.online` instead of `broker.online`
    pub systemd_enable: bool,

    /// Recovery mode: membership is re-materialized from the prior log,
    /// so stream subscriptions are skipped
    pub recovery_mode: bool,

    /// Host list recorded in the restart event's `nodelist`
    pub hostlist: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rank: LEADER_RANK,
            size: 1,
            inventory_size: 0,
            force_up: false,
            systemd_enable: false,
            recovery_mode: false,
            hostlist: None,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// The working universe size: `max(size, inventory_size)`.
    pub fn effective_size(&self) -> usize {
        self.size.max(self.inventory_size)
    }

    /// True when this rank runs the fully active monitor.
    pub fn is_leader(&self) -> bool {
        self.rank == LEADER_RANK
    }

    /// The online group this monitor observes.
    pub fn online_group(&self) -> &'static str {
        if self.systemd_enable {
            SDMON_ONLINE_GROUP
        } else {
            ONLINE_GROUP
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`] if any value is invalid.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.size == 0 {
            return Err(MonitorError::Config("size must be > 0".to_string()));
        }
        if self.rank >= self.effective_size() {
            return Err(MonitorError::Config(format!(
                "rank {} is outside the instance of size {}",
                self.rank,
                self.effective_size()
            )));
        }
        Ok(())
    }
}

/// Builder for [`MonitorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set this broker's rank.
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.config.rank = rank;
        self
    }

    /// Set the instance size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    /// Set the inventory rank count.
    pub fn with_inventory_size(mut self, inventory_size: usize) -> Self {
        self.config.inventory_size = inventory_size;
        self
    }

    /// Treat every rank as up from the start.
    pub fn with_force_up(mut self, force_up: bool) -> Self {
        self.config.force_up = force_up;
        self
    }

    /// Observe the service-manager online group instead of the broker's.
    pub fn with_systemd_enable(mut self, systemd_enable: bool) -> Self {
        self.config.systemd_enable = systemd_enable;
        self
    }

    /// Skip stream subscriptions for recovery mode.
    pub fn with_recovery_mode(mut self, recovery_mode: bool) -> Self {
        self.config.recovery_mode = recovery_mode;
        self
    }

    /// Record a host list in the restart event.
    pub fn with_hostlist(mut self, hostlist: impl Into<String>) -> Self {
        self.config.hostlist = Some(hostlist.into());
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`] if any value is invalid.
    pub fn build(self) -> Result<MonitorConfig, MonitorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MonitorConfig::default();
        config.validate().unwrap();
        assert!(config.is_leader());
        assert_eq!(config.effective_size(), 1);
        assert_eq!(config.online_group(), ONLINE_GROUP);
    }

    #[test]
    fn test_effective_size_takes_inventory_into_account() {
        let config = MonitorConfig::builder()
            .with_size(4)
            .with_inventory_size(6)
            .build()
            .unwrap();
        assert_eq!(config.effective_size(), 6);
    }

    #[test]
    fn test_systemd_enable_selects_sdmon_group() {
        let config = MonitorConfig::builder()
            .with_size(2)
            .with_systemd_enable(true)
            .build()
            .unwrap();
        assert_eq!(config.online_group(), SDMON_ONLINE_GROUP);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let err = MonitorConfig::builder().with_size(0).build().unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn test_rank_outside_instance_is_rejected() {
        let err = MonitorConfig::builder()
            .with_size(4)
            .with_rank(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }
}
