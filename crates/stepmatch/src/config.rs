//! Driver configuration

use crate::driver::Driver;

/// Default number of snapshots kept for undo
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Options for constructing a [`Driver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Maximum number of history snapshots (0 = history disabled)
    pub history_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Builder for drivers with custom configuration
///
/// Created via [`Driver::builder`].
///
/// # Examples
///
/// ```
/// use stepmatch::Driver;
///
/// // Keep the last 10 states for undo
/// let driver = Driver::builder().history_capacity(10).build();
/// assert_eq!(driver.history().capacity(), 10);
///
/// // No undo at all (cheapest stepping)
/// let driver = Driver::builder().no_history().build();
/// assert!(!driver.history().is_enabled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DriverBuilder {
    config: DriverConfig,
}

impl DriverBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the history capacity
    ///
    /// Default: 100 snapshots
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Disable history entirely
    pub fn no_history(mut self) -> Self {
        self.config.history_capacity = 0;
        self
    }

    /// The configuration built so far
    pub fn config(&self) -> DriverConfig {
        self.config
    }

    /// Create the driver
    pub fn build(self) -> Driver {
        Driver::with_config(self.config)
    }
}
