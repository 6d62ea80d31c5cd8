//! Configuration type definitions
//!
//! These types represent the monitor configuration. Defaults reproduce the
//! store-based monitor: 1 s sampling, 500 ms rendering, 100 ms lock bounds.

use embassy_time::Duration;

use crate::link::MEASUREMENT_QUEUE_DEPTH;
use crate::measurement::DividerConfig;
use crate::scheduler::{Priority, SendPolicy, TaskSpec, MIN_STACK_BYTES};
use crate::screen::{BarConfig, LayoutKind, Screen, ScreenLayout};
use crate::tasks::RenderTiming;
use crate::traits::Rotation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Depth of the measurement queue (fixed at compile time)
pub const QUEUE_DEPTH: usize = MEASUREMENT_QUEUE_DEPTH;

/// Scheduling parameters of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfig {
    pub priority: Priority,
    /// Execution budget (bytes)
    pub stack_bytes: usize,
}

impl TaskConfig {
    pub fn spec(&self, name: &'static str) -> TaskSpec {
        TaskSpec::new(name, self.priority, self.stack_bytes)
    }
}

/// Acquisition task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcquisitionConfig {
    /// Delay between samples (ms)
    pub period_ms: u32,
    /// ADC input the divider is wired to
    pub adc_channel: u8,
    pub task: TaskConfig,
}

impl AcquisitionConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms as u64)
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            adc_channel: 0,
            task: TaskConfig {
                priority: Priority::High,
                stack_bytes: 2048,
            },
        }
    }
}

/// Presentation task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresentationConfig {
    /// Delay between frames when rendering periodically (ms)
    pub period_ms: u32,
    /// Bound on the display lock wait when rendering periodically (ms)
    pub display_lock_ms: u32,
    pub task: TaskConfig,
}

impl PresentationConfig {
    pub fn timing(&self) -> RenderTiming {
        RenderTiming {
            period: Duration::from_millis(self.period_ms as u64),
            display_lock_bound: Duration::from_millis(self.display_lock_ms as u64),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            period_ms: 500,
            display_lock_ms: 100,
            task: TaskConfig {
                priority: Priority::Normal,
                stack_bytes: 4096,
            },
        }
    }
}

/// Which link connects the two tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkKind {
    /// Mutex-guarded single slot, both sides periodic
    #[default]
    Store,
    /// Bounded FIFO, consumer paced by arrival
    Channel,
}

/// Serializable form of [`SendPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SendPolicyKind {
    Block,
    DropNewest,
    #[default]
    DropOldest,
}

/// Link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    pub kind: LinkKind,
    /// Store lock bound (ms)
    pub lock_bound_ms: u32,
    /// What the producer does when the queue is full
    pub send_policy: SendPolicyKind,
    /// How long the bounded send policies wait for space (ms)
    pub send_wait_ms: u32,
}

impl LinkConfig {
    pub fn lock_bound(&self) -> Duration {
        Duration::from_millis(self.lock_bound_ms as u64)
    }

    pub fn send_policy(&self) -> SendPolicy {
        let wait = Duration::from_millis(self.send_wait_ms as u64);
        match self.send_policy {
            SendPolicyKind::Block => SendPolicy::Block,
            SendPolicyKind::DropNewest => SendPolicy::DropNewest { wait },
            SendPolicyKind::DropOldest => SendPolicy::DropOldest { wait },
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            kind: LinkKind::Store,
            lock_bound_ms: 100,
            send_policy: SendPolicyKind::DropOldest,
            send_wait_ms: 100,
        }
    }
}

/// Screen selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub layout: LayoutKind,
    /// Overrides the layout's own rotation
    pub rotation: Option<Rotation>,
}

impl DisplayConfig {
    pub fn rotation(&self) -> Rotation {
        self.rotation
            .unwrap_or_else(|| self.layout.default_rotation())
    }
}

/// Start-up settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootConfig {
    /// Wait before touching peripherals (ms)
    pub settle_ms: u32,
    /// Total execution budget shared by all tasks (bytes)
    pub stack_budget: usize,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            stack_budget: 16 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Supply voltage must be positive
    InvalidSupplyVoltage,
    /// Full-scale code must be non-zero
    InvalidFullScale,
    /// Fixed resistor must be positive
    InvalidFixedResistor,
    /// A task period is zero
    ZeroPeriod,
    /// A lock bound is zero
    ZeroLockBound,
    /// Bar range is empty or reversed
    InvalidBarRange,
    /// Ladder thresholds are not strictly descending
    UnorderedLadder,
    /// A task budget is below the minimum
    StackTooSmall,
    /// Task budgets exceed the total budget
    StackBudgetExceeded,
}

/// Complete monitor configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    pub divider: DividerConfig,
    pub acquisition: AcquisitionConfig,
    pub presentation: PresentationConfig,
    pub link: LinkConfig,
    pub display: DisplayConfig,
    pub bar: BarConfig,
    pub boot: BootConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::store_variant()
    }
}

impl MonitorConfig {
    /// Single-slot store, 1 s sampling, voltage screen
    pub fn store_variant() -> Self {
        let divider = DividerConfig::default();
        Self {
            bar: BarConfig::voltage_level(divider.supply_voltage),
            divider,
            acquisition: AcquisitionConfig::default(),
            presentation: PresentationConfig::default(),
            link: LinkConfig::default(),
            display: DisplayConfig {
                layout: LayoutKind::Voltage,
                rotation: None,
            },
            boot: BootConfig::default(),
        }
    }

    /// Queue of ten, 100 ms sampling, light-level screen
    pub fn queue_variant() -> Self {
        Self {
            acquisition: AcquisitionConfig {
                period_ms: 100,
                ..AcquisitionConfig::default()
            },
            link: LinkConfig {
                kind: LinkKind::Channel,
                ..LinkConfig::default()
            },
            display: DisplayConfig {
                layout: LayoutKind::Light,
                rotation: None,
            },
            bar: BarConfig::light_level(),
            boot: BootConfig {
                settle_ms: 2000,
                ..BootConfig::default()
            },
            ..Self::store_variant()
        }
    }

    /// Bar that goes with a layout when none is configured
    pub fn default_bar(layout: LayoutKind, divider: &DividerConfig) -> BarConfig {
        match layout {
            LayoutKind::Light => BarConfig::light_level(),
            LayoutKind::Voltage => BarConfig::voltage_level(divider.supply_voltage),
        }
    }

    pub fn screen(&self) -> Screen {
        Screen::new(ScreenLayout::for_kind(self.display.layout), self.bar.clone())
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Written so NaN fails too
        if !(self.divider.supply_voltage > 0.0) {
            return Err(ConfigError::InvalidSupplyVoltage);
        }
        if self.divider.full_scale == 0 {
            return Err(ConfigError::InvalidFullScale);
        }
        if !(self.divider.fixed_resistor_ohms > 0.0) {
            return Err(ConfigError::InvalidFixedResistor);
        }
        if self.acquisition.period_ms == 0 || self.presentation.period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.link.lock_bound_ms == 0 || self.presentation.display_lock_ms == 0 {
            return Err(ConfigError::ZeroLockBound);
        }
        if !(self.bar.lo < self.bar.hi) {
            return Err(ConfigError::InvalidBarRange);
        }
        if !self.bar.ladder.is_ordered() {
            return Err(ConfigError::UnorderedLadder);
        }

        let tasks = [self.acquisition.task, self.presentation.task];
        if tasks.iter().any(|t| t.stack_bytes < MIN_STACK_BYTES) {
            return Err(ConfigError::StackTooSmall);
        }
        let committed = tasks
            .iter()
            .try_fold(0usize, |sum, t| sum.checked_add(t.stack_bytes))
            .ok_or(ConfigError::StackBudgetExceeded)?;
        if committed > self.boot.stack_budget {
            return Err(ConfigError::StackBudgetExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ColorLadder;
    use crate::traits::Color;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(MonitorConfig::default().validate(), Ok(()));
        assert_eq!(MonitorConfig::queue_variant().validate(), Ok(()));
    }

    #[test]
    fn test_store_variant_defaults() {
        let config = MonitorConfig::store_variant();
        assert_eq!(config.acquisition.period(), Duration::from_millis(1000));
        assert_eq!(config.presentation.timing().period, Duration::from_millis(500));
        assert_eq!(config.link.lock_bound(), Duration::from_millis(100));
        assert_eq!(config.display.rotation(), Rotation::Landscape);
        assert_eq!(config.screen().layout().kind, LayoutKind::Voltage);
    }

    #[test]
    fn test_queue_variant_defaults() {
        let config = MonitorConfig::queue_variant();
        assert_eq!(config.link.kind, LinkKind::Channel);
        assert_eq!(config.acquisition.period_ms, 100);
        assert_eq!(config.display.rotation(), Rotation::LandscapeFlipped);
        assert_eq!(QUEUE_DEPTH, 10);
        assert_eq!(
            config.link.send_policy(),
            SendPolicy::DropOldest {
                wait: Duration::from_millis(100)
            }
        );
    }

    #[test]
    fn test_rotation_override() {
        let display = DisplayConfig {
            layout: LayoutKind::Light,
            rotation: Some(Rotation::Portrait),
        };
        assert_eq!(display.rotation(), Rotation::Portrait);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = MonitorConfig::default();
        config.divider.supply_voltage = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSupplyVoltage));

        let mut config = MonitorConfig::default();
        config.divider.full_scale = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFullScale));

        let mut config = MonitorConfig::default();
        config.presentation.period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod));

        let mut config = MonitorConfig::default();
        config.link.lock_bound_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLockBound));

        let mut config = MonitorConfig::default();
        config.bar.lo = config.bar.hi;
        assert_eq!(config.validate(), Err(ConfigError::InvalidBarRange));

        let mut config = MonitorConfig::default();
        config.bar.ladder = ColorLadder::traffic_light();
        config.bar.ladder.bands.reverse();
        assert_eq!(config.validate(), Err(ConfigError::UnorderedLadder));

        let mut config = MonitorConfig::default();
        config.boot.stack_budget = 4096;
        assert_eq!(config.validate(), Err(ConfigError::StackBudgetExceeded));

        let mut config = MonitorConfig::default();
        config.acquisition.task.stack_bytes = 16;
        assert_eq!(config.validate(), Err(ConfigError::StackTooSmall));

        let mut config = MonitorConfig::default();
        config.acquisition.task.stack_bytes = usize::MAX;
        config.boot.stack_budget = usize::MAX;
        assert_eq!(config.validate(), Err(ConfigError::StackBudgetExceeded));
    }

    #[test]
    fn test_default_bar_follows_layout() {
        let divider = DividerConfig::default();
        let light = MonitorConfig::default_bar(LayoutKind::Light, &divider);
        assert!(light.inverted);
        assert_eq!(light.ladder.color_for(80), Color::GREEN);
        let voltage = MonitorConfig::default_bar(LayoutKind::Voltage, &divider);
        assert_eq!(voltage.hi, 3.3);
    }
}
