//! Window configuration: initial size, step size, sentinel margin.
//!
//! Loaded from an optional YAML file; every field has its own default so
//! initial size and step size can be overridden independently.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// Default number of items requested by the first fetch.
pub const DEFAULT_INITIAL_SIZE: usize = 20;
/// Default growth per attention pulse.
pub const DEFAULT_STEP_SIZE: usize = 20;
/// Default bottom margin of the sentinel's attention region.
pub const DEFAULT_MARGIN_BOTTOM: u32 = 1000;
/// Default broadcast capacity for feed events.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Growth policy and sentinel settings for one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Limit used for the first fetch.
    #[serde(default = "default_initial_size")]
    pub initial_size: usize,
    /// Amount the limit grows per attention pulse.
    #[serde(default = "default_step_size")]
    pub step_size: usize,
    /// Extra space below the viewport that still counts as "in view" for the sentinel.
    #[serde(default = "default_margin_bottom")]
    pub margin_bottom: u32,
    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_initial_size() -> usize {
    DEFAULT_INITIAL_SIZE
}
fn default_step_size() -> usize {
    DEFAULT_STEP_SIZE
}
fn default_margin_bottom() -> u32 {
    DEFAULT_MARGIN_BOTTOM
}
fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            step_size: DEFAULT_STEP_SIZE,
            margin_bottom: DEFAULT_MARGIN_BOTTOM,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl WindowConfig {
    /// Override the initial limit.
    #[must_use]
    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// Override the growth step.
    #[must_use]
    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    /// Override the sentinel margin.
    #[must_use]
    pub fn with_margin_bottom(mut self, margin_bottom: u32) -> Self {
        self.margin_bottom = margin_bottom;
        self
    }

    /// Clamp sizes to at least 1.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.initial_size = self.initial_size.max(1);
        self.step_size = self.step_size.max(1);
        self.event_capacity = self.event_capacity.max(1);
        self
    }

    /// Reject zero sizes instead of clamping them.
    ///
    /// # Errors
    /// Returns [`FeedError::InvalidConfig`] naming the first zero field.
    pub fn validate(&self) -> Result<()> {
        if self.initial_size == 0 {
            return Err(FeedError::InvalidConfig(
                "initial_size must be at least 1".to_string(),
            ));
        }
        if self.step_size == 0 {
            return Err(FeedError::InvalidConfig(
                "step_size must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(FeedError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a YAML document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`FeedError::Config`] on malformed YAML, or
    /// [`FeedError::InvalidConfig`] when a size is zero.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    /// Returns [`FeedError::Io`] if the file cannot be read, otherwise the
    /// errors of [`WindowConfig::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}

/// Load config from `path`, falling back to defaults.
///
/// A missing file is not an error. Unreadable or invalid files are logged
/// and ignored.
#[must_use]
pub fn load_window_config(path: &Path) -> WindowConfig {
    if !path.exists() {
        return WindowConfig::default();
    }
    match WindowConfig::from_yaml_file(path) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to load window config; using defaults"
            );
            WindowConfig::default()
        }
    }
}
