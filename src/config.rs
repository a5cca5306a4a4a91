//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::tour::position::TooltipGeometry;

/// When the first positioning pass of a step waits for the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlePolicy {
    /// Every activation waits, whether or not it navigated.
    #[default]
    Always,
    /// Only activations that issued a navigation wait; same-page steps rely
    /// on the mutation observer to catch late-mounting targets.
    NavigatingStepsOnly,
}

impl std::str::FromStr for SettlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "navigating" | "navigating_steps_only" => Ok(Self::NavigatingStepsOnly),
            other => Err(format!("expected 'always' or 'navigating', got '{other}'")),
        }
    }
}

/// Tour engine configuration.
#[derive(Debug, Clone)]
pub struct TourConfig {
    /// Delay before the first positioning pass, letting routes render.
    pub settle_delay: Duration,
    pub settle_policy: SettlePolicy,
    pub geometry: TooltipGeometry,
    /// Class applied to the active target element.
    pub highlight_class: String,
    /// Start the tour on mount for users who have never finished it.
    pub auto_start: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            settle_policy: SettlePolicy::Always,
            geometry: TooltipGeometry::default(),
            highlight_class: "tour-highlight".to_string(),
            auto_start: true,
        }
    }
}

impl TourConfig {
    /// Defaults overridden by `TOUR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `TOUR_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse::<u64>(&lookup, "TOUR_SETTLE_DELAY_MS")? {
            config.settle_delay = Duration::from_millis(ms);
        }
        if let Some(policy) = parse::<SettlePolicy>(&lookup, "TOUR_SETTLE_POLICY")? {
            config.settle_policy = policy;
        }
        if let Some(width) = parse_length(&lookup, "TOUR_TOOLTIP_WIDTH")? {
            config.geometry.width = width;
        }
        if let Some(height) = parse_length(&lookup, "TOUR_TOOLTIP_HEIGHT")? {
            config.geometry.height = height;
        }
        if let Some(offset) = parse_length(&lookup, "TOUR_OFFSET")? {
            config.geometry.offset = offset;
        }
        if let Some(padding) = parse_length(&lookup, "TOUR_PADDING")? {
            config.geometry.padding = padding;
        }
        if let Some(class) = lookup("TOUR_HIGHLIGHT_CLASS").filter(|c| !c.trim().is_empty()) {
            config.highlight_class = class;
        }
        if let Some(auto_start) = parse::<bool>(&lookup, "TOUR_AUTO_START")? {
            config.auto_start = auto_start;
        }

        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// A tooltip dimension: finite and non-negative.
fn parse_length(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f64>, ConfigError> {
    match parse::<f64>(lookup, key)? {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a finite, non-negative length, got {value}"),
        }),
        other => Ok(other),
    }
}
