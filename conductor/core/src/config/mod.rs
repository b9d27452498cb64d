//! TOML Configuration File Support
//!
//! Centralized configuration loading for the Conductor, supporting a TOML
//! configuration file at `~/.config/holo-conductor/conductor.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`HOLO_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! loader_hold_ms = 3000
//! loader_fade_ms = 1000
//! section_reveal_ms = 300
//! transmission_latency_ms = 2000
//!
//! [effects]
//! notification_visible_ms = 4000
//! glitch_flash_ms = 300
//!
//! [ambient]
//! enabled = true
//! glitch_interval_ms = 5000
//! glitch_probability = 0.3
//!
//! [links]
//! telegram = "https://t.me/Real1editorBot"
//!
//! [theme]
//! header = "#0a0e17"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ambient::AmbientConfig;
use crate::bridge::ThemeColors;
use crate::contact::ContactLinks;
use crate::effects::EffectTimings;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// How long the loader holds before fading
    pub loader_hold_ms: Option<u64>,
    /// Loader fade duration
    pub loader_fade_ms: Option<u64>,
    /// Delay between hiding sections and revealing the target
    pub section_reveal_ms: Option<u64>,
    /// Simulated network latency for the contact form
    pub transmission_latency_ms: Option<u64>,
    /// Voice feedback linger after a normal end
    pub voice_end_clear_ms: Option<u64>,
    /// Voice feedback linger after an error
    pub voice_error_clear_ms: Option<u64>,
}

/// Effects section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsToml {
    /// Delay before a notification slides in
    pub notification_enter_ms: Option<u64>,
    /// Notification visible time
    pub notification_visible_ms: Option<u64>,
    /// Notification slide-out time
    pub notification_exit_ms: Option<u64>,
    /// Transition flash lifetime
    pub transition_flash_ms: Option<u64>,
    /// Glitch flash lifetime
    pub glitch_flash_ms: Option<u64>,
    /// Transmission pulse lifetime
    pub transmission_pulse_ms: Option<u64>,
}

/// Ambient section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientToml {
    /// Whether ambient emitters run
    pub enabled: Option<bool>,
    /// Time between glitch rolls
    pub glitch_interval_ms: Option<u64>,
    /// Chance of a glitch per roll
    pub glitch_probability: Option<f64>,
    /// Time between pulse refreshes
    pub pulse_interval_ms: Option<u64>,
}

/// Links section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksToml {
    /// Messenger link
    pub telegram: Option<String>,
    /// `mailto:` link
    pub email: Option<String>,
    /// Work profile URL
    pub work_profile: Option<String>,
}

/// Theme section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeToml {
    /// Header color
    pub header: Option<String>,
    /// Background color
    pub background: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorToml {
    /// Timing configuration section
    pub timing: TimingToml,
    /// Effects configuration section
    pub effects: EffectsToml,
    /// Ambient configuration section
    pub ambient: AmbientToml,
    /// Contact links section
    pub links: LinksToml,
    /// Theme section
    pub theme: ThemeToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Delays driving the UI flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// Loader hold before fading
    pub loader_hold: Duration,
    /// Loader fade duration
    pub loader_fade: Duration,
    /// Section reveal delay
    pub section_reveal: Duration,
    /// Simulated transmission latency
    pub transmission_latency: Duration,
    /// Voice feedback linger after end
    pub voice_end_clear: Duration,
    /// Voice feedback linger after error
    pub voice_error_clear: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loader_hold: Duration::from_millis(3000),
            loader_fade: Duration::from_millis(1000),
            section_reveal: Duration::from_millis(300),
            transmission_latency: Duration::from_millis(2000),
            voice_end_clear: Duration::from_millis(2000),
            voice_error_clear: Duration::from_millis(3000),
        }
    }
}

/// Centralized configuration for the Conductor
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct ConductorConfig {
    /// UI flow timing
    pub timing: TimingConfig,
    /// Effect lifetimes
    pub effects: EffectTimings,
    /// Ambient emitters
    pub ambient: AmbientConfig,
    /// Contact destinations
    pub links: ContactLinks,
    /// Host theme colors
    pub theme: ThemeColors,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl ConductorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("effects.notification_visible_ms", self.effects.notification_visible),
            ("effects.transition_flash_ms", self.effects.transition_flash),
            ("effects.glitch_flash_ms", self.effects.glitch_flash),
            ("effects.transmission_pulse_ms", self.effects.transmission_pulse),
            ("ambient.glitch_interval_ms", self.ambient.glitch_interval),
            ("ambient.pulse_interval_ms", self.ambient.pulse_interval),
        ];
        for (name, value) in non_zero {
            if value.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        let p = self.ambient.glitch_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::ValidationError(format!(
                "ambient.glitch_probability must be within [0, 1], got {p}"
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/holo-conductor/conductor.toml` or
/// `~/.config/holo-conductor/conductor.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("holo-conductor").join("conductor.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<ConductorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ConductorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration reading environment overrides through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    env: F,
) -> Result<ConductorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ConductorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ConductorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn set_ms(target: &mut Duration, value: Option<u64>) {
    if let Some(ms) = value {
        *target = Duration::from_millis(ms);
    }
}

fn set_string(target: &mut String, value: Option<&String>) {
    if let Some(s) = value {
        target.clone_from(s);
    }
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConductorConfig, toml: &ConductorToml) {
    let timing = &mut config.timing;
    set_ms(&mut timing.loader_hold, toml.timing.loader_hold_ms);
    set_ms(&mut timing.loader_fade, toml.timing.loader_fade_ms);
    set_ms(&mut timing.section_reveal, toml.timing.section_reveal_ms);
    set_ms(&mut timing.transmission_latency, toml.timing.transmission_latency_ms);
    set_ms(&mut timing.voice_end_clear, toml.timing.voice_end_clear_ms);
    set_ms(&mut timing.voice_error_clear, toml.timing.voice_error_clear_ms);

    let effects = &mut config.effects;
    set_ms(&mut effects.notification_enter, toml.effects.notification_enter_ms);
    set_ms(&mut effects.notification_visible, toml.effects.notification_visible_ms);
    set_ms(&mut effects.notification_exit, toml.effects.notification_exit_ms);
    set_ms(&mut effects.transition_flash, toml.effects.transition_flash_ms);
    set_ms(&mut effects.glitch_flash, toml.effects.glitch_flash_ms);
    set_ms(&mut effects.transmission_pulse, toml.effects.transmission_pulse_ms);

    if let Some(enabled) = toml.ambient.enabled {
        config.ambient.enabled = enabled;
    }
    set_ms(&mut config.ambient.glitch_interval, toml.ambient.glitch_interval_ms);
    set_ms(&mut config.ambient.pulse_interval, toml.ambient.pulse_interval_ms);
    if let Some(p) = toml.ambient.glitch_probability {
        config.ambient.glitch_probability = p;
    }

    set_string(&mut config.links.telegram, toml.links.telegram.as_ref());
    set_string(&mut config.links.email, toml.links.email.as_ref());
    set_string(&mut config.links.work_profile, toml.links.work_profile.as_ref());

    set_string(&mut config.theme.header, toml.theme.header.as_ref());
    set_string(&mut config.theme.background, toml.theme.background.as_ref());
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ConductorConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let ms = |key: &str| env(key).and_then(|v| v.trim().parse::<u64>().ok());

    if let Some(v) = ms("HOLO_LOADER_HOLD_MS") {
        config.timing.loader_hold = Duration::from_millis(v);
        config.source = ConfigSource::Env;
    }
    if let Some(v) = ms("HOLO_REVEAL_DELAY_MS") {
        config.timing.section_reveal = Duration::from_millis(v);
        config.source = ConfigSource::Env;
    }
    if let Some(v) = ms("HOLO_TRANSMISSION_LATENCY_MS") {
        config.timing.transmission_latency = Duration::from_millis(v);
        config.source = ConfigSource::Env;
    }
    if let Some(enabled) = env("HOLO_AMBIENT") {
        config.ambient.enabled = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(p) = env("HOLO_GLITCH_PROBABILITY").and_then(|v| v.trim().parse::<f64>().ok()) {
        config.ambient.glitch_probability = p;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("HOLO_TELEGRAM_URL") {
        config.links.telegram = url;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Ambient emitters on/off
    pub ambient_enabled: Option<bool>,
    /// Transmission latency override (milliseconds)
    pub transmission_latency_ms: Option<u64>,
    /// Section reveal delay override (milliseconds)
    pub reveal_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ambient enabled override
    #[must_use]
    pub fn with_ambient_enabled(mut self, enabled: bool) -> Self {
        self.ambient_enabled = Some(enabled);
        self
    }

    /// Set transmission latency override
    #[must_use]
    pub fn with_transmission_latency_ms(mut self, ms: u64) -> Self {
        self.transmission_latency_ms = Some(ms);
        self
    }

    /// Set reveal delay override
    #[must_use]
    pub fn with_reveal_delay_ms(mut self, ms: u64) -> Self {
        self.reveal_delay_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ConductorConfig) {
        if self.ambient_enabled.is_some()
            || self.transmission_latency_ms.is_some()
            || self.reveal_delay_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(enabled) = self.ambient_enabled {
            config.ambient.enabled = enabled;
        }
        set_ms(&mut config.timing.transmission_latency, self.transmission_latency_ms);
        set_ms(&mut config.timing.section_reveal, self.reveal_delay_ms);
    }
}

// =============================================================================
// Tests
// =============================================================================
