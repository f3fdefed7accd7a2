use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::easing::CubicBezier;
use crate::domain::wobble::{TiltMode, Wobble};

/// File looked up in the working directory when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "wobble-cube.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for the eased transition shown after manual spin steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub duration: Duration,
    pub easing: CubicBezier,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(CubeConfig::DEFAULT_TRANSITION_MS),
            easing: CubicBezier::SNAP,
        }
    }
}

/// Tunables of the orientation controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeConfig {
    /// Auto spin speed in degrees per millisecond
    pub spin_speed: f64,
    /// Wobbling or fixed tilt
    pub tilt: TiltMode,
    /// Degrees turned per arrow key press
    pub step_degrees: f64,
    /// Idle time after the last interaction before auto mode resumes
    pub resume_delay: Duration,
    pub transition: TransitionConfig,
    /// Spin at mount time
    pub initial_spin: f64,
}

impl CubeConfig {
    pub const DEFAULT_SPIN_SPEED: f64 = 0.02;
    pub const DEFAULT_STEP_DEGREES: f64 = 45.0;
    pub const DEFAULT_RESUME_DELAY_MS: u64 = 1000;
    pub const DEFAULT_TRANSITION_MS: u64 = 600;

    /// Same tunables, but the tilt stays at its default fixed angle
    pub fn fixed_tilt() -> Self {
        Self {
            tilt: TiltMode::Fixed(TiltMode::DEFAULT_FIXED_TILT),
            ..Self::default()
        }
    }

    /// Parses a TOML document on top of the defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw)?;
        let mut config = Self::default();
        file.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value the controller divides by or animates with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spin_speed.is_finite() {
            return Err(invalid("spin_speed", format!("{} is not finite", self.spin_speed)));
        }
        if !self.step_degrees.is_finite() {
            return Err(invalid("step_degrees", format!("{} is not finite", self.step_degrees)));
        }
        if !self.initial_spin.is_finite() {
            return Err(invalid("initial_spin", format!("{} is not finite", self.initial_spin)));
        }
        if self.resume_delay.is_zero() {
            return Err(invalid("resume_delay_ms", "must be greater than zero".into()));
        }
        if self.transition.duration.is_zero() {
            return Err(invalid("transition_ms", "must be greater than zero".into()));
        }
        if !self.transition.easing.is_valid() {
            return Err(invalid(
                "easing",
                format!("{} needs finite values and x controls within [0, 1]", self.transition.easing),
            ));
        }

        match self.tilt {
            TiltMode::Wobble(wobble) => {
                // A flat wobble has no phase to recover; use a fixed tilt of 0 instead
                if !(wobble.amplitude.is_finite() && wobble.amplitude > 0.0) {
                    return Err(invalid(
                        "wobble_amplitude",
                        format!("{} must be a positive number", wobble.amplitude),
                    ));
                }
                if !(wobble.period_ms.is_finite() && wobble.period_ms > 0.0) {
                    return Err(invalid(
                        "wobble_period_ms",
                        format!("{} must be a positive number", wobble.period_ms),
                    ));
                }
            }
            TiltMode::Fixed(degrees) => {
                if !degrees.is_finite() {
                    return Err(invalid("fixed_tilt", format!("{degrees} is not finite")));
                }
            }
        }

        Ok(())
    }
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            spin_speed: Self::DEFAULT_SPIN_SPEED,
            tilt: TiltMode::Wobble(Wobble::default()),
            step_degrees: Self::DEFAULT_STEP_DEGREES,
            resume_delay: Duration::from_millis(Self::DEFAULT_RESUME_DELAY_MS),
            transition: TransitionConfig::default(),
            initial_spin: 0.0,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// On-disk representation; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    spin_speed: Option<f64>,
    step_degrees: Option<f64>,
    resume_delay_ms: Option<u64>,
    transition_ms: Option<u64>,
    easing: Option<[f64; 4]>,
    initial_spin: Option<f64>,
    wobble: Option<bool>,
    wobble_amplitude: Option<f64>,
    wobble_period_ms: Option<f64>,
    fixed_tilt: Option<f64>,
}

impl ConfigFile {
    fn apply(self, config: &mut CubeConfig) -> Result<(), ConfigError> {
        if let Some(v) = self.spin_speed {
            config.spin_speed = v;
        }
        if let Some(v) = self.step_degrees {
            config.step_degrees = v;
        }
        if let Some(v) = self.resume_delay_ms {
            config.resume_delay = Duration::from_millis(v);
        }
        if let Some(v) = self.transition_ms {
            config.transition.duration = Duration::from_millis(v);
        }
        if let Some([x1, y1, x2, y2]) = self.easing {
            config.transition.easing = CubicBezier::new(x1, y1, x2, y2);
        }
        if let Some(v) = self.initial_spin {
            config.initial_spin = v;
        }

        let wobble_enabled = self.wobble.unwrap_or(true);
        if wobble_enabled && self.fixed_tilt.is_some() {
            return Err(invalid("fixed_tilt", "only applies with wobble = false".into()));
        }
        if !wobble_enabled && self.wobble_amplitude.is_some() {
            return Err(invalid("wobble_amplitude", "has no effect with wobble = false".into()));
        }
        if !wobble_enabled && self.wobble_period_ms.is_some() {
            return Err(invalid("wobble_period_ms", "has no effect with wobble = false".into()));
        }

        config.tilt = if wobble_enabled {
            let defaults = Wobble::default();
            TiltMode::Wobble(Wobble::new(
                self.wobble_amplitude.unwrap_or(defaults.amplitude),
                self.wobble_period_ms.unwrap_or(defaults.period_ms),
            ))
        } else {
            TiltMode::Fixed(self.fixed_tilt.unwrap_or(TiltMode::DEFAULT_FIXED_TILT))
        };
        Ok(())
    }
}

/// Loads the configuration: defaults, then the TOML file, then environment overrides
///
/// With `path` unset, a missing `wobble-cube.toml` is not an error. An
/// explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> Result<CubeConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut config = match fs::read_to_string(&path) {
        Ok(raw) => {
            info!(path = %path.display(), "loading cube configuration");
            let file: ConfigFile = toml::from_str(&raw)?;
            let mut config = CubeConfig::default();
            file.apply(&mut config)?;
            config
        }
        Err(source) if required || source.kind() != std::io::ErrorKind::NotFound => {
            return Err(ConfigError::Io { path, source });
        }
        Err(_) => {
            debug!(path = %path.display(), "no config file, using defaults");
            CubeConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Applies `CUBE_WOBBLE` and `CUBE_SPIN_SPEED` from the given lookup
fn apply_env_overrides<F>(config: &mut CubeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("CUBE_WOBBLE") {
        match raw.trim().to_ascii_lowercase().as_str() {
            "on" | "1" | "true" => {
                if !matches!(config.tilt, TiltMode::Wobble(_)) {
                    config.tilt = TiltMode::Wobble(Wobble::default());
                }
            }
            "off" | "0" | "false" => {
                if !matches!(config.tilt, TiltMode::Fixed(_)) {
                    config.tilt = TiltMode::Fixed(TiltMode::DEFAULT_FIXED_TILT);
                }
            }
            other => return Err(invalid("CUBE_WOBBLE", format!("expected on/off, got {other:?}"))),
        }
    }

    if let Some(raw) = lookup("CUBE_SPIN_SPEED") {
        config.spin_speed = raw
            .trim()
            .parse()
            .map_err(|_| invalid("CUBE_SPIN_SPEED", format!("{raw:?} is not a number")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_widget_constants() {
        let config = CubeConfig::default();
        assert_eq!(config.spin_speed, 0.02);
        assert_eq!(config.step_degrees, 45.0);
        assert_eq!(config.resume_delay, Duration::from_millis(1000));
        assert_eq!(config.transition.duration, Duration::from_millis(600));
        assert_eq!(config.tilt, TiltMode::Wobble(Wobble::new(20.0, 20_000.0)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fixed_tilt_variant() {
        let config = CubeConfig::fixed_tilt();
        assert_eq!(config.tilt, TiltMode::Fixed(20.0));
        assert_eq!(config.spin_speed, 0.02);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = CubeConfig::from_toml_str(
            r#"
            spin_speed = 0.05
            resume_delay_ms = 2000
            easing = [0.0, 0.0, 1.0, 1.0]
            wobble_period_ms = 10000.0
            "#,
        )
        .unwrap();

        assert_eq!(config.spin_speed, 0.05);
        assert_eq!(config.resume_delay, Duration::from_millis(2000));
        assert_eq!(config.transition.easing, CubicBezier::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(config.tilt, TiltMode::Wobble(Wobble::new(20.0, 10_000.0)));
        // Untouched keys keep their defaults
        assert_eq!(config.step_degrees, 45.0);
    }

    #[test]
    fn toml_can_disable_wobble() {
        let config = CubeConfig::from_toml_str("wobble = false\nfixed_tilt = 15.0").unwrap();
        assert_eq!(config.tilt, TiltMode::Fixed(15.0));
    }

    #[test]
    fn tilt_keys_must_match_wobble_switch() {
        let result = CubeConfig::from_toml_str("fixed_tilt = 15.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "fixed_tilt",
                ..
            })
        ));

        let result = CubeConfig::from_toml_str("wobble = true\nfixed_tilt = 15.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "fixed_tilt",
                ..
            })
        ));

        let result = CubeConfig::from_toml_str("wobble = false\nwobble_amplitude = 5.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "wobble_amplitude",
                ..
            })
        ));

        let result = CubeConfig::from_toml_str("wobble = false\nwobble_period_ms = 5000.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "wobble_period_ms",
                ..
            })
        ));
    }

    #[test]
    fn flat_wobble_is_rejected() {
        let result = CubeConfig::from_toml_str("wobble_amplitude = 0.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "wobble_amplitude",
                ..
            })
        ));

        // The same cube, expressed as a fixed tilt
        let config = CubeConfig::from_toml_str("wobble = false\nfixed_tilt = 0.0").unwrap();
        assert_eq!(config.tilt, TiltMode::Fixed(0.0));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = CubeConfig::from_toml_str("spinspeed = 1.0");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = CubeConfig::from_toml_str("wobble_period_ms = 0.0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "wobble_period_ms",
                ..
            })
        ));

        let result = CubeConfig::from_toml_str("resume_delay_ms = 0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "resume_delay_ms",
                ..
            })
        ));

        let result = CubeConfig::from_toml_str("easing = [1.5, 0.0, 0.5, 1.0]");
        assert!(matches!(result, Err(ConfigError::Invalid { field: "easing", .. })));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("CUBE_WOBBLE", "off"), ("CUBE_SPIN_SPEED", " 0.1 ")]);
        let mut config = CubeConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.tilt, TiltMode::Fixed(20.0));
        assert_eq!(config.spin_speed, 0.1);
    }

    #[test]
    fn env_wobble_on_keeps_custom_wobble() {
        let mut config = CubeConfig::from_toml_str("wobble_amplitude = 10.0").unwrap();
        apply_env_overrides(&mut config, |key| (key == "CUBE_WOBBLE").then(|| "on".to_string()))
            .unwrap();
        assert_eq!(config.tilt, TiltMode::Wobble(Wobble::new(10.0, 20_000.0)));
    }

    #[test]
    fn bad_env_values_are_errors() {
        let mut config = CubeConfig::default();
        let result = apply_env_overrides(&mut config, |key| {
            (key == "CUBE_SPIN_SPEED").then(|| "fast".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "CUBE_SPIN_SPEED",
                ..
            })
        ));

        let result = apply_env_overrides(&mut config, |key| {
            (key == "CUBE_WOBBLE").then(|| "maybe".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("definitely/not/here/wobble-cube.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
