use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-wide audio output configuration.
///
/// Mirrors what the output device is opened with: the mixer is configured
/// once per process and every synthesized cue is rendered against the same
/// sample rate. All fields have defaults, so a partial JSON document (or
/// `OutputConfig::default()`) is enough to get going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output sampling frequency in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Sample size in bits. Only signed 16-bit output is supported.
    #[serde(default = "default_sample_bits")]
    pub sample_bits: u16,
    /// Output channel count. Cues are stereo; only 2 is supported.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Device buffer size in frames.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_sample_bits() -> u16 {
    16
}

fn default_channels() -> u16 {
    2
}

fn default_buffer_size() -> u32 {
    1_024
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            sample_bits: default_sample_bits(),
            channels: default_channels(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl OutputConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.sample_bits != 16 {
            return Err(ConfigError::UnsupportedSampleBits(self.sample_bits));
        }
        if self.channels != 2 {
            return Err(ConfigError::UnsupportedChannelCount(self.channels));
        }
        Ok(())
    }
}

/// Default synthesis parameters for cues that do not specify their own,
/// typically loaded once from a settings file next to `OutputConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueDefaults {
    /// Oscillator tag: "sine", "saw", "square" or "whitenoise".
    #[serde(default = "default_oscillator")]
    pub oscillator: String,
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_attack_ms")]
    pub attack_ms: u64,
    #[serde(default = "default_decay_ms")]
    pub decay_ms: u64,
}

fn default_oscillator() -> String {
    "sine".to_owned()
}

fn default_frequency_hz() -> f64 {
    440.0
}

fn default_duration_ms() -> u64 {
    100
}

fn default_attack_ms() -> u64 {
    5
}

fn default_decay_ms() -> u64 {
    5
}

impl Default for CueDefaults {
    fn default() -> Self {
        Self {
            oscillator: default_oscillator(),
            frequency_hz: default_frequency_hz(),
            duration_ms: default_duration_ms(),
            attack_ms: default_attack_ms(),
            decay_ms: default_decay_ms(),
        }
    }
}

impl CueDefaults {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("unsupported sample size: {0} bits (only 16 is supported)")]
    UnsupportedSampleBits(u16),
    #[error("unsupported channel count: {0} (only stereo output is supported)")]
    UnsupportedChannelCount(u16),
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OutputConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels, 2);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = OutputConfig::from_json_str(r#"{"sample_rate": 48000}"#).unwrap();
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.buffer_size, 1_024);
        assert_eq!(config.sample_bits, 16);
    }

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        let err = OutputConfig::from_json_str(r#"{"sample_rate": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSampleRate));
    }

    #[test]
    fn test_mono_output_is_rejected() {
        let err = OutputConfig::from_json_str(r#"{"channels": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedChannelCount(1)));
    }

    #[test]
    fn test_output_config_round_trips() {
        let config = OutputConfig {
            sample_rate: 48_000,
            sample_bits: 16,
            channels: 2,
            buffer_size: 256,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(OutputConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_cue_defaults() {
        let defaults = CueDefaults::from_json_str("{}").unwrap();
        assert_eq!(defaults.oscillator, "sine");
        assert_eq!(defaults.frequency_hz, 440.0);
        assert_eq!(defaults.duration_ms, 100);

        let custom = CueDefaults::from_json_str(r#"{"oscillator": "square", "decay_ms": 20}"#).unwrap();
        assert_eq!(custom.oscillator, "square");
        assert_eq!(custom.decay_ms, 20);
        assert_eq!(custom.attack_ms, 5);
    }
}
