use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait};

/// Capabilities of the output device the mixer will open.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,

    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub default_sample_rate: u32,

    pub max_channels: u16,

    pub sample_formats: Vec<cpal::SampleFormat>,
    pub default_sample_format: cpal::SampleFormat,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}ch @ {}Hz]",
            self.name, self.max_channels, self.default_sample_rate
        )
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;

#[derive(Debug)]
pub enum DeviceError {
    NoOutputDevice,
    QueryFailed(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOutputDevice => write!(f, "no default audio output device"),
            Self::QueryFailed(msg) => write!(f, "device query failed: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Pick the host's default output device and describe its capabilities.
pub fn default_output() -> DeviceResult<(cpal::Device, DeviceInfo)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(DeviceError::NoOutputDevice)?;
    let info = describe(&device)?;
    log::debug!("selected output device: {}", info);
    Ok((device, info))
}

/// Query a device's supported output ranges into a [`DeviceInfo`].
pub fn describe(device: &cpal::Device) -> DeviceResult<DeviceInfo> {
    let name = device
        .name()
        .unwrap_or_else(|_| String::from("<unnamed device>"));
    let default = device
        .default_output_config()
        .map_err(|e| DeviceError::QueryFailed(e.to_string()))?;

    let mut min_sample_rate = u32::MAX;
    let mut max_sample_rate = 0;
    let mut max_channels = 0;
    let mut sample_formats = Vec::new();

    let ranges = device
        .supported_output_configs()
        .map_err(|e| DeviceError::QueryFailed(e.to_string()))?;
    for range in ranges {
        min_sample_rate = min_sample_rate.min(range.min_sample_rate().0);
        max_sample_rate = max_sample_rate.max(range.max_sample_rate().0);
        max_channels = max_channels.max(range.channels());
        if !sample_formats.contains(&range.sample_format()) {
            sample_formats.push(range.sample_format());
        }
    }

    // Some hosts report no ranges; fall back to the default config.
    if max_sample_rate == 0 {
        min_sample_rate = default.sample_rate().0;
        max_sample_rate = default.sample_rate().0;
        max_channels = default.channels();
    }
    if !sample_formats.contains(&default.sample_format()) {
        sample_formats.push(default.sample_format());
    }

    Ok(DeviceInfo {
        name,
        min_sample_rate,
        max_sample_rate,
        default_sample_rate: default.sample_rate().0,
        max_channels,
        sample_formats,
        default_sample_format: default.sample_format(),
    })
}
