use std::fmt;

use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use earcon_core::OutputConfig;

use crate::output::device::DeviceInfo;

/// Result of matching the process audio configuration against a device.
#[derive(Debug, Clone)]
pub struct NegotiatedConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_size: BufferSize,
    pub sample_format: SampleFormat,

    /// False when the device could not run at the requested rate and a
    /// fallback rate was chosen instead.
    pub sample_rate_matched: bool,
}

impl NegotiatedConfig {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            channels: self.channels,
            sample_rate: SampleRate(self.sample_rate),
            buffer_size: self.buffer_size,
        }
    }
}

impl fmt::Display for NegotiatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ch @ {}Hz, buffer: {:?}, format: {:?}",
            self.channels, self.sample_rate, self.buffer_size, self.sample_format
        )
    }
}

pub type NegotiationResult<T> = Result<T, NegotiationError>;

#[derive(Debug, Clone)]
pub enum NegotiationError {
    ChannelsNotSupported { requested: u16, available: u16 },
    FormatNotSupported { available: Vec<SampleFormat> },
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelsNotSupported { requested, available } => {
                write!(
                    f,
                    "channel count {} not supported (device offers at most {})",
                    requested, available
                )
            }
            Self::FormatNotSupported { available } => {
                write!(
                    f,
                    "no usable sample format; device offers {:?}",
                    available
                )
            }
        }
    }
}

impl std::error::Error for NegotiationError {}

/// Match the requested output configuration against the device.
///
/// The requested sample rate is honored when the device supports it;
/// otherwise the best standard rate in range wins and the mismatch is
/// flagged on the result so the caller can log it. Stereo output is
/// required. i16 output is preferred since cue buffers are 16-bit; f32 is
/// accepted and fed by rescaling in the callback.
pub fn negotiate(info: &DeviceInfo, request: &OutputConfig) -> NegotiationResult<NegotiatedConfig> {
    if info.max_channels < request.channels {
        return Err(NegotiationError::ChannelsNotSupported {
            requested: request.channels,
            available: info.max_channels,
        });
    }

    let (sample_rate, sample_rate_matched) = if is_rate_supported(info, request.sample_rate) {
        (request.sample_rate, true)
    } else {
        (
            find_best_standard_rate(info).unwrap_or(info.default_sample_rate),
            false,
        )
    };

    let sample_format = [SampleFormat::I16, SampleFormat::F32]
        .into_iter()
        .find(|format| info.sample_formats.contains(format))
        .ok_or_else(|| NegotiationError::FormatNotSupported {
            available: info.sample_formats.clone(),
        })?;

    Ok(NegotiatedConfig {
        sample_rate,
        channels: request.channels,
        buffer_size: BufferSize::Fixed(request.buffer_size),
        sample_format,
        sample_rate_matched,
    })
}

fn is_rate_supported(info: &DeviceInfo, rate: u32) -> bool {
    rate >= info.min_sample_rate && rate <= info.max_sample_rate
}

fn find_best_standard_rate(info: &DeviceInfo) -> Option<u32> {
    [48_000, 44_100, 96_000, 88_200]
        .into_iter()
        .find(|&rate| is_rate_supported(info, rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(min: u32, max: u32, channels: u16, formats: &[SampleFormat]) -> DeviceInfo {
        DeviceInfo {
            name: "test".to_owned(),
            min_sample_rate: min,
            max_sample_rate: max,
            default_sample_rate: max.min(48_000),
            max_channels: channels,
            sample_formats: formats.to_vec(),
            default_sample_format: formats[0],
        }
    }

    #[test]
    fn test_requested_rate_is_honored_when_supported() {
        let info = device(8_000, 192_000, 2, &[SampleFormat::I16]);
        let negotiated = negotiate(&info, &OutputConfig::default()).unwrap();
        assert_eq!(negotiated.sample_rate, 44_100);
        assert!(negotiated.sample_rate_matched);
        assert_eq!(negotiated.buffer_size, BufferSize::Fixed(1_024));
    }

    #[test]
    fn test_unsupported_rate_falls_back_to_standard() {
        let info = device(48_000, 96_000, 2, &[SampleFormat::I16]);
        let request = OutputConfig {
            sample_rate: 22_050,
            ..OutputConfig::default()
        };
        let negotiated = negotiate(&info, &request).unwrap();
        assert_eq!(negotiated.sample_rate, 48_000);
        assert!(!negotiated.sample_rate_matched);
    }

    #[test]
    fn test_mono_device_is_rejected() {
        let info = device(8_000, 192_000, 1, &[SampleFormat::I16]);
        assert!(matches!(
            negotiate(&info, &OutputConfig::default()),
            Err(NegotiationError::ChannelsNotSupported {
                requested: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_i16_is_preferred_over_f32() {
        let info = device(
            8_000,
            192_000,
            2,
            &[SampleFormat::F32, SampleFormat::I16],
        );
        let negotiated = negotiate(&info, &OutputConfig::default()).unwrap();
        assert_eq!(negotiated.sample_format, SampleFormat::I16);
    }

    #[test]
    fn test_f32_only_device_is_accepted() {
        let info = device(8_000, 192_000, 2, &[SampleFormat::F32]);
        let negotiated = negotiate(&info, &OutputConfig::default()).unwrap();
        assert_eq!(negotiated.sample_format, SampleFormat::F32);
    }

    #[test]
    fn test_unusable_formats_are_rejected() {
        let info = device(8_000, 192_000, 2, &[SampleFormat::U8]);
        assert!(matches!(
            negotiate(&info, &OutputConfig::default()),
            Err(NegotiationError::FormatNotSupported { .. })
        ));
    }

    #[test]
    fn test_stream_config_carries_negotiated_values() {
        let info = device(8_000, 192_000, 2, &[SampleFormat::I16]);
        let negotiated = negotiate(&info, &OutputConfig::default()).unwrap();
        let stream = negotiated.stream_config();
        assert_eq!(stream.channels, 2);
        assert_eq!(stream.sample_rate, SampleRate(44_100));
    }
}
