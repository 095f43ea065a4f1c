use std::fmt;
use std::sync::Arc;

use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, StreamTrait};
use earcon_core::{AudioOutput, ConfigError, OutputConfig, PlaybackControl};

use crate::output::device::{self, DeviceError};
use crate::output::negotiation::{self, NegotiatedConfig, NegotiationError};
use crate::playback::monitor::MonitorSnapshot;
use crate::playback::slot::VoiceSlot;
use crate::playback::voice::VoiceHandle;

/// Process-wide audio output: the cpal stream plus the realtime voice slot.
///
/// Open exactly one mixer per process, at startup or lazily before the
/// first sound, and keep it alive while any sound exists; dropping it
/// tears the stream down and ends all playback. Sounds receive the mixer
/// by reference at construction time rather than reaching for hidden
/// global state.
pub struct Mixer {
    slot: Arc<VoiceSlot>,
    negotiated: NegotiatedConfig,
    // Held for its lifetime; the device callback stops when this drops.
    _stream: cpal::Stream,
}

impl Mixer {
    /// Open the host's default output device with `config`.
    pub fn open(config: &OutputConfig) -> MixerResult<Self> {
        config.validate()?;
        let (device, info) = device::default_output()?;
        let negotiated = negotiation::negotiate(&info, config)?;
        if !negotiated.sample_rate_matched {
            log::warn!(
                "device cannot run at {} Hz; using {} Hz instead",
                config.sample_rate,
                negotiated.sample_rate
            );
        }

        let slot = Arc::new(VoiceSlot::new(negotiated.sample_rate));
        let stream_config = negotiated.stream_config();
        let err_fn = |err: cpal::StreamError| log::warn!("output stream error: {}", err);

        let stream = match negotiated.sample_format {
            SampleFormat::I16 => {
                let slot = Arc::clone(&slot);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| slot.mix_i16(data),
                    err_fn,
                    None,
                )
            }
            SampleFormat::F32 => {
                let slot = Arc::clone(&slot);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| slot.mix_f32(data),
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(MixerError::Stream(format!(
                    "negotiated an unusable sample format: {:?}",
                    other
                )));
            }
        }
        .map_err(|e| MixerError::Stream(e.to_string()))?;

        stream.play().map_err(|e| MixerError::Stream(e.to_string()))?;
        log::info!("mixer running: {} on {}", negotiated, info);

        Ok(Self {
            slot,
            negotiated,
            _stream: stream,
        })
    }

    /// The sample rate cues must be rendered at.
    pub fn sample_rate(&self) -> u32 {
        self.negotiated.sample_rate
    }

    /// Seconds of audio emitted since the mixer was opened.
    pub fn playback_time(&self) -> f64 {
        self.slot.playback_time()
    }

    /// Voices currently queued or playing.
    pub fn active_voices(&self) -> usize {
        self.slot.active_voices()
    }

    /// Callback metrics; safe to call from any control thread.
    pub fn metrics(&self) -> MonitorSnapshot {
        self.slot.metrics()
    }
}

impl AudioOutput for Mixer {
    fn register(&self, frames: Arc<[[i16; 2]]>) -> Box<dyn PlaybackControl> {
        Box::new(VoiceHandle::new(frames, Arc::clone(&self.slot)))
    }
}

pub type MixerResult<T> = Result<T, MixerError>;

#[derive(Debug)]
pub enum MixerError {
    InvalidConfig(ConfigError),
    Device(DeviceError),
    Negotiation(NegotiationError),
    Stream(String),
}

impl fmt::Display for MixerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid output configuration: {}", err),
            Self::Device(err) => write!(f, "{}", err),
            Self::Negotiation(err) => write!(f, "{}", err),
            Self::Stream(msg) => write!(f, "output stream failed: {}", msg),
        }
    }
}

impl std::error::Error for MixerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            Self::Device(err) => Some(err),
            Self::Negotiation(err) => Some(err),
            Self::Stream(_) => None,
        }
    }
}

impl From<ConfigError> for MixerError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

impl From<DeviceError> for MixerError {
    fn from(err: DeviceError) -> Self {
        Self::Device(err)
    }
}

impl From<NegotiationError> for MixerError {
    fn from(err: NegotiationError) -> Self {
        Self::Negotiation(err)
    }
}
