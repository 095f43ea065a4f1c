use std::fmt;

use thiserror::Error;

/// Fatal synthesis failures. These abort cue construction: a buffer rendered
/// past one of these would contain undefined sample data.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SynthesisError {
    /// Oscillator frequency must be a positive, finite number of hertz.
    #[error("invalid oscillator frequency: {0} Hz (must be positive and finite)")]
    InvalidFrequency(f64),
}

/// Rejection raised by the strict panning constructor.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PanningError {
    #[error("panning position {0} is outside -1.0..=1.0")]
    OutOfRange(f32),
}

/// Non-fatal degradations recorded by the lenient control surface.
///
/// The playback API keeps a sound usable when given an out-of-range control
/// value: the offending call becomes a no-op (or a documented fallback) and
/// the event is recorded here so callers and tests can observe it. Every
/// warning is also emitted through `log::warn!`.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Oscillator tag was not recognized; the sound fell back to a sine wave.
    UnknownOscillator { requested: String },
    /// Panning value outside `-1.0..=1.0`; the buffer was left unchanged.
    PanningOutOfRange { value: f32 },
    /// Volume outside `0.0..=1.0`; the previous volume was kept.
    VolumeOutOfRange { value: f32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOscillator { requested } => {
                write!(f, "unrecognized oscillator {:?}; falling back to sine", requested)
            }
            Self::PanningOutOfRange { value } => {
                write!(f, "panning {} is outside -1.0..=1.0; buffer unchanged", value)
            }
            Self::VolumeOutOfRange { value } => {
                write!(f, "volume {} is outside 0.0..=1.0; volume unchanged", value)
            }
        }
    }
}
