//! Software synthesis of short auditory cues.
//!
//! This crate renders tonal and noise cues (sine, sawtooth, square, white
//! noise) into finished stereo buffers of signed 16-bit samples, shapes
//! them with linear attack/decay envelopes and optional panning, and
//! exposes a playback control surface over the [`AudioOutput`] seam. Device
//! I/O lives behind that seam (see the `earcon-backend` crate); everything
//! here is pure and synchronous.

pub mod config;
pub mod error;
pub mod sound;
pub mod stereo;
pub mod synthesis;

pub use config::{ConfigError, CueDefaults, OutputConfig};
pub use error::{PanningError, SynthesisError, Warning};
pub use sound::{AudioOutput, PlaybackControl, Repeat, Sound};
pub use stereo::{Panning, StereoBuffer};
pub use synthesis::{AMPLITUDE_CEILING, NoiseSource, OscillatorKind, ToneSpec};
