//! Audio-output backend for earcon cues.
//!
//! Implements the `earcon-core` output seam on top of cpal: device
//! discovery and configuration negotiation, a realtime mixing callback
//! with per-sound voices, callback metrics, and wav/ogg file decoding.
//!
//! ```no_run
//! use earcon_backend::Mixer;
//! use earcon_core::{OutputConfig, Repeat, Sound, ToneSpec};
//!
//! let mixer = Mixer::open(&OutputConfig::default())?;
//! let beep = Sound::from_tone(&ToneSpec::default(), mixer.sample_rate(), &mixer)?;
//! beep.play(Repeat::Count(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod media;
pub mod output;
pub mod playback;

pub use media::{MediaError, MediaResult, load_sound};
pub use output::{Mixer, MixerError, MixerResult};
