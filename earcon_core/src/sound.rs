use std::sync::Arc;

use crate::config::CueDefaults;
use crate::error::{SynthesisError, Warning};
use crate::stereo::{Panning, StereoBuffer};
use crate::synthesis::generator::ToneSpec;

/// How many times a cue is repeated after its first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play once, then repeat this many additional times. `Count(0)` plays
    /// the cue a single time.
    Count(u32),
    /// Loop until [`Sound::stop`] is called.
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// The output side of the system: owns the audio device and performs the
/// actual playback. Synthesis hands finished buffers across this seam and
/// never touches the device itself.
pub trait AudioOutput {
    /// Register a finished stereo buffer and return its playback controls.
    fn register(&self, frames: Arc<[[i16; 2]]>) -> Box<dyn PlaybackControl>;
}

/// Per-sound controls forwarded to the output device. All methods return
/// immediately; effects are only audible through the device.
pub trait PlaybackControl: Send + Sync {
    /// Start one asynchronous playback of the registered buffer.
    fn play(&self, repeat: Repeat);

    /// Stop every in-flight playback of this sound. Idempotent.
    fn stop(&self);

    /// Set the playback volume, `0.0..=1.0`. The caller validates the range.
    fn set_volume(&self, volume: f32);

    /// Replace the registered buffer. In-flight playbacks keep the frames
    /// they started with; subsequent plays use the new buffer.
    fn swap_frames(&self, frames: Arc<[[i16; 2]]>);
}

/// A playable cue: one stereo buffer plus its device-side controls.
///
/// Synthesized from a [`ToneSpec`] or wrapped around an externally decoded
/// buffer. The buffer is immutable except through [`Sound::pan`], which
/// swaps in a rebalanced copy. Out-of-range control values never break a
/// sound; they are dropped with a recorded [`Warning`].
pub struct Sound {
    buffer: StereoBuffer,
    control: Box<dyn PlaybackControl>,
    warnings: Vec<Warning>,
}

impl Sound {
    /// Wrap an already-built stereo buffer (synthesized or file-sourced).
    pub fn from_buffer(buffer: StereoBuffer, output: &dyn AudioOutput) -> Self {
        let control = output.register(buffer.shared_frames());
        Self {
            buffer,
            control,
            warnings: Vec::new(),
        }
    }

    /// Synthesize a cue and register it with the output collaborator.
    pub fn from_tone(
        spec: &ToneSpec,
        sample_rate: u32,
        output: &dyn AudioOutput,
    ) -> Result<Self, SynthesisError> {
        let mono = spec.render(sample_rate)?;
        Ok(Self::from_buffer(StereoBuffer::from_mono(&mono), output))
    }

    /// Synthesize a cue from configured defaults. An unrecognized
    /// oscillator tag degrades to sine and is recorded as a warning on the
    /// returned sound.
    pub fn from_defaults(
        defaults: &CueDefaults,
        sample_rate: u32,
        output: &dyn AudioOutput,
    ) -> Result<Self, SynthesisError> {
        let (spec, warning) = ToneSpec::from_defaults(defaults);
        let mut sound = Self::from_tone(&spec, sample_rate, output)?;
        sound.warnings.extend(warning);
        Ok(sound)
    }

    /// Start asynchronous playback; returns immediately.
    pub fn play(&self, repeat: Repeat) {
        self.control.play(repeat);
    }

    /// Stop playback. Idempotent when nothing is playing.
    pub fn stop(&self) {
        self.control.stop();
    }

    /// Set the playback volume for current and future playback.
    /// Out of `0.0..=1.0` the call is dropped with a warning.
    pub fn set_volume(&mut self, volume: f32) {
        if !(0.0..=1.0).contains(&volume) {
            self.warn(Warning::VolumeOutOfRange { value: volume });
            return;
        }
        self.control.set_volume(volume);
    }

    /// Rebalance the stereo buffer. Invalid numeric positions leave the
    /// buffer unchanged and record a warning. In-flight playbacks finish
    /// with the frames they started on; later plays use the panned buffer.
    pub fn pan(&mut self, panning: Panning) {
        if let Panning::Value(value) = panning {
            if Panning::value(value).is_err() {
                self.warn(Warning::PanningOutOfRange { value });
                return;
            }
        }
        self.buffer = self.buffer.panned(panning);
        self.control.swap_frames(self.buffer.shared_frames());
    }

    /// Numeric entry point for [`Sound::pan`].
    pub fn pan_value(&mut self, position: f32) {
        match Panning::value(position) {
            Ok(panning) => self.pan(panning),
            Err(_) => self.warn(Warning::PanningOutOfRange { value: position }),
        }
    }

    pub fn buffer(&self) -> &StereoBuffer {
        &self.buffer
    }

    /// Lenient-degrade events recorded by this sound, oldest first.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}
