use std::f64::consts::PI;

use crate::config::CueDefaults;
use crate::error::{SynthesisError, Warning};
use crate::synthesis::envelope::AttackDecay;
use crate::synthesis::noise::NoiseSource;
use crate::synthesis::waveform::OscillatorKind;

/// Amplitude ceiling for synthesized cues: half of the signed 16-bit
/// maximum, leaving headroom over other program audio.
pub const AMPLITUDE_CEILING: i16 = i16::MAX / 2;

/// Parameters for one synthesized cue.
///
/// Frequency is ignored by the white-noise oscillator but validated
/// regardless, so switching oscillators never changes whether a spec is
/// accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    pub oscillator: OscillatorKind,
    pub frequency_hz: f64,
    pub duration_ms: u64,
    pub attack_ms: u64,
    pub decay_ms: u64,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            oscillator: OscillatorKind::Sine,
            frequency_hz: 440.0,
            duration_ms: 100,
            attack_ms: 5,
            decay_ms: 5,
        }
    }
}

impl ToneSpec {
    pub fn new(oscillator: OscillatorKind) -> Self {
        Self {
            oscillator,
            ..Self::default()
        }
    }

    /// Build a spec from configured defaults. The oscillator tag is resolved
    /// leniently: an unknown tag falls back to sine and returns a warning.
    pub fn from_defaults(defaults: &CueDefaults) -> (Self, Option<Warning>) {
        let (oscillator, warning) = OscillatorKind::from_tag_lenient(&defaults.oscillator);
        let spec = Self {
            oscillator,
            frequency_hz: defaults.frequency_hz,
            duration_ms: defaults.duration_ms,
            attack_ms: defaults.attack_ms,
            decay_ms: defaults.decay_ms,
        };
        (spec, warning)
    }

    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_attack_ms(mut self, attack_ms: u64) -> Self {
        self.attack_ms = attack_ms;
        self
    }

    pub fn with_decay_ms(mut self, decay_ms: u64) -> Self {
        self.decay_ms = decay_ms;
        self
    }

    /// Render the cue into one quantized amplitude per output sample.
    ///
    /// The buffer holds `sample_rate * duration_ms / 1000` samples
    /// (truncating division). Each sample maps its position within the
    /// current waveform cycle to a phase angle, samples the oscillator,
    /// quantizes against [`AMPLITUDE_CEILING`] and applies the attack/decay
    /// envelope.
    pub fn render(&self, sample_rate: u32) -> Result<Vec<i16>, SynthesisError> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(SynthesisError::InvalidFrequency(self.frequency_hz));
        }

        let total = u64::from(sample_rate) * self.duration_ms / 1000;
        let envelope = AttackDecay::new(self.attack_ms, self.decay_ms, sample_rate, total);
        let cycles_per_sample = f64::from(sample_rate) / self.frequency_hz;
        let amp = f64::from(AMPLITUDE_CEILING);
        let mut noise = NoiseSource::default();

        let mut samples = Vec::with_capacity(total as usize);
        for i in 0..total {
            let phase = (i as f64 % cycles_per_sample) / cycles_per_sample * 2.0 * PI;
            let value = (amp * self.oscillator.sample(phase, &mut noise)) as i16;
            samples.push(envelope.apply(i, value));
        }
        Ok(samples)
    }
}
