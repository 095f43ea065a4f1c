use std::f64::consts::PI;

use crate::error::Warning;
use crate::synthesis::noise::NoiseSource;

/// Waveform selection for synthesized cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorKind {
    Sine,
    Sawtooth,
    Square,
    WhiteNoise,
}

impl OscillatorKind {
    /// Strict parse of an external oscillator tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sine" => Some(Self::Sine),
            "saw" | "sawtooth" => Some(Self::Sawtooth),
            "square" => Some(Self::Square),
            "whitenoise" => Some(Self::WhiteNoise),
            _ => None,
        }
    }

    /// Lenient parse used at sound construction: an unknown tag degrades to
    /// sine and surfaces a warning instead of failing the whole cue.
    pub fn from_tag_lenient(tag: &str) -> (Self, Option<Warning>) {
        match Self::from_tag(tag) {
            Some(kind) => (kind, None),
            None => {
                let warning = Warning::UnknownOscillator {
                    requested: tag.to_owned(),
                };
                log::warn!("{warning}");
                (Self::Sine, Some(warning))
            }
        }
    }

    /// Sample the waveform at `phase`, in radians within `[0, 2π)`.
    ///
    /// White noise ignores the phase and draws from `noise` instead, one
    /// value per call.
    pub fn sample(self, phase: f64, noise: &mut NoiseSource) -> f64 {
        match self {
            Self::Sine => phase.sin(),
            Self::Sawtooth => sawtooth(phase),
            Self::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::WhiteNoise => noise.next_unit(),
        }
    }
}

/// The ramp period is π, not 2π, so one full cycle contains two ramps.
/// Kept this way so cues sound identical to earlier releases.
fn sawtooth(phase: f64) -> f64 {
    let phase = phase % PI;
    phase / (0.5 * PI) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_is_zero_at_phase_zero() {
        let mut noise = NoiseSource::default();
        assert_eq!(OscillatorKind::Sine.sample(0.0, &mut noise), 0.0);
    }

    #[test]
    fn test_square_is_exactly_bipolar() {
        let mut noise = NoiseSource::default();
        for i in 0..64 {
            let phase = i as f64 / 64.0 * 2.0 * PI;
            let v = OscillatorKind::Square.sample(phase, &mut noise);
            assert!(v == 1.0 || v == -1.0);
        }
    }

    #[test]
    fn test_sawtooth_ramps_twice_per_cycle() {
        let mut noise = NoiseSource::default();
        // Ramp start just after 0 and again just after π.
        let early = OscillatorKind::Sawtooth.sample(0.0, &mut noise);
        let restart = OscillatorKind::Sawtooth.sample(PI, &mut noise);
        assert!((early + 1.0).abs() < 1e-9);
        assert!((restart + 1.0).abs() < 1e-9);
        // Near the end of each ramp the value approaches +1.
        let late = OscillatorKind::Sawtooth.sample(PI - 1e-9, &mut noise);
        assert!(late > 0.999);
    }

    #[test]
    fn test_whitenoise_stays_in_unit_range() {
        let mut noise = NoiseSource::default();
        for _ in 0..1_000 {
            let v = OscillatorKind::WhiteNoise.sample(0.0, &mut noise);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(OscillatorKind::from_tag("sine"), Some(OscillatorKind::Sine));
        assert_eq!(OscillatorKind::from_tag("saw"), Some(OscillatorKind::Sawtooth));
        assert_eq!(OscillatorKind::from_tag("square"), Some(OscillatorKind::Square));
        assert_eq!(
            OscillatorKind::from_tag("whitenoise"),
            Some(OscillatorKind::WhiteNoise)
        );
        assert_eq!(OscillatorKind::from_tag("triangle"), None);
    }

    #[test]
    fn test_unknown_tag_degrades_to_sine_with_warning() {
        let (kind, warning) = OscillatorKind::from_tag_lenient("theremin");
        assert_eq!(kind, OscillatorKind::Sine);
        assert_eq!(
            warning,
            Some(Warning::UnknownOscillator {
                requested: "theremin".to_owned()
            })
        );

        let (kind, warning) = OscillatorKind::from_tag_lenient("square");
        assert_eq!(kind, OscillatorKind::Square);
        assert!(warning.is_none());
    }
}
