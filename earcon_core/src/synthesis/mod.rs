pub mod envelope;
pub mod generator;
pub mod noise;
pub mod waveform;

pub use envelope::AttackDecay;
pub use generator::{AMPLITUDE_CEILING, ToneSpec};
pub use noise::NoiseSource;
pub use waveform::OscillatorKind;
