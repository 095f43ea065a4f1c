use std::sync::Arc;

use crate::error::PanningError;

/// Stereo balance for a cue.
///
/// `Left` and `Right` silence the opposite channel entirely. `Value`
/// positions in `-1.0..=1.0` attenuate the channel opposite the pan
/// direction; `Value(0.0)` leaves the buffer untouched. Use
/// [`Panning::value`] to validate a numeric position at the call boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panning {
    Left,
    Right,
    Value(f32),
}

impl Panning {
    /// Validate a numeric panning position.
    pub fn value(position: f32) -> Result<Self, PanningError> {
        if (-1.0..=1.0).contains(&position) {
            Ok(Self::Value(position))
        } else {
            Err(PanningError::OutOfRange(position))
        }
    }

}

/// A finished cue: one signed 16-bit sample pair per output frame.
///
/// Built by duplicating a mono render into both channels (center-panned),
/// then optionally rebalanced with [`StereoBuffer::panned`]. Buffers are
/// never mutated after construction; panning returns a new buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StereoBuffer {
    frames: Vec<[i16; 2]>,
}

impl StereoBuffer {
    /// Duplicate each mono sample into the left and right channel.
    pub fn from_mono(samples: &[i16]) -> Self {
        Self {
            frames: samples.iter().map(|&s| [s, s]).collect(),
        }
    }

    pub fn from_frames(frames: Vec<[i16; 2]>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[[i16; 2]] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Flatten to the interleaved `[l0, r0, l1, r1, ..]` layout consumed by
    /// output devices.
    pub fn interleaved(&self) -> Vec<i16> {
        self.frames.iter().flatten().copied().collect()
    }

    /// Copy the frames into a shareable slice for the output side.
    pub fn shared_frames(&self) -> Arc<[[i16; 2]]> {
        Arc::from(self.frames.as_slice())
    }

    /// Apply `panning` and return the rebalanced buffer.
    ///
    /// Numeric positions divide the opposite channel by the pan magnitude,
    /// truncating toward zero; magnitudes below 1.0 therefore push that
    /// channel toward the i16 rails, where it saturates instead of
    /// wrapping. The mapping is kept from earlier releases so existing cue
    /// definitions keep their loudness.
    pub fn panned(&self, panning: Panning) -> StereoBuffer {
        let mut frames = self.frames.clone();
        match panning {
            Panning::Value(v) if v == 0.0 => {}
            Panning::Left => {
                for frame in &mut frames {
                    frame[1] = 0;
                }
            }
            Panning::Right => {
                for frame in &mut frames {
                    frame[0] = 0;
                }
            }
            Panning::Value(v) if v < 0.0 => {
                for frame in &mut frames {
                    frame[1] = rebalance(frame[1], v);
                }
            }
            Panning::Value(v) => {
                for frame in &mut frames {
                    frame[0] = rebalance(frame[0], v);
                }
            }
        }
        StereoBuffer { frames }
    }
}

#[inline]
fn rebalance(sample: i16, panning: f32) -> i16 {
    (f64::from(sample) / f64::from(panning.abs())) as i16
}
