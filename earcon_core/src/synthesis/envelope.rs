/// Linear attack/decay gain applied to quantized samples by index.
///
/// Sample counts use the same truncating millisecond conversion as the
/// buffer length, so the envelope edges line up with the rendered buffer.
/// An attack or decay of zero samples leaves the corresponding edge
/// untouched. Attack and decay may overlap when their combined length
/// exceeds the buffer; both scalings then apply to the shared region.
#[derive(Debug, Clone, Copy)]
pub struct AttackDecay {
    attack_samples: u64,
    decay_samples: u64,
    total_samples: u64,
}

impl AttackDecay {
    pub fn new(attack_ms: u64, decay_ms: u64, sample_rate: u32, total_samples: u64) -> Self {
        Self {
            attack_samples: attack_ms * u64::from(sample_rate) / 1000,
            decay_samples: decay_ms * u64::from(sample_rate) / 1000,
            total_samples,
        }
    }

    pub fn attack_samples(&self) -> u64 {
        self.attack_samples
    }

    pub fn decay_samples(&self) -> u64 {
        self.decay_samples
    }

    /// Scale a quantized amplitude for its position in the buffer,
    /// truncating toward zero.
    #[inline]
    pub fn apply(&self, index: u64, value: i16) -> i16 {
        let mut v = value;
        if self.attack_samples > 0 && index < self.attack_samples {
            v = (f64::from(v) * index as f64 / self.attack_samples as f64) as i16;
        }
        if self.decay_samples > 0 {
            // The threshold can go negative when decay exceeds the buffer;
            // every sample is then part of the tail.
            let tail_start = self.total_samples as i64 - self.decay_samples as i64;
            if index as i64 > tail_start {
                v = (f64::from(v) * (self.total_samples - index) as f64
                    / self.decay_samples as f64) as i16;
            }
        }
        v
    }
}
