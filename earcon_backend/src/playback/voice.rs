use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::atomic::AtomicCell;
use earcon_core::{PlaybackControl, Repeat};
use spin::RwLock;

use crate::playback::slot::VoiceSlot;

/// State shared between a sound's control handle and its in-flight voices.
pub(crate) struct VoiceShared {
    /// Current buffer. Swapped wholesale on pan, never edited in place, so
    /// voices already playing keep the frames they started with.
    frames: RwLock<Arc<[[i16; 2]]>>,
    /// Playback gain, read by the mixer once per frame per voice.
    volume: AtomicCell<f32>,
    /// Bumped by `stop()`; voices carrying an older epoch are retired.
    epoch: AtomicU64,
}

/// Control side of one registered sound. Implements the playback seam by
/// pushing voices into the mixer's realtime slot.
pub struct VoiceHandle {
    shared: Arc<VoiceShared>,
    slot: Arc<VoiceSlot>,
}

impl VoiceHandle {
    pub(crate) fn new(frames: Arc<[[i16; 2]]>, slot: Arc<VoiceSlot>) -> Self {
        Self {
            shared: Arc::new(VoiceShared {
                frames: RwLock::new(frames),
                volume: AtomicCell::new(1.0),
                epoch: AtomicU64::new(0),
            }),
            slot,
        }
    }
}

impl PlaybackControl for VoiceHandle {
    fn play(&self, repeat: Repeat) {
        let voice = Voice {
            frames: Arc::clone(&self.shared.frames.read()),
            epoch: self.shared.epoch.load(Ordering::Relaxed),
            shared: Arc::clone(&self.shared),
            position: 0,
            remaining: repeat,
        };
        self.slot.add_voice(voice);
    }

    fn stop(&self) {
        self.shared.epoch.fetch_add(1, Ordering::Relaxed);
    }

    fn set_volume(&self, volume: f32) {
        self.shared.volume.store(volume);
    }

    fn swap_frames(&self, frames: Arc<[[i16; 2]]>) {
        *self.shared.frames.write() = frames;
    }
}

/// One in-flight playback of a sound's buffer.
pub(crate) struct Voice {
    shared: Arc<VoiceShared>,
    frames: Arc<[[i16; 2]]>,
    epoch: u64,
    position: usize,
    remaining: Repeat,
}

impl Voice {
    /// Mix this voice's next frame into `acc` and advance. Called from the
    /// audio callback: no locks, no allocation.
    #[inline]
    pub(crate) fn accumulate(&mut self, acc: &mut [i32; 2]) {
        if self.is_stale() || self.position >= self.frames.len() {
            return;
        }
        let frame = self.frames[self.position];
        let volume = self.shared.volume.load();
        acc[0] += (f32::from(frame[0]) * volume) as i32;
        acc[1] += (f32::from(frame[1]) * volume) as i32;
        self.position += 1;
        if self.position == self.frames.len() {
            match self.remaining {
                Repeat::Forever => self.position = 0,
                Repeat::Count(0) => {}
                Repeat::Count(n) => {
                    self.remaining = Repeat::Count(n - 1);
                    self.position = 0;
                }
            }
        }
    }

    /// True once the voice can be dropped from the mix.
    #[inline]
    pub(crate) fn finished(&self) -> bool {
        self.is_stale() || self.position >= self.frames.len()
    }

    #[inline]
    fn is_stale(&self) -> bool {
        self.epoch != self.shared.epoch.load(Ordering::Relaxed)
    }
}
