//! Lock-conscious realtime mixing slot.
//!
//! Design goals:
//! - Avoid OS mutex/syscall in the hot audio callback path.
//! - Allow the control side to add and stop voices from other threads.
//! - Never allocate inside the audio thread.
//! - If the voice list is unavailable (locked), output silence instead of
//!   blocking the device callback.

use std::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex; // small in-process spinning lock, good for realtime callbacks

use crate::playback::monitor::{CallbackMonitor, MonitorSnapshot};
use crate::playback::voice::Voice;

/// Interleaved output is always stereo; the negotiated stream enforces it.
const CHANNELS: usize = 2;

/// Shared state between the device callback and the control threads.
///
/// Control threads lock `voices` briefly (spin) to push or inspect; the
/// audio callback uses `try_lock` and falls back to silence, so the device
/// thread never blocks on the control side.
pub struct VoiceSlot {
    voices: Mutex<Vec<Voice>>,
    /// Frame clock (frames mixed). Atomic so it can be read from other
    /// threads while the stream runs.
    frame_clock: AtomicU64,
    monitor: CallbackMonitor,
    sample_rate: u32,
}

impl VoiceSlot {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: Mutex::new(Vec::new()),
            frame_clock: AtomicU64::new(0),
            monitor: CallbackMonitor::new(),
            sample_rate,
        }
    }

    /// Queue a voice for the next callback. Control side; may allocate.
    pub(crate) fn add_voice(&self, voice: Voice) {
        self.voices.lock().push(voice);
    }

    /// Realtime entry for i16 output streams. Mixes every live voice into
    /// the interleaved buffer with saturating 16-bit accumulation.
    pub fn mix_i16(&self, output: &mut [i16]) {
        let _guard = self.monitor.scoped_callback();
        let frames = output.len() / CHANNELS;
        if frames == 0 {
            return;
        }
        self.frame_clock.fetch_add(frames as u64, Ordering::Relaxed);
        self.monitor.add_frames(frames as u64);

        let Some(mut voices) = self.voices.try_lock() else {
            output.fill(0);
            self.monitor.note_underrun();
            return;
        };
        for frame_idx in 0..frames {
            let acc = mix_frame(&mut voices);
            output[frame_idx * CHANNELS] = clamp_sample(acc[0]);
            output[frame_idx * CHANNELS + 1] = clamp_sample(acc[1]);
        }
        voices.retain(|voice| !voice.finished());
    }

    /// Realtime entry for f32 output streams; same mix, rescaled to
    /// `[-1.0, 1.0]`.
    pub fn mix_f32(&self, output: &mut [f32]) {
        let _guard = self.monitor.scoped_callback();
        let frames = output.len() / CHANNELS;
        if frames == 0 {
            return;
        }
        self.frame_clock.fetch_add(frames as u64, Ordering::Relaxed);
        self.monitor.add_frames(frames as u64);

        let Some(mut voices) = self.voices.try_lock() else {
            output.fill(0.0);
            self.monitor.note_underrun();
            return;
        };
        for frame_idx in 0..frames {
            let acc = mix_frame(&mut voices);
            output[frame_idx * CHANNELS] = f32::from(clamp_sample(acc[0])) / -f32::from(i16::MIN);
            output[frame_idx * CHANNELS + 1] =
                f32::from(clamp_sample(acc[1])) / -f32::from(i16::MIN);
        }
        voices.retain(|voice| !voice.finished());
    }

    /// Frames mixed since the slot was created.
    pub fn frame_count(&self) -> u64 {
        self.frame_clock.load(Ordering::Relaxed)
    }

    /// Seconds of audio emitted (frames / sample rate).
    pub fn playback_time(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    /// Voices still queued or playing. Control side.
    pub fn active_voices(&self) -> usize {
        self.voices.lock().len()
    }

    pub fn metrics(&self) -> MonitorSnapshot {
        self.monitor.snapshot()
    }
}

#[inline]
fn mix_frame(voices: &mut [Voice]) -> [i32; 2] {
    let mut acc = [0i32; 2];
    for voice in voices.iter_mut() {
        voice.accumulate(&mut acc);
    }
    acc
}

#[inline]
fn clamp_sample(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::voice::VoiceHandle;
    use earcon_core::{PlaybackControl, Repeat};
    use std::sync::Arc;

    fn frames(samples: &[i16]) -> Arc<[[i16; 2]]> {
        samples.iter().map(|&s| [s, s]).collect::<Vec<_>>().into()
    }

    fn handle(slot: &Arc<VoiceSlot>, samples: &[i16]) -> VoiceHandle {
        VoiceHandle::new(frames(samples), Arc::clone(slot))
    }

    #[test]
    fn test_silence_when_no_voices() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let mut output = [123i16; 8];
        slot.mix_i16(&mut output);
        assert_eq!(output, [0i16; 8]);
        assert_eq!(slot.frame_count(), 4);
    }

    #[test]
    fn test_single_voice_plays_once() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[100, 200]);
        control.play(Repeat::Count(0));
        assert_eq!(slot.active_voices(), 1);

        let mut output = [0i16; 8];
        slot.mix_i16(&mut output);
        assert_eq!(&output[..4], &[100, 100, 200, 200]);
        assert_eq!(&output[4..], &[0, 0, 0, 0]);
        // Finished voice is retired after the callback.
        assert_eq!(slot.active_voices(), 0);
    }

    #[test]
    fn test_repeat_count_wraps_around() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[10, 20]);
        control.play(Repeat::Count(1));

        let mut output = [0i16; 12];
        slot.mix_i16(&mut output);
        assert_eq!(&output[..8], &[10, 10, 20, 20, 10, 10, 20, 20]);
        assert_eq!(&output[8..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_forever_repeat_keeps_playing() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[7]);
        control.play(Repeat::Forever);

        let mut output = [0i16; 16];
        slot.mix_i16(&mut output);
        assert!(output.iter().all(|&s| s == 7));
        assert_eq!(slot.active_voices(), 1);
    }

    #[test]
    fn test_stop_retires_voice() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[7]);
        control.play(Repeat::Forever);
        control.stop();

        let mut output = [55i16; 8];
        slot.mix_i16(&mut output);
        assert_eq!(output, [0i16; 8]);
        assert_eq!(slot.active_voices(), 0);

        // stop() is idempotent and playback still works afterwards.
        control.stop();
        control.play(Repeat::Count(0));
        let mut output = [0i16; 2];
        slot.mix_i16(&mut output);
        assert_eq!(output, [7, 7]);
    }

    #[test]
    fn test_volume_scales_samples() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[1_000]);
        control.set_volume(0.5);
        control.play(Repeat::Count(0));

        let mut output = [0i16; 2];
        slot.mix_i16(&mut output);
        assert_eq!(output, [500, 500]);
    }

    #[test]
    fn test_concurrent_voices_mix_and_saturate() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[i16::MAX]);
        control.play(Repeat::Count(0));
        let other = handle(&slot, &[i16::MAX]);
        other.play(Repeat::Count(0));

        let mut output = [0i16; 2];
        slot.mix_i16(&mut output);
        assert_eq!(output, [i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_swap_frames_affects_next_play_only() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[1, 2, 3, 4]);
        control.play(Repeat::Count(0));
        control.swap_frames(frames(&[9, 9, 9, 9]));

        // The in-flight voice keeps its original frames.
        let mut output = [0i16; 4];
        slot.mix_i16(&mut output);
        assert_eq!(output, [1, 1, 2, 2]);

        control.play(Repeat::Count(0));
        let mut output = [0i16; 4];
        slot.mix_i16(&mut output);
        // Old voice continues while the new one starts on swapped frames.
        assert_eq!(output, [3 + 9, 3 + 9, 4 + 9, 4 + 9]);
    }

    #[test]
    fn test_f32_output_is_rescaled() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[16_384]);
        control.play(Repeat::Count(0));

        let mut output = [0.0f32; 2];
        slot.mix_f32(&mut output);
        assert!((output[0] - 0.5).abs() < 1e-3);
        assert_eq!(output[0], output[1]);
    }

    #[test]
    fn test_empty_buffer_voice_is_retired_immediately() {
        let slot = Arc::new(VoiceSlot::new(44_100));
        let control = handle(&slot, &[]);
        control.play(Repeat::Forever);

        let mut output = [9i16; 4];
        slot.mix_i16(&mut output);
        assert_eq!(output, [0i16; 4]);
        assert_eq!(slot.active_voices(), 0);
    }

    #[test]
    fn test_playback_time_tracks_frame_clock() {
        let slot = Arc::new(VoiceSlot::new(1_000));
        let mut output = [0i16; 500];
        slot.mix_i16(&mut output);
        assert_eq!(slot.frame_count(), 250);
        assert!((slot.playback_time() - 0.25).abs() < 1e-9);
    }
}
