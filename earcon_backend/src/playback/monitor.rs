use std::sync::atomic::{AtomicU64, Ordering};

use quanta::{Clock, Instant as QuantaInstant};

/// Snapshot of mixer callback metrics for logging/telemetry (non-RT).
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    /// Total number of audio frames mixed since the monitor was created.
    pub frames_mixed: u64,
    /// Total number of callback invocations.
    pub callback_count: u64,
    /// Callbacks that emitted silence because the voice list was held.
    pub underrun_count: u64,
    /// Minimum callback duration observed (ns).
    pub min_callback_nanos: Option<u64>,
    /// Maximum callback duration observed (ns).
    pub max_callback_nanos: Option<u64>,
}

/// Real-time-safe callback monitor.
///
/// On the real-time path only the `add_*`/`note_*` methods and
/// `scoped_callback()` may be used; they touch atomics exclusively.
/// `snapshot()` reads the counters from a control thread.
pub struct CallbackMonitor {
    // high-resolution clock used on the RT path
    clock: Clock,
    frames_mixed: AtomicU64,
    callback_count: AtomicU64,
    underrun_count: AtomicU64,
    min_callback_nanos: AtomicU64,
    max_callback_nanos: AtomicU64,
}

impl CallbackMonitor {
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            frames_mixed: AtomicU64::new(0),
            callback_count: AtomicU64::new(0),
            underrun_count: AtomicU64::new(0),
            min_callback_nanos: AtomicU64::new(u64::MAX),
            max_callback_nanos: AtomicU64::new(0),
        }
    }

    /// Real-time safe (single atomic add).
    #[inline(always)]
    pub fn add_frames(&self, n: u64) {
        self.frames_mixed.fetch_add(n, Ordering::Relaxed);
    }

    /// Real-time safe.
    #[inline(always)]
    pub fn note_underrun(&self) {
        self.underrun_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a callback duration in nanoseconds. Real-time safe; updates
    /// min and max with compare-exchange loops.
    #[inline(always)]
    pub fn record_callback_nanos(&self, nanos: u64) {
        let mut prev_min = self.min_callback_nanos.load(Ordering::Relaxed);
        while nanos < prev_min {
            match self.min_callback_nanos.compare_exchange_weak(
                prev_min,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(found) => prev_min = found,
            }
        }

        let mut prev_max = self.max_callback_nanos.load(Ordering::Relaxed);
        while nanos > prev_max {
            match self.max_callback_nanos.compare_exchange_weak(
                prev_max,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(found) => prev_max = found,
            }
        }
    }

    /// Returns a guard that records the elapsed time between construction
    /// and drop, incrementing the callback count immediately.
    #[inline(always)]
    pub fn scoped_callback(&self) -> CallbackGuard<'_> {
        self.callback_count.fetch_add(1, Ordering::Relaxed);
        CallbackGuard {
            monitor: self,
            start: self.clock.now(),
        }
    }

    /// Not real-time safe; call from a control thread.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let min_raw = self.min_callback_nanos.load(Ordering::Relaxed);
        let max_raw = self.max_callback_nanos.load(Ordering::Relaxed);
        MonitorSnapshot {
            frames_mixed: self.frames_mixed.load(Ordering::Relaxed),
            callback_count: self.callback_count.load(Ordering::Relaxed),
            underrun_count: self.underrun_count.load(Ordering::Relaxed),
            min_callback_nanos: if min_raw == u64::MAX { None } else { Some(min_raw) },
            max_callback_nanos: if max_raw == 0 { None } else { Some(max_raw) },
        }
    }
}

impl Default for CallbackMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Records callback latency on drop. Real-time safe; `Drop` only touches
/// atomics on the monitor.
pub struct CallbackGuard<'a> {
    monitor: &'a CallbackMonitor,
    start: QuantaInstant,
}

impl Drop for CallbackGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.monitor.clock.now().saturating_duration_since(self.start);
        let nanos = elapsed.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.monitor.record_callback_nanos(nanos);
    }
}
