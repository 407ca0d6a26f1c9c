// Master bus - gain stage into the limiter
//
// All voices sum into this bus in both hosts. The master volume is shared
// through an AtomicF32 and smoothed over 10 ms before being applied.

use crate::audio::dsp_utils::{OnePoleSmoother, flush_denormals_to_zero};
use crate::audio::limiter::Limiter;
use crate::audio::parameters::AtomicF32;

/// Default master gain.
pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;

pub struct MasterBus {
    volume: AtomicF32,
    smoother: OnePoleSmoother,
    limiter: Limiter,
}

impl MasterBus {
    pub fn new(sample_rate: f32, volume: AtomicF32) -> Self {
        let initial = volume.get();
        Self {
            volume,
            smoother: OnePoleSmoother::new(initial, 10.0, sample_rate),
            limiter: Limiter::new(sample_rate),
        }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.smoother.process(self.volume.get().clamp(0.0, 1.0));
        let (left, right) = self.limiter.process(left * gain, right * gain);
        (
            flush_denormals_to_zero(left),
            flush_denormals_to_zero(right),
        )
    }
}
