// Sample clock - the shared time base for scheduling and rendering
//
// The rendering domain (live callback or offline loop) is the only writer.
// Readers (transport thread, UI) convert the sample count to seconds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic audio clock counted in samples.
///
/// Cloning yields another handle to the same clock.
#[derive(Clone)]
pub struct SampleClock {
    samples: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            samples: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Current position in samples.
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Current position in seconds.
    #[inline]
    pub fn seconds(&self) -> f64 {
        self.samples() as f64 / self.sample_rate
    }

    /// Advance the clock. Only the rendering domain calls this.
    #[inline]
    pub fn advance(&self, n: u64) {
        self.samples.fetch_add(n, Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}
