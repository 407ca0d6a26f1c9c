// Note amplitude envelope
//
// Shape per note: silence, a 10 ms linear attack up to velocity / 127,
// then an exponential decay that reaches the 0.001 floor at
// note duration + 0.1 s after the attack peak. Past the floor the envelope
// reports itself finished.

/// Attack length in seconds.
pub const ATTACK_SECS: f32 = 0.01;

/// Decay tail past the nominal note end, in seconds.
pub const RELEASE_TAIL_SECS: f64 = 0.1;

/// Exponential decay target; below this the envelope is done.
pub const FLOOR: f32 = 0.001;

pub struct NoteEnvelope {
    peak: f32,
    attack_samples: u64,
    total_samples: u64,
    decay_multiplier: f32,
    level: f32,
    position: u64,
}

impl NoteEnvelope {
    pub fn new(velocity: u8, duration_secs: f64, sample_rate: f32) -> Self {
        let peak = velocity.min(127) as f32 / 127.0;
        let attack_samples = (ATTACK_SECS * sample_rate) as u64;
        let total_samples =
            ((duration_secs + RELEASE_TAIL_SECS) * sample_rate as f64) as u64;

        // Per-sample multiplier m with peak * m^n = FLOOR over the decay span.
        let decay_samples = total_samples.saturating_sub(attack_samples).max(1);
        let ratio = (FLOOR / peak.max(FLOOR)).min(1.0);
        let decay_multiplier = ratio.powf(1.0 / decay_samples as f32);

        Self {
            peak,
            attack_samples,
            total_samples,
            decay_multiplier,
            level: peak,
            position: 0,
        }
    }

    /// Amplitude for the current sample, then advance.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.position >= self.total_samples {
            self.position += 1;
            return 0.0;
        }

        let value = if self.position < self.attack_samples {
            self.peak * self.position as f32 / self.attack_samples as f32
        } else {
            self.level *= self.decay_multiplier;
            self.level
        };

        self.position += 1;
        value
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.total_samples
    }
}
