// Master limiter
//
// Feed-forward peak limiter with a wide soft knee: threshold -1 dBFS,
// knee 40 dB, ratio 12:1, attack 5 ms, release 250 ms. The wide knee makes
// it behave more like a gentle mastering compressor than a brickwall; the
// master bus relies on it to keep dense mixes out of hard clipping.

use crate::audio::dsp_utils::{db_to_linear, linear_to_db};

const THRESHOLD_DB: f32 = -1.0;
const KNEE_DB: f32 = 40.0;
const RATIO: f32 = 12.0;
const ATTACK_SECS: f32 = 0.005;
const RELEASE_SECS: f32 = 0.25;

pub struct Limiter {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl Limiter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            attack_coeff: 1.0 - (-1.0 / (ATTACK_SECS * sample_rate)).exp(),
            release_coeff: 1.0 - (-1.0 / (RELEASE_SECS * sample_rate)).exp(),
            envelope: 0.0,
        }
    }

    /// Gain computer: input level in dB to output level in dB, soft knee.
    #[inline]
    fn computed_level_db(level_db: f32) -> f32 {
        let overshoot = level_db - THRESHOLD_DB;
        if overshoot <= -KNEE_DB / 2.0 {
            level_db
        } else if overshoot < KNEE_DB / 2.0 {
            let half = overshoot + KNEE_DB / 2.0;
            level_db + (1.0 / RATIO - 1.0) * half * half / (2.0 * KNEE_DB)
        } else {
            THRESHOLD_DB + overshoot / RATIO
        }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        // Stereo-linked peak detector
        let level = left.abs().max(right.abs());
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += coeff * (level - self.envelope);

        let level_db = linear_to_db(self.envelope.max(1e-6));
        let gain = db_to_linear(Self::computed_level_db(level_db) - level_db);

        (left * gain, right * gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_passes_unchanged() {
        let mut limiter = Limiter::new(44100.0);
        // -40 dB sits below the knee entirely
        let x = db_to_linear(-40.0);
        let mut y = 0.0;
        for _ in 0..44100 {
            (y, _) = limiter.process(x, x);
        }
        assert!((y - x).abs() / x < 0.05, "in {} out {}", x, y);
    }

    #[test]
    fn test_loud_signal_is_reduced() {
        let mut limiter = Limiter::new(44100.0);
        let mut y = 0.0;
        for _ in 0..44100 {
            (y, _) = limiter.process(2.0, 2.0);
        }
        assert!(y < 2.0 * 0.8, "expected gain reduction, got {}", y);
    }

    #[test]
    fn test_steady_state_peak_near_threshold() {
        let mut limiter = Limiter::new(44100.0);
        // A sustained full-scale input should settle close to -1 dBFS
        // compressed at 12:1 above the knee center.
        let mut y = 0.0;
        for _ in 0..88200 {
            (y, _) = limiter.process(1.0, 1.0);
        }
        assert!(y <= 1.0);
        assert!(y > db_to_linear(-6.0), "over-compressed: {}", y);
    }

    #[test]
    fn test_stereo_link_preserves_balance() {
        let mut limiter = Limiter::new(44100.0);
        let mut out = (0.0, 0.0);
        for _ in 0..44100 {
            out = limiter.process(1.5, 0.75);
        }
        // Both channels get the same gain, so the 2:1 ratio holds
        assert!((out.0 / out.1 - 2.0).abs() < 0.01);
    }
}
