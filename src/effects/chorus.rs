// Stereo chorus
//
// Two delay lines around a 30 ms base delay, modulated by one shared sine
// LFO. The right channel applies the depth with inverted sign, which widens
// the stereo image. Delay reads use linear interpolation for fractional
// positions.

use crate::effects::{EffectDescriptor, WetDry};

/// Center delay of both lines in seconds.
pub const BASE_DELAY_SECS: f32 = 0.03;

/// Largest supported modulation depth in seconds.
pub const MAX_DEPTH_SECS: f32 = 0.025;

const DEFAULT_RATE: f32 = 1.5;
const DEFAULT_DEPTH: f32 = 0.002;
const DEFAULT_MIX: f32 = 0.5;

pub struct Chorus {
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    lfo_phase: f32,
    rate: f32,
    depth: f32,
    mix: WetDry,
    sample_rate: f32,
}

impl Chorus {
    pub fn new(rate: f32, depth: f32, mix: f32, sample_rate: f32) -> Self {
        // Room for base delay plus maximum depth in both directions.
        let capacity = ((BASE_DELAY_SECS + MAX_DEPTH_SECS) * sample_rate) as usize + 2;
        Self {
            left: vec![0.0; capacity],
            right: vec![0.0; capacity],
            write_pos: 0,
            lfo_phase: 0.0,
            rate: rate.clamp(0.01, 20.0),
            depth: depth.clamp(0.0, MAX_DEPTH_SECS),
            mix: WetDry::new(mix),
            sample_rate,
        }
    }

    pub fn from_descriptor(desc: &EffectDescriptor, sample_rate: f32) -> Self {
        Self::new(
            desc.param("rate", DEFAULT_RATE),
            desc.param("depth", DEFAULT_DEPTH),
            desc.param("mix", DEFAULT_MIX),
            sample_rate,
        )
    }

    pub fn set_param(&mut self, name: &str, value: f32) {
        match name {
            "rate" => self.rate = value.clamp(0.01, 20.0),
            "depth" => self.depth = value.clamp(0.0, MAX_DEPTH_SECS),
            "mix" => self.mix.set_mix(value),
            _ => {}
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn mix(&self) -> WetDry {
        self.mix
    }

    /// Read a buffer at a fractional delay behind the write position.
    #[inline]
    fn read_interpolated(buffer: &[f32], write_pos: usize, delay_samples: f32) -> f32 {
        let len = buffer.len();
        let delay = delay_samples.clamp(1.0, (len - 2) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let idx0 = (write_pos + len - whole) % len;
        let idx1 = (idx0 + len - 1) % len;
        buffer[idx0] * (1.0 - frac) + buffer[idx1] * frac
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.left[self.write_pos] = left;
        self.right[self.write_pos] = right;

        let lfo = (2.0 * std::f32::consts::PI * self.lfo_phase).sin();
        let delay_l = (BASE_DELAY_SECS + self.depth * lfo) * self.sample_rate;
        let delay_r = (BASE_DELAY_SECS - self.depth * lfo) * self.sample_rate;

        let wet_l = Self::read_interpolated(&self.left, self.write_pos, delay_l);
        let wet_r = Self::read_interpolated(&self.right, self.write_pos, delay_r);

        self.write_pos = (self.write_pos + 1) % self.left.len();
        self.lfo_phase += self.rate / self.sample_rate;
        if self.lfo_phase >= 1.0 {
            self.lfo_phase -= 1.0;
        }

        (self.mix.blend(left, wet_l), self.mix.blend(right, wet_r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;

    #[test]
    fn test_params_clamped() {
        let chorus = Chorus::new(100.0, 1.0, 0.5, 44100.0);
        assert_eq!(chorus.rate(), 20.0);
        assert_eq!(chorus.depth(), MAX_DEPTH_SECS);
    }

    #[test]
    fn test_wet_signal_is_delayed() {
        let sample_rate = 44100.0;
        // Zero depth pins both lines at the base delay.
        let mut chorus = Chorus::new(1.5, 0.0, 1.0, sample_rate);
        let base_samples = (BASE_DELAY_SECS * sample_rate) as usize;

        chorus.process(1.0, 1.0);
        let mut peak_at = 0;
        let mut peak = 0.0_f32;
        for i in 1..base_samples + 10 {
            let (l, _) = chorus.process(0.0, 0.0);
            if l.abs() > peak {
                peak = l.abs();
                peak_at = i;
            }
        }

        assert!(peak > 0.5);
        assert!(
            (peak_at as i64 - base_samples as i64).abs() <= 1,
            "peak at {}, expected near {}",
            peak_at,
            base_samples
        );
    }

    #[test]
    fn test_output_stays_finite() {
        let mut chorus = Chorus::new(5.0, 0.01, 0.5, 44100.0);
        for i in 0..44100 {
            let x = (i as f32 * 0.01).sin();
            let (l, r) = chorus.process(x, x);
            assert!(l.is_finite() && r.is_finite());
            assert!(l.abs() < 4.0 && r.abs() < 4.0);
        }
    }

    #[test]
    fn test_descriptor_defaults() {
        let chorus = Chorus::from_descriptor(&EffectDescriptor::new(EffectKind::Chorus), 44100.0);
        assert_eq!(chorus.rate(), DEFAULT_RATE);
        assert_eq!(chorus.depth(), DEFAULT_DEPTH);
        assert!((chorus.mix().wet() - 0.5).abs() < 1e-6);
    }
}
