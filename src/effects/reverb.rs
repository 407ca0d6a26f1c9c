// Convolution reverb against a generated decaying-noise impulse
//
// The impulse is 2 seconds of uniform noise shaped by (1 - t)^2, generated
// independently per channel. Convolving the full impulse would cost ~88k
// multiplies per sample per channel, so the tap set is decimated: taps are
// sampled uniformly across the impulse and the whole set is rescaled to
// unit energy (the same normalization a convolver node applies). The result
// keeps the dense decaying character at a real-time cost.

use rand::Rng;

use crate::effects::{EffectDescriptor, WetDry};

/// Impulse length in seconds.
pub const IMPULSE_SECS: f32 = 2.0;

/// Number of taps kept per channel after decimation.
pub const TAP_COUNT: usize = 512;

const DEFAULT_MIX: f32 = 0.3;

struct Tap {
    offset: usize,
    left: f32,
    right: f32,
}

pub struct Reverb {
    taps: Vec<Tap>,
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    mix: WetDry,
}

impl Reverb {
    pub fn new(mix: f32, sample_rate: f32) -> Self {
        let impulse_len = (IMPULSE_SECS * sample_rate) as usize;
        let stride = (impulse_len / TAP_COUNT).max(1);

        let mut rng = rand::thread_rng();
        let mut taps = Vec::with_capacity(TAP_COUNT);
        for k in 0..TAP_COUNT {
            let offset = k * stride;
            if offset >= impulse_len {
                break;
            }
            // (1 - t)^2 decay envelope over the impulse
            let t = offset as f32 / impulse_len as f32;
            let envelope = (1.0 - t) * (1.0 - t);
            taps.push(Tap {
                offset,
                left: rng.gen_range(-1.0..1.0) * envelope,
                right: rng.gen_range(-1.0..1.0) * envelope,
            });
        }

        // Normalize the tap set to unit energy so the wet level does not
        // depend on the tap count.
        let energy: f32 = taps
            .iter()
            .map(|tap| (tap.left * tap.left + tap.right * tap.right) * 0.5)
            .sum();
        if energy > 0.0 {
            let scale = 1.0 / energy.sqrt();
            for tap in &mut taps {
                tap.left *= scale;
                tap.right *= scale;
            }
        }

        let history = impulse_len.max(1);
        Self {
            taps,
            left: vec![0.0; history],
            right: vec![0.0; history],
            write_pos: 0,
            mix: WetDry::new(mix),
        }
    }

    pub fn from_descriptor(desc: &EffectDescriptor, sample_rate: f32) -> Self {
        Self::new(desc.param("mix", DEFAULT_MIX), sample_rate)
    }

    pub fn set_param(&mut self, name: &str, value: f32) {
        if name == "mix" {
            self.mix.set_mix(value);
        }
    }

    pub fn mix(&self) -> WetDry {
        self.mix
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let len = self.left.len();
        self.left[self.write_pos] = left;
        self.right[self.write_pos] = right;

        let mut wet_l = 0.0;
        let mut wet_r = 0.0;
        for tap in &self.taps {
            let read = if self.write_pos >= tap.offset {
                self.write_pos - tap.offset
            } else {
                len + self.write_pos - tap.offset
            };
            wet_l += self.left[read] * tap.left;
            wet_r += self.right[read] * tap.right;
        }

        self.write_pos = (self.write_pos + 1) % len;

        (self.mix.blend(left, wet_l), self.mix.blend(right, wet_r))
    }
}
