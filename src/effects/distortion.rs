// Waveshaper distortion
//
// Transfer curve sampled over 44100 points in [-1, 1]:
//
//   f(x) = (3 + k) * x * 20 * (pi / 180) / (pi + k * |x|)
//
// where k is the drive amount. Shaping runs at 4x oversampling: the input
// is linearly interpolated between consecutive samples, shaped at the
// sub-positions, and averaged back down.

use crate::effects::{EffectDescriptor, WetDry};

/// Number of points in the transfer curve.
pub const CURVE_POINTS: usize = 44100;

/// Drive range.
pub const MAX_DRIVE: f32 = 400.0;

const OVERSAMPLE: usize = 4;
const DEFAULT_DRIVE: f32 = 50.0;
const DEFAULT_MIX: f32 = 1.0;

pub struct Distortion {
    curve: Vec<f32>,
    drive: f32,
    mix: WetDry,
    prev_l: f32,
    prev_r: f32,
}

impl Distortion {
    pub fn new(drive: f32, mix: f32) -> Self {
        let drive = drive.clamp(0.0, MAX_DRIVE);
        Self {
            curve: Self::make_curve(drive),
            drive,
            mix: WetDry::new(mix),
            prev_l: 0.0,
            prev_r: 0.0,
        }
    }

    pub fn from_descriptor(desc: &EffectDescriptor, _sample_rate: f32) -> Self {
        Self::new(
            desc.param("drive", DEFAULT_DRIVE),
            desc.param("mix", DEFAULT_MIX),
        )
    }

    fn make_curve(drive: f32) -> Vec<f32> {
        let deg = 20.0 * std::f32::consts::PI / 180.0;
        (0..CURVE_POINTS)
            .map(|i| {
                let x = i as f32 * 2.0 / (CURVE_POINTS - 1) as f32 - 1.0;
                (3.0 + drive) * x * deg / (std::f32::consts::PI + drive * x.abs())
            })
            .collect()
    }

    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.clamp(0.0, MAX_DRIVE);
        self.curve = Self::make_curve(self.drive);
    }

    pub fn set_param(&mut self, name: &str, value: f32) {
        match name {
            "drive" => self.set_drive(value),
            "mix" => self.mix.set_mix(value),
            _ => {}
        }
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn mix(&self) -> WetDry {
        self.mix
    }

    /// Look up the transfer curve with linear interpolation.
    #[inline]
    fn shape(&self, x: f32) -> f32 {
        let x = x.clamp(-1.0, 1.0);
        let pos = (x + 1.0) * 0.5 * (CURVE_POINTS - 1) as f32;
        let idx = pos as usize;
        let frac = pos - idx as f32;
        if idx + 1 < CURVE_POINTS {
            self.curve[idx] * (1.0 - frac) + self.curve[idx + 1] * frac
        } else {
            self.curve[CURVE_POINTS - 1]
        }
    }

    /// Shape one channel at 4x oversampling.
    #[inline]
    fn shape_oversampled(&self, prev: f32, x: f32) -> f32 {
        let mut acc = 0.0;
        for k in 1..=OVERSAMPLE {
            let xi = prev + (x - prev) * (k as f32 / OVERSAMPLE as f32);
            acc += self.shape(xi);
        }
        acc / OVERSAMPLE as f32
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let wet_l = self.shape_oversampled(self.prev_l, left);
        let wet_r = self.shape_oversampled(self.prev_r, right);
        self.prev_l = left;
        self.prev_r = right;
        (
            self.mix.blend(left, wet_l),
            self.mix.blend(right, wet_r),
        )
    }
}
