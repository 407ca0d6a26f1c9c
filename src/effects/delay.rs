// Stereo feedback delay
//
// Circular-buffer delay line per channel. The buffer is sized for the
// maximum delay time at creation, so changing the time never reallocates.

use crate::effects::{EffectDescriptor, WetDry};

/// Longest supported delay time in seconds (buffer size).
pub const MAX_DELAY_SECS: f32 = 5.0;

/// Feedback is kept strictly below unity to avoid runaway build-up.
pub const MAX_FEEDBACK: f32 = 0.949;

const DEFAULT_TIME: f32 = 0.4;
const DEFAULT_FEEDBACK: f32 = 0.3;
const DEFAULT_MIX: f32 = 0.5;

pub struct Delay {
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    feedback: f32,
    mix: WetDry,
    sample_rate: f32,
}

impl Delay {
    pub fn new(time_secs: f32, feedback: f32, mix: f32, sample_rate: f32) -> Self {
        let capacity = (MAX_DELAY_SECS * sample_rate) as usize + 1;
        let mut delay = Self {
            left: vec![0.0; capacity],
            right: vec![0.0; capacity],
            write_pos: 0,
            delay_samples: 1,
            feedback: 0.0,
            mix: WetDry::new(mix),
            sample_rate,
        };
        delay.set_time(time_secs);
        delay.set_feedback(feedback);
        delay
    }

    pub fn from_descriptor(desc: &EffectDescriptor, sample_rate: f32) -> Self {
        Self::new(
            desc.param("time", DEFAULT_TIME),
            desc.param("feedback", DEFAULT_FEEDBACK),
            desc.param("mix", DEFAULT_MIX),
            sample_rate,
        )
    }

    /// Delay time in (0, MAX_DELAY_SECS]. Values outside are clamped.
    pub fn set_time(&mut self, time_secs: f32) {
        let time = time_secs.clamp(1.0 / self.sample_rate, MAX_DELAY_SECS);
        self.delay_samples = ((time * self.sample_rate) as usize)
            .clamp(1, self.left.len() - 1);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn set_param(&mut self, name: &str, value: f32) {
        match name {
            "time" => self.set_time(value),
            "feedback" => self.set_feedback(value),
            "mix" => self.mix.set_mix(value),
            _ => {}
        }
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn mix(&self) -> WetDry {
        self.mix
    }

    #[inline]
    fn read_pos(&self) -> usize {
        if self.write_pos >= self.delay_samples {
            self.write_pos - self.delay_samples
        } else {
            self.left.len() + self.write_pos - self.delay_samples
        }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let read_pos = self.read_pos();
        let delayed_l = self.left[read_pos];
        let delayed_r = self.right[read_pos];

        // Feed input plus the delayed signal back into the line, with a
        // clamp to keep high feedback settings bounded.
        self.left[self.write_pos] = (left + self.feedback * delayed_l).clamp(-2.0, 2.0);
        self.right[self.write_pos] = (right + self.feedback * delayed_r).clamp(-2.0, 2.0);
        self.write_pos = (self.write_pos + 1) % self.left.len();

        (
            self.mix.blend(left, delayed_l),
            self.mix.blend(right, delayed_r),
        )
    }
}
