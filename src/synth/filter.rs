// Gliding lowpass filter
//
// One-pole lowpass whose cutoff starts at 400 + velocity * 20 Hz and glides
// exponentially down to a 200 Hz floor over the note duration. The glide
// gives each note its characteristic closing-filter pluck.

/// Cutoff floor the glide settles on.
pub const CUTOFF_FLOOR_HZ: f32 = 200.0;

pub struct GlideLowpass {
    cutoff: f32,
    glide_multiplier: f32,
    state: f32,
    sample_rate: f32,
}

impl GlideLowpass {
    pub fn new(velocity: u8, duration_secs: f64, sample_rate: f32) -> Self {
        let start = (400.0 + velocity.min(127) as f32 * 20.0).min(sample_rate * 0.45);
        let duration_samples = ((duration_secs * sample_rate as f64) as u64).max(1);
        // Exponential ramp start -> floor across the note duration
        let glide_multiplier =
            (CUTOFF_FLOOR_HZ / start).powf(1.0 / duration_samples as f32);

        Self {
            cutoff: start,
            glide_multiplier,
            state: 0.0,
            sample_rate,
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.cutoff = (self.cutoff * self.glide_multiplier).max(CUTOFF_FLOOR_HZ);

        let coefficient =
            1.0 - (-2.0 * std::f32::consts::PI * self.cutoff / self.sample_rate).exp();
        self.state += coefficient * (input - self.state);
        self.state
    }
}
