// Oscillator - phase accumulator with four classic waveforms

use crate::project::InstrumentKind;

/// Equal-tempered frequency of a MIDI pitch: 440 * 2^((pitch - 69) / 12).
#[inline]
pub fn midi_to_frequency(pitch: u8) -> f32 {
    440.0 * 2.0_f32.powf((pitch as f32 - 69.0) / 12.0)
}

pub struct Oscillator {
    waveform: InstrumentKind,
    phase: f32,
    phase_increment: f32,
}

impl Oscillator {
    pub fn new(waveform: InstrumentKind, frequency: f32, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            phase_increment: frequency / sample_rate,
        }
    }

    pub fn frequency(&self, sample_rate: f32) -> f32 {
        self.phase_increment * sample_rate
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let sample = match self.waveform {
            InstrumentKind::Sine => (2.0 * std::f32::consts::PI * self.phase).sin(),
            InstrumentKind::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            InstrumentKind::Saw => 2.0 * self.phase - 1.0,
            InstrumentKind::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_to_frequency_reference_points() {
        assert!((midi_to_frequency(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_frequency(81) - 880.0).abs() < 1e-3);
        assert!((midi_to_frequency(57) - 220.0).abs() < 1e-3);
        // Middle C
        assert!((midi_to_frequency(60) - 261.626).abs() < 0.01);
    }

    #[test]
    fn test_oscillator_output_in_range() {
        for waveform in [
            InstrumentKind::Sine,
            InstrumentKind::Square,
            InstrumentKind::Saw,
            InstrumentKind::Triangle,
        ] {
            let mut osc = Oscillator::new(waveform, 440.0, 44100.0);
            for _ in 0..1000 {
                let s = osc.next_sample();
                assert!((-1.0..=1.0).contains(&s), "{:?} produced {}", waveform, s);
            }
        }
    }

    #[test]
    fn test_sine_period_matches_frequency() {
        let sample_rate = 44100.0;
        let freq = 441.0; // exactly 100 samples per period
        let mut osc = Oscillator::new(InstrumentKind::Sine, freq, sample_rate);

        let first = osc.next_sample();
        for _ in 0..99 {
            osc.next_sample();
        }
        let after_period = osc.next_sample();
        assert!((first - after_period).abs() < 1e-3);
    }
}
