// Voice - one sounding note and its private effect subgraph
//
// Signal path: oscillator -> gliding lowpass -> envelope -> effect chain
// -> track gain. A voice is created from a NoteTrigger with absolute
// audio-clock times and lives until a guard band of 0.2 s past the note
// end, which leaves room for the envelope tail.

use crate::effects::{EffectChain, EffectDescriptor};
use crate::project::InstrumentKind;
use crate::synth::envelope::NoteEnvelope;
use crate::synth::filter::GlideLowpass;
use crate::synth::oscillator::{Oscillator, midi_to_frequency};

/// Oscillator guard band past the nominal note end, in seconds.
pub const STOP_GUARD_SECS: f64 = 0.2;

/// Everything needed to start one note at an absolute time.
#[derive(Debug, Clone)]
pub struct NoteTrigger {
    pub pitch: u8,
    pub velocity: u8,
    /// Absolute start time on the audio clock, in seconds.
    pub start_time: f64,
    /// Note length in seconds.
    pub duration: f64,
    pub instrument: InstrumentKind,
    pub track_volume: f32,
    pub effects: Vec<EffectDescriptor>,
}

pub struct Voice {
    oscillator: Oscillator,
    filter: GlideLowpass,
    envelope: NoteEnvelope,
    chain: EffectChain,
    gain: f32,
    start_sample: u64,
    stop_sample: u64,
}

impl Voice {
    pub fn new(trigger: &NoteTrigger, sample_rate: f32) -> Self {
        let frequency = midi_to_frequency(trigger.pitch);
        let start_sample = (trigger.start_time.max(0.0) * sample_rate as f64) as u64;
        let stop_sample = start_sample
            + ((trigger.duration + STOP_GUARD_SECS) * sample_rate as f64) as u64;

        Self {
            oscillator: Oscillator::new(trigger.instrument, frequency, sample_rate),
            filter: GlideLowpass::new(trigger.velocity, trigger.duration, sample_rate),
            envelope: NoteEnvelope::new(trigger.velocity, trigger.duration, sample_rate),
            chain: EffectChain::build(&trigger.effects, sample_rate),
            gain: trigger.track_volume.clamp(0.0, 1.0),
            start_sample,
            stop_sample,
        }
    }

    /// Render one stereo sample at the given absolute clock position.
    /// Before the start time the voice is silent and its state is frozen.
    #[inline]
    pub fn process(&mut self, clock: u64) -> (f32, f32) {
        if clock < self.start_sample || clock >= self.stop_sample {
            return (0.0, 0.0);
        }

        let raw = self.oscillator.next_sample();
        let filtered = self.filter.process(raw);
        let shaped = filtered * self.envelope.next();
        let (left, right) = self.chain.process(shaped, shaped);
        (left * self.gain, right * self.gain)
    }

    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    /// Done once the clock passes the guard band.
    pub fn is_finished(&self, clock: u64) -> bool {
        clock >= self.stop_sample
    }
}
