// Voice engine - the arena of sounding voices
//
// Voices are owned by the engine, keyed by a VoiceId token, and removed
// synchronously: either when the clock passes their guard band or when
// stop_all tears everything down. Live and offline hosts drive the same
// engine.

use crate::synth::voice::{NoteTrigger, Voice};

/// Token identifying an active voice in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

pub struct VoiceEngine {
    sample_rate: f32,
    voices: Vec<(VoiceId, Voice)>,
    next_id: u64,
}

impl VoiceEngine {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: Vec::with_capacity(64),
            next_id: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Instantiate a voice for the trigger and register it in the arena.
    pub fn trigger(&mut self, trigger: &NoteTrigger) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push((id, Voice::new(trigger, self.sample_rate)));
        id
    }

    /// Tear down every voice immediately. Idempotent; effect tails are
    /// truncated along with their voices.
    pub fn stop_all(&mut self) {
        self.voices.clear();
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn is_active(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|(vid, _)| *vid == id)
    }

    /// Sum all voices for one stereo sample at the given clock position,
    /// then drop the voices that finished.
    #[inline]
    pub fn process(&mut self, clock: u64) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for (_, voice) in &mut self.voices {
            let (l, r) = voice.process(clock);
            left += l;
            right += r;
        }
        self.voices.retain(|(_, voice)| !voice.is_finished(clock));
        (left, right)
    }
}
