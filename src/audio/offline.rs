// Offline renderer
//
// Renders a project to a stereo buffer as fast as possible, with the exact
// voice, effect and master-bus code the live host uses. All notes are
// triggered up front at their absolute virtual-clock times, then the block
// loop pulls samples until the musical span plus a 2 second tail has been
// rendered.

use crate::audio::master::MasterBus;
use crate::audio::parameters::AtomicF32;
use crate::project::Project;
use crate::synth::{NoteTrigger, VoiceEngine};

/// Block size of the render loop, in samples.
pub const RENDER_BLOCK: usize = 512;

/// Tail appended past the last note end, in seconds.
pub const RENDER_TAIL_SECS: f64 = 2.0;

/// A finished stereo render.
pub struct RenderedBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl RenderedBuffer {
    /// Length in samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Interleaved 16-bit samples for encoders.
    pub fn interleaved_i16(&self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (l, r) in self.left.iter().zip(&self.right) {
            out.push((l.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
            out.push((r.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
        }
        out
    }

    /// Peak absolute sample value across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }
}

pub struct OfflineRenderer {
    sample_rate: u32,
}

impl OfflineRenderer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
        }
    }

    /// Render the audible tracks of a project. An empty project yields a
    /// silent tail-length buffer.
    pub fn render(&self, project: &Project) -> RenderedBuffer {
        let sample_rate = self.sample_rate as f64;
        let seconds_per_beat = project.tempo().seconds_per_beat();
        let span_secs = project.duration_beats() * seconds_per_beat + RENDER_TAIL_SECS;

        // Round up to whole render blocks
        let span_samples = (span_secs * sample_rate).ceil() as usize;
        let total_samples = span_samples.div_ceil(RENDER_BLOCK) * RENDER_BLOCK;

        let mut engine = VoiceEngine::new(self.sample_rate as f32);
        let any_solo = project.any_solo();
        for track in project.tracks.iter().filter(|t| t.is_audible(any_solo)) {
            for event in track.events.iter().filter(|e| e.is_note()) {
                engine.trigger(&NoteTrigger {
                    pitch: event.pitch,
                    velocity: event.velocity,
                    start_time: event.start * seconds_per_beat,
                    duration: event.duration * seconds_per_beat,
                    instrument: track.instrument,
                    track_volume: track.volume,
                    effects: track.effects.clone(),
                });
            }
        }
        log::info!(
            "offline render: {:.2}s ({} samples), {} voices",
            total_samples as f64 / sample_rate,
            total_samples,
            engine.active_voices()
        );

        let volume = AtomicF32::new(project.master_volume.clamp(0.0, 1.0));
        let mut master = MasterBus::new(self.sample_rate as f32, volume);

        let mut left = Vec::with_capacity(total_samples);
        let mut right = Vec::with_capacity(total_samples);
        let mut clock: u64 = 0;
        while (clock as usize) < total_samples {
            let block = RENDER_BLOCK.min(total_samples - clock as usize);
            for _ in 0..block {
                let (l, r) = engine.process(clock);
                let (l, r) = master.process(l, r);
                left.push(l);
                right.push(r);
                clock += 1;
            }
        }

        RenderedBuffer {
            left,
            right,
            sample_rate: self.sample_rate,
        }
    }
}
