// Playback session - the explicit context object
//
// Owns the project, the live host and the transport actor. Nothing here is
// global: every handle (clock, master volume, command channel) hangs off
// this struct. Audio init happens once per session; repeated calls are
// no-ops.

use std::sync::{Arc, Mutex};

use ringbuf::traits::Producer;

use crate::audio::host::LiveHost;
use crate::audio::offline::{OfflineRenderer, RenderedBuffer};
use crate::error::EngineError;
use crate::messaging::{Command, CommandProducer, create_command_channel};
use crate::project::Project;
use crate::sequencer::transport::Transport;
use crate::synth::NoteTrigger;

const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Audition note length in beats.
const AUDITION_BEATS: f64 = 0.5;

struct AudioRuntime {
    host: LiveHost,
    transport: Transport,
    command_tx: Arc<Mutex<CommandProducer>>,
}

pub struct PlaybackSession {
    project: Project,
    runtime: Option<AudioRuntime>,
}

impl PlaybackSession {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            runtime: None,
        }
    }

    /// Open the output device and spawn the transport. Idempotent: a
    /// second call returns Ok without touching the existing stream.
    pub fn init_audio(&mut self) -> Result<(), EngineError> {
        if self.runtime.is_some() {
            return Ok(());
        }

        let (command_tx, command_rx) = create_command_channel(COMMAND_CHANNEL_CAPACITY);
        let host = LiveHost::new(command_rx)?;
        host.master_volume()
            .set(self.project.master_volume.clamp(0.0, 1.0));

        let command_tx = Arc::new(Mutex::new(command_tx));
        let transport = Transport::spawn(host.clock(), Arc::clone(&command_tx));

        self.runtime = Some(AudioRuntime {
            host,
            transport,
            command_tx,
        });
        Ok(())
    }

    /// Resume the host and start the scheduler on a snapshot of the
    /// current project.
    pub fn play(&mut self) -> Result<(), EngineError> {
        let runtime = self.runtime.as_ref().ok_or(EngineError::AudioNotInitialized)?;
        runtime.host.resume();
        runtime.transport.play(self.project.clone());
        Ok(())
    }

    /// Halt scheduling and tear down sounding voices. Safe to call twice
    /// or before play.
    pub fn stop(&mut self) {
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.transport.stop();
        }
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.project.set_bpm(bpm);
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.transport.set_bpm(bpm);
        }
    }

    /// Move the playhead to a beat position.
    pub fn set_time(&mut self, beat: f64) {
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.transport.set_position(beat);
        }
    }

    pub fn rewind(&mut self) {
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.transport.rewind();
        }
    }

    /// Playhead position in sixteenths.
    pub fn playhead_sixteenth(&self) -> u64 {
        self.runtime
            .as_ref()
            .map(|r| r.transport.playhead_sixteenth())
            .unwrap_or(0)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.project.set_master_volume(volume);
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.host.master_volume().set(self.project.master_volume);
        }
    }

    /// Play one note immediately (virtual keyboard path). Uses the first
    /// track's instrument and effects when one exists.
    pub fn audition(&mut self, pitch: u8, velocity: u8) -> Result<(), EngineError> {
        let runtime = self.runtime.as_ref().ok_or(EngineError::AudioNotInitialized)?;
        runtime.host.resume();

        let tempo = self.project.tempo();
        let (instrument, volume, effects) = match self.project.tracks.first() {
            Some(track) => (track.instrument, track.volume, track.effects.clone()),
            None => (Default::default(), 1.0, Vec::new()),
        };

        let trigger = NoteTrigger {
            pitch: pitch.min(127),
            velocity: velocity.min(127),
            start_time: runtime.host.clock().seconds(),
            duration: tempo.beats_to_seconds(AUDITION_BEATS),
            instrument,
            track_volume: volume,
            effects,
        };

        if let Ok(mut tx) = runtime.command_tx.lock() {
            let _ = tx.try_push(Command::Trigger(trigger));
        }
        Ok(())
    }

    /// Offline render of the current project at 44.1 kHz.
    pub fn render(&self) -> RenderedBuffer {
        let sample_rate = self
            .runtime
            .as_ref()
            .map(|r| r.host.sample_rate() as u32)
            .unwrap_or(44100);
        OfflineRenderer::new(sample_rate).render(&self.project)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    /// Replace the project. Takes effect on the next play.
    pub fn load_project(&mut self, project: Project) {
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.transport.stop();
            runtime.host.master_volume().set(project.master_volume.clamp(0.0, 1.0));
        }
        self.project = project;
    }
}
