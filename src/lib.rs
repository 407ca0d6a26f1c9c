// rollsynth - playback core for a piano-roll sequencer

pub mod audio;
pub mod effects;
pub mod error;
pub mod messaging;
pub mod project;
pub mod sequencer;
pub mod session;
pub mod synth;

// Re-export commonly used types for convenience
pub use audio::{AudioExporter, ExportSettings, LiveHost, OfflineRenderer, RenderedBuffer, SampleClock};
pub use effects::{EffectChain, EffectDescriptor, EffectKind, EffectUnit};
pub use error::EngineError;
pub use project::{EventKind, InstrumentKind, NoteEvent, Project, Track};
pub use sequencer::{LookaheadScheduler, Tempo, TimeSignature, Transport};
pub use session::PlaybackSession;
pub use synth::{NoteTrigger, VoiceEngine, VoiceId, midi_to_frequency};
