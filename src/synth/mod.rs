// Synthesis voice engine

pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod voice;
pub mod voice_engine;

pub use oscillator::midi_to_frequency;
pub use voice::{NoteTrigger, Voice};
pub use voice_engine::{VoiceEngine, VoiceId};
