// Commands consumed by the audio callback

use crate::synth::NoteTrigger;

/// One-way messages into the rendering domain. Producers are the transport
/// thread and the session (for auditions); the audio callback drains them.
#[derive(Debug, Clone)]
pub enum Command {
    /// Start a voice at the trigger's absolute clock time.
    Trigger(NoteTrigger),
    /// Tear down all sounding voices.
    StopAll,
}
