// Transport scheduling

pub mod scheduler;
pub mod timeline;
pub mod transport;

pub use scheduler::{LOOKAHEAD_TICK_MS, LookaheadScheduler, SCHEDULE_AHEAD_SECS, SIXTEENTH_BEATS};
pub use timeline::{Tempo, TimeSignature};
pub use transport::Transport;
