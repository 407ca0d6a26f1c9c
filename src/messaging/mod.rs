// Lock-free command plumbing between the control side and the audio callback

pub mod channels;
pub mod command;

pub use channels::{CommandConsumer, CommandProducer, create_command_channel};
pub use command::Command;
