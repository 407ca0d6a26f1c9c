// Audio graph hosts and master section

pub mod clock;
pub mod dsp_utils;
pub mod export;
pub mod host;
pub mod limiter;
pub mod master;
pub mod offline;
pub mod parameters;

pub use clock::SampleClock;
pub use export::{AudioExporter, ExportSettings};
pub use host::LiveHost;
pub use master::MasterBus;
pub use offline::{OfflineRenderer, RenderedBuffer};
pub use parameters::AtomicF32;
