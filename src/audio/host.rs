// Live audio host - cpal output stream
//
// # Format support
//
// The stream is built for the device's preferred sample format (F32, I16 or
// U16). All processing happens in f32; conversion to the device format goes
// through cpal's `FromSample` at the moment samples are written into the
// output buffer.
//
// # Suspended start
//
// The host starts suspended: the cpal stream runs, commands are drained,
// but the output is silence and the sample clock is frozen. Voices
// triggered while suspended are registered with their absolute start times
// and begin sounding once `resume` lets the clock move. `resume` and
// `suspend` are idempotent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Consumer;

use crate::audio::clock::SampleClock;
use crate::audio::master::{DEFAULT_MASTER_VOLUME, MasterBus};
use crate::audio::parameters::AtomicF32;
use crate::error::EngineError;
use crate::messaging::{Command, CommandConsumer};
use crate::synth::VoiceEngine;

pub struct LiveHost {
    _device: Device,
    _stream: Stream,
    clock: SampleClock,
    master_volume: AtomicF32,
    running: Arc<AtomicBool>,
    sample_rate: f32,
}

impl LiveHost {
    pub fn new(command_rx: CommandConsumer) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        log::info!(
            "audio device: {} ({} Hz, {} channels, {:?})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            sample_format
        );

        let clock = SampleClock::new(sample_rate as f64);
        let master_volume = AtomicF32::new(DEFAULT_MASTER_VOLUME);
        let running = Arc::new(AtomicBool::new(false));

        let engine = VoiceEngine::new(sample_rate);
        let master = MasterBus::new(sample_rate, master_volume.clone());

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                command_rx,
                engine,
                master,
                clock.clone(),
                Arc::clone(&running),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                command_rx,
                engine,
                master,
                clock.clone(),
                Arc::clone(&running),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                command_rx,
                engine,
                master,
                clock.clone(),
                Arc::clone(&running),
            ),
            other => return Err(EngineError::UnsupportedFormat(other)),
        }?;

        stream.play()?;

        Ok(Self {
            _device: device,
            _stream: stream,
            clock,
            master_volume,
            running,
            sample_rate,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut command_rx: CommandConsumer,
        mut engine: VoiceEngine,
        mut master: MasterBus,
        clock: SampleClock,
        running: Arc<AtomicBool>,
    ) -> Result<Stream, EngineError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        // The callback is the sole owner of the engine, the master bus and
        // the command consumer; control threads reach them only through
        // the command channel and the shared atomics.
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                render_block(
                    data,
                    channels,
                    &mut command_rx,
                    &mut engine,
                    &mut master,
                    &clock,
                    &running,
                );
            },
            move |err| {
                // Runs outside the audio callback, I/O is fine here.
                log::error!("audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }

    /// Let the clock run and the engine sound. Idempotent.
    pub fn resume(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    /// Freeze the clock and output silence. Idempotent.
    pub fn suspend(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// A handle to the shared audio clock.
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    /// A handle to the master volume parameter.
    pub fn master_volume(&self) -> AtomicF32 {
        self.master_volume.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// One pass of the real-time callback: no I/O, no locks.
///
/// Commands are drained first so triggers arriving while suspended register
/// with their absolute start times. While suspended the output is silence
/// and the clock does not move.
fn render_block<T>(
    data: &mut [T],
    channels: usize,
    command_rx: &mut CommandConsumer,
    engine: &mut VoiceEngine,
    master: &mut MasterBus,
    clock: &SampleClock,
    running: &AtomicBool,
) where
    T: SizedSample + FromSample<f32>,
{
    while let Some(command) = command_rx.try_pop() {
        match command {
            Command::Trigger(trigger) => {
                engine.trigger(&trigger);
            }
            Command::StopAll => engine.stop_all(),
        }
    }

    if !running.load(Ordering::Relaxed) {
        for sample in data.iter_mut() {
            *sample = Sample::from_sample::<f32>(0.0);
        }
        return;
    }

    let start = clock.samples();
    let mut rendered = 0u64;
    for frame in data.chunks_mut(channels) {
        let (left, right) = engine.process(start + rendered);
        let (left, right) = master.process(left, right);
        write_stereo_frame((left, right), frame);
        rendered += 1;
    }
    clock.advance(rendered);
}

/// Write one stereo sample into an interleaved output frame, converting to
/// the device sample type. Extra channels repeat the stereo pair.
#[inline]
fn write_stereo_frame<T>(sample: (f32, f32), frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for (i, out) in frame.iter_mut().enumerate() {
        let value = if i % 2 == 0 { sample.0 } else { sample.1 };
        *out = T::from_sample(value);
    }
}
