// Transport - the scheduling actor
//
// A dedicated thread owns the look-ahead scheduler and a snapshot of the
// project. It wakes every LOOKAHEAD_TICK_MS, drains its control mailbox,
// runs one scheduling pass against the shared audio clock and pushes the
// resulting triggers into the host's command channel. The playhead position
// (in sixteenths) is published through an atomic for display.
//
// Stop is best effort: it halts the scheduler and tears down sounding
// voices, but triggers already queued in the command channel are not
// retracted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ringbuf::traits::Producer;

use crate::audio::clock::SampleClock;
use crate::messaging::{Command, CommandProducer};
use crate::project::Project;
use crate::sequencer::scheduler::{LOOKAHEAD_TICK_MS, LookaheadScheduler};

enum TransportMsg {
    Play(Box<Project>),
    Stop,
    SetBpm(u32),
    SetPosition(f64),
    Rewind,
    Shutdown,
}

pub struct Transport {
    tx: mpsc::Sender<TransportMsg>,
    playhead: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl Transport {
    /// Spawn the actor thread against a clock and a command producer.
    pub fn spawn(clock: SampleClock, command_tx: Arc<Mutex<CommandProducer>>) -> Self {
        let playhead = Arc::new(AtomicU64::new(0));
        let playhead_actor = Arc::clone(&playhead);
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("transport".to_string())
            .spawn(move || Self::run(rx, clock, command_tx, playhead_actor))
            .ok();

        Self {
            tx,
            playhead,
            handle,
        }
    }

    fn run(
        rx: mpsc::Receiver<TransportMsg>,
        clock: SampleClock,
        command_tx: Arc<Mutex<CommandProducer>>,
        playhead: Arc<AtomicU64>,
    ) {
        let mut scheduler = LookaheadScheduler::new();
        let mut project: Option<Project> = None;

        loop {
            match rx.recv_timeout(Duration::from_millis(LOOKAHEAD_TICK_MS)) {
                Ok(TransportMsg::Play(p)) => {
                    project = Some(*p);
                    scheduler.play(clock.seconds());
                    log::debug!("transport: play");
                }
                Ok(TransportMsg::Stop) => {
                    scheduler.stop();
                    Self::push(&command_tx, Command::StopAll);
                    log::debug!("transport: stop");
                }
                Ok(TransportMsg::SetBpm(bpm)) => {
                    if let Some(p) = project.as_mut() {
                        p.set_bpm(bpm);
                    }
                }
                Ok(TransportMsg::SetPosition(beat)) => {
                    scheduler.set_position(beat);
                    playhead.store(scheduler.current_sixteenth(), Ordering::Relaxed);
                }
                Ok(TransportMsg::Rewind) => {
                    scheduler.rewind();
                    playhead.store(0, Ordering::Relaxed);
                }
                Ok(TransportMsg::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if scheduler.is_playing()
                && let Some(p) = project.as_ref()
            {
                let triggers = scheduler.process(p, clock.seconds());
                for trigger in triggers {
                    Self::push(&command_tx, Command::Trigger(trigger));
                }
                playhead.store(scheduler.current_sixteenth(), Ordering::Relaxed);
            }
        }
    }

    fn push(command_tx: &Arc<Mutex<CommandProducer>>, command: Command) {
        if let Ok(mut tx) = command_tx.lock()
            && tx.try_push(command).is_err()
        {
            log::warn!("transport: command channel full, trigger dropped");
        }
    }

    pub fn play(&self, project: Project) {
        let _ = self.tx.send(TransportMsg::Play(Box::new(project)));
    }

    pub fn stop(&self) {
        let _ = self.tx.send(TransportMsg::Stop);
    }

    pub fn set_bpm(&self, bpm: u32) {
        let _ = self.tx.send(TransportMsg::SetBpm(bpm));
    }

    pub fn set_position(&self, beat: f64) {
        let _ = self.tx.send(TransportMsg::SetPosition(beat));
    }

    pub fn rewind(&self) {
        let _ = self.tx.send(TransportMsg::Rewind);
    }

    /// Playhead position in sixteenths, for display.
    pub fn playhead_sixteenth(&self) -> u64 {
        self.playhead.load(Ordering::Relaxed)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let _ = self.tx.send(TransportMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
