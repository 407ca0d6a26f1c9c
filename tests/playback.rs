// Scheduling scenarios across the scheduler, transport and voice engine.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ringbuf::traits::Consumer;

use rollsynth::audio::SampleClock;
use rollsynth::effects::{EffectDescriptor, EffectKind};
use rollsynth::messaging::{Command, create_command_channel};
use rollsynth::project::{InstrumentKind, NoteEvent, Project, Track};
use rollsynth::sequencer::{LookaheadScheduler, Transport};
use rollsynth::synth::VoiceEngine;

fn melody_project(bpm: u32) -> Project {
    let mut project = Project::new("melody", bpm);
    let mut track = Track::new(1, "lead", InstrumentKind::Saw);
    for i in 0..4 {
        track.add_event(NoteEvent::new(60 + i as u8, 100, i as f64, 0.5));
    }
    project.add_track(track);
    project
}

#[test]
fn test_full_sequence_is_scheduled_exactly_once() {
    // Sweep the clock in 25 ms steps over the whole sequence and check
    // every note is emitted once, in order, at beat * 60/bpm seconds.
    let project = melody_project(120);
    let mut scheduler = LookaheadScheduler::new();
    scheduler.play(0.0);

    let mut triggers = Vec::new();
    let mut now = 0.0;
    while now < 3.0 {
        triggers.extend(scheduler.process(&project, now));
        now += 0.025;
    }

    assert_eq!(triggers.len(), 4);
    for (i, trigger) in triggers.iter().enumerate() {
        assert_eq!(trigger.pitch, 60 + i as u8);
        assert!((trigger.start_time - i as f64 * 0.5).abs() < 1e-9);
        assert!((trigger.duration - 0.25).abs() < 1e-9);
    }
}

#[test]
fn test_triggers_always_land_in_the_future() {
    // Look-ahead must never emit a trigger earlier than the clock time it
    // was computed at.
    let project = melody_project(80);
    let mut scheduler = LookaheadScheduler::new();
    scheduler.play(0.0);

    let mut now = 0.0;
    while now < 4.0 {
        for trigger in scheduler.process(&project, now) {
            assert!(
                trigger.start_time >= now - 1e-9,
                "trigger at {} computed at {}",
                trigger.start_time,
                now
            );
        }
        now += 0.025;
    }
}

#[test]
fn test_scheduled_triggers_drive_the_voice_engine() {
    // Scheduler output feeds the engine directly; the engine must sound
    // during the notes and fall silent after all voices finish.
    let project = melody_project(120);
    let mut scheduler = LookaheadScheduler::new();
    scheduler.play(0.0);

    let sample_rate = 44100.0;
    let mut engine = VoiceEngine::new(sample_rate as f32);
    let total_samples = (3.0 * sample_rate) as u64;

    let mut energy = 0.0_f32;
    let mut tail_energy = 0.0_f32;
    for clock in 0..total_samples {
        // Feed the scheduler at its 25 ms cadence
        if clock % ((0.025 * sample_rate) as u64) == 0 {
            for trigger in scheduler.process(&project, clock as f64 / sample_rate) {
                engine.trigger(&trigger);
            }
        }
        let (l, r) = engine.process(clock);
        energy += l * l + r * r;
        // Sequence spans 2.0s minus tails; past 2.5s everything is done
        if clock > (2.5 * sample_rate) as u64 {
            tail_energy += l * l + r * r;
        }
    }

    assert!(energy > 0.0);
    assert_eq!(tail_energy, 0.0);
    assert_eq!(engine.active_voices(), 0);
}

#[test]
fn test_transport_round_trip_through_command_channel() {
    let clock = SampleClock::new(44100.0);
    let (tx, mut rx) = create_command_channel(128);
    let transport = Transport::spawn(clock.clone(), Arc::new(Mutex::new(tx)));

    transport.play(melody_project(120));
    // Walk the clock forward ~1.1s in small steps so the actor keeps up
    for _ in 0..11 {
        clock.advance(4410);
        thread::sleep(Duration::from_millis(30));
    }
    transport.stop();
    thread::sleep(Duration::from_millis(60));

    let mut pitches = Vec::new();
    let mut saw_stop = false;
    while let Some(command) = rx.try_pop() {
        match command {
            Command::Trigger(t) => pitches.push(t.pitch),
            Command::StopAll => saw_stop = true,
        }
    }

    // 1.1s at 120 BPM covers beats 0..2 plus the look-ahead window
    assert!(pitches.len() >= 2, "got {:?}", pitches);
    assert_eq!(&pitches[..2], &[60, 61]);
    assert!(saw_stop);
    assert!(transport.playhead_sixteenth() > 0);
}

#[test]
fn test_effect_descriptors_travel_with_triggers() {
    let mut project = Project::new("fx", 120);
    let mut track = Track::new(1, "wet", InstrumentKind::Sine).with_effects(vec![
        EffectDescriptor::new(EffectKind::Chorus).with_param("mix", 0.8),
    ]);
    track.add_event(NoteEvent::new(64, 90, 0.0, 1.0));
    project.add_track(track);

    let mut scheduler = LookaheadScheduler::new();
    scheduler.play(0.0);
    let triggers = scheduler.process(&project, 0.0);

    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].effects.len(), 1);
    assert_eq!(triggers[0].effects[0].kind, EffectKind::Chorus);
    assert_eq!(triggers[0].track_volume, 1.0);
}
