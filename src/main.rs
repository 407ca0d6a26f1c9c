// Demo binary: builds a small two-track project, renders it to demo.wav
// and, with --play, plays it through the default output device.

use std::path::Path;
use std::thread;
use std::time::Duration;

use rollsynth::effects::{EffectDescriptor, EffectKind};
use rollsynth::error::EngineError;
use rollsynth::project::{InstrumentKind, NoteEvent, Project, Track};
use rollsynth::session::PlaybackSession;
use rollsynth::{AudioExporter, ExportSettings};

fn demo_project() -> Project {
    let mut project = Project::new("Demo", 110);

    let mut lead = Track::new(1, "Lead", InstrumentKind::Saw)
        .with_volume(0.7)
        .with_effects(vec![
            EffectDescriptor::new(EffectKind::Delay)
                .with_param("time", 0.27)
                .with_param("feedback", 0.35)
                .with_param("mix", 0.3),
        ]);
    for (i, pitch) in [69u8, 72, 76, 74, 72, 69, 67, 69].iter().enumerate() {
        lead.add_event(NoteEvent::new(*pitch, 100, i as f64 * 0.5, 0.45));
    }

    let mut bass = Track::new(2, "Bass", InstrumentKind::Triangle)
        .with_volume(0.9)
        .with_effects(vec![
            EffectDescriptor::new(EffectKind::Distortion)
                .with_param("drive", 80.0)
                .with_param("mix", 0.4),
        ]);
    for (i, pitch) in [45u8, 45, 40, 43].iter().enumerate() {
        bass.add_event(NoteEvent::new(*pitch, 110, i as f64, 0.9));
    }

    project.add_track(lead);
    project.add_track(bass);
    project
}

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let project = demo_project();
    log::info!("project '{}' at {} BPM", project.name, project.bpm);

    let exporter = AudioExporter::new(ExportSettings::default());
    let buffer = exporter.export(&project, Path::new("demo.wav"))?;
    println!(
        "rendered {:.2}s ({} samples) to demo.wav",
        buffer.duration_seconds(),
        buffer.len()
    );

    if std::env::args().any(|arg| arg == "--play") {
        let mut session = PlaybackSession::new(project);
        session.init_audio()?;
        session.play()?;
        println!("playing... (5s)");

        // Let the sequence run, then watch the playhead while stopping
        thread::sleep(Duration::from_secs(5));
        println!("playhead at sixteenth {}", session.playhead_sixteenth());
        session.stop();
        thread::sleep(Duration::from_millis(300));
    }

    Ok(())
}
