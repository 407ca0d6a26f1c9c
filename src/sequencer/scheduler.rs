// Look-ahead scheduler
//
// Converts grid positions into absolute audio-clock triggers slightly ahead
// of real time. Each process call walks sixteenth slices while the next
// slice time falls inside the schedule-ahead window; notes whose start lies
// in the half-open slice [beat, beat + 0.25) are emitted with their exact
// sub-slice offset. Tempo is re-read every slice, so a BPM change only
// affects slices not yet scheduled.

use crate::project::Project;
use crate::synth::NoteTrigger;

/// Cadence of the transport thread driving `process`, in milliseconds.
pub const LOOKAHEAD_TICK_MS: u64 = 25;

/// How far past the current clock time slices are scheduled, in seconds.
pub const SCHEDULE_AHEAD_SECS: f64 = 0.1;

/// Grid resolution in beats.
pub const SIXTEENTH_BEATS: f64 = 0.25;

pub struct LookaheadScheduler {
    next_note_time: f64,
    current_sixteenth: u64,
    playing: bool,
}

impl Default for LookaheadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LookaheadScheduler {
    pub fn new() -> Self {
        Self {
            next_note_time: 0.0,
            current_sixteenth: 0,
            playing: false,
        }
    }

    /// Start playing from the current grid position. The tick counter is
    /// untouched; stop does not rewind.
    pub fn play(&mut self, now: f64) {
        self.playing = true;
        self.next_note_time = now;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Back to the start of the grid.
    pub fn rewind(&mut self) {
        self.current_sixteenth = 0;
    }

    /// Jump the playhead to the sixteenth containing a beat position.
    pub fn set_position(&mut self, beat: f64) {
        self.current_sixteenth = ((beat.max(0.0) / SIXTEENTH_BEATS).floor()) as u64;
    }

    pub fn current_sixteenth(&self) -> u64 {
        self.current_sixteenth
    }

    /// Schedule every slice whose time falls inside the look-ahead window
    /// and return the triggers, with times on the audio clock.
    pub fn process(&mut self, project: &Project, now: f64) -> Vec<NoteTrigger> {
        let mut triggers = Vec::new();
        if !self.playing {
            return triggers;
        }

        let any_solo = project.any_solo();

        while self.next_note_time < now + SCHEDULE_AHEAD_SECS {
            let seconds_per_beat = project.tempo().seconds_per_beat();
            let slice_start = self.current_sixteenth as f64 * SIXTEENTH_BEATS;
            let slice_end = slice_start + SIXTEENTH_BEATS;

            for track in project.tracks.iter().filter(|t| t.is_audible(any_solo)) {
                for event in track.events.iter().filter(|e| e.is_note()) {
                    if event.start >= slice_start && event.start < slice_end {
                        triggers.push(NoteTrigger {
                            pitch: event.pitch,
                            velocity: event.velocity,
                            start_time: self.next_note_time
                                + (event.start - slice_start) * seconds_per_beat,
                            duration: event.duration * seconds_per_beat,
                            instrument: track.instrument,
                            track_volume: track.volume,
                            effects: track.effects.clone(),
                        });
                    }
                }
            }

            self.next_note_time += SIXTEENTH_BEATS * seconds_per_beat;
            self.current_sixteenth += 1;
        }

        triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{InstrumentKind, NoteEvent, Track};

    fn project_with_notes(bpm: u32, starts: &[f64]) -> Project {
        let mut project = Project::new("test", bpm);
        let mut track = Track::new(1, "track", InstrumentKind::Saw);
        for &start in starts {
            track.add_event(NoteEvent::new(60, 100, start, 0.5));
        }
        project.add_track(track);
        project
    }

    #[test]
    fn test_tick_advances_by_quarter_beat_seconds() {
        // At 120 BPM a sixteenth lasts 0.125 s: the first process call at
        // now = 0 covers slice times 0 and strictly below 0.1.
        let project = project_with_notes(120, &[]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        scheduler.process(&project, 0.0);
        assert_eq!(scheduler.current_sixteenth(), 1);

        // Advancing the clock past 0.125 - 0.1 pulls in the next slice
        scheduler.process(&project, 0.05);
        assert_eq!(scheduler.current_sixteenth(), 2);
    }

    #[test]
    fn test_lookahead_boundary() {
        // 80 BPM: beat 0 at t=0, beat 1 at t=0.75. A call at clock 0.35
        // sees a window ending at 0.45, so only the first note schedules.
        let project = project_with_notes(80, &[0.0, 1.0]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);

        let first = scheduler.process(&project, 0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].start_time, 0.0);

        let mid = scheduler.process(&project, 0.35);
        assert!(mid.is_empty(), "beat 1 scheduled early: {:?}", mid.len());

        // Once the window reaches 0.75 the second note appears
        let late = scheduler.process(&project, 0.66);
        assert_eq!(late.len(), 1);
        assert!((late[0].start_time - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_trigger_times_and_durations_at_120_bpm() {
        let mut project = Project::new("test", 120);
        let mut track = Track::new(1, "track", InstrumentKind::Saw);
        track.add_event(NoteEvent::new(60, 100, 2.0, 1.0));
        project.add_track(track);

        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        let mut triggers = Vec::new();
        let mut now = 0.0;
        while triggers.is_empty() && now < 2.0 {
            triggers.extend(scheduler.process(&project, now));
            now += 0.025;
        }

        assert_eq!(triggers.len(), 1);
        // Beat 2 at 120 BPM starts 1.0 s in and lasts 0.5 s
        assert!((triggers[0].start_time - 1.0).abs() < 1e-9);
        assert!((triggers[0].duration - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_half_open_slice_rule() {
        // A note exactly on a slice boundary belongs to that slice only;
        // nothing is scheduled twice.
        let project = project_with_notes(60, &[0.25]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);

        let mut all = Vec::new();
        let mut now = 0.0;
        while now < 1.5 {
            all.extend(scheduler.process(&project, now));
            now += 0.025;
        }
        assert_eq!(all.len(), 1);
        // At 60 BPM beat 0.25 falls at 0.25 s
        assert!((all[0].start_time - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_off_grid_note_keeps_sub_slice_offset() {
        let project = project_with_notes(60, &[0.1]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        let triggers = scheduler.process(&project, 0.0);
        assert_eq!(triggers.len(), 1);
        assert!((triggers[0].start_time - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_muted_track_triggers_nothing() {
        let mut project = project_with_notes(120, &[0.0]);
        project.track_mut(1).unwrap().muted = true;

        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        assert!(scheduler.process(&project, 0.0).is_empty());
    }

    #[test]
    fn test_solo_filters_other_tracks() {
        let mut project = project_with_notes(120, &[0.0]);
        let mut other = Track::new(2, "other", InstrumentKind::Sine);
        other.add_event(NoteEvent::new(72, 100, 0.0, 0.5));
        other.soloed = true;
        project.add_track(other);

        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        let triggers = scheduler.process(&project, 0.0);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].pitch, 72);
    }

    #[test]
    fn test_stop_does_not_rewind() {
        let project = project_with_notes(120, &[]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        scheduler.process(&project, 0.3);
        let position = scheduler.current_sixteenth();
        assert!(position > 0);

        scheduler.stop();
        assert_eq!(scheduler.current_sixteenth(), position);

        // Explicit rewind resets the grid position
        scheduler.rewind();
        assert_eq!(scheduler.current_sixteenth(), 0);
    }

    #[test]
    fn test_set_position_jumps_playhead() {
        let mut scheduler = LookaheadScheduler::new();
        scheduler.set_position(2.0);
        assert_eq!(scheduler.current_sixteenth(), 8);
        scheduler.set_position(-1.0);
        assert_eq!(scheduler.current_sixteenth(), 0);
    }

    #[test]
    fn test_set_position_floors_within_sixteenth() {
        // A beat inside a sixteenth lands on that sixteenth, not the next
        let mut scheduler = LookaheadScheduler::new();
        scheduler.set_position(1.9);
        assert_eq!(scheduler.current_sixteenth(), 7);
        scheduler.set_position(0.24);
        assert_eq!(scheduler.current_sixteenth(), 0);
    }

    #[test]
    fn test_non_note_events_are_not_scheduled() {
        let mut project = project_with_notes(120, &[0.0]);
        let mut automation = NoteEvent::new(0, 0, 0.0, 4.0);
        automation.kind = crate::project::EventKind::Unknown;
        project.track_mut(1).unwrap().add_event(automation);

        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        let triggers = scheduler.process(&project, 0.0);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].pitch, 60);
    }

    #[test]
    fn test_tempo_change_affects_future_slices_only() {
        let mut project = project_with_notes(120, &[0.0, 4.0]);
        let mut scheduler = LookaheadScheduler::new();
        scheduler.play(0.0);
        let first = scheduler.process(&project, 0.0);
        assert_eq!(first.len(), 1);
        assert!((first[0].duration - 0.25).abs() < 1e-9);

        // Halve the tempo; the note at beat 4 now lands later and longer
        project.set_bpm(60);
        let mut second = Vec::new();
        let mut now = 0.0;
        while second.is_empty() && now < 10.0 {
            second.extend(scheduler.process(&project, now));
            now += 0.025;
        }
        assert_eq!(second.len(), 1);
        assert!((second[0].duration - 0.5).abs() < 1e-9);
        // Scheduled time reflects the slower slice spacing after the change
        assert!(second[0].start_time > 2.0);
    }

    #[test]
    fn test_process_while_stopped_is_empty() {
        let project = project_with_notes(120, &[0.0]);
        let mut scheduler = LookaheadScheduler::new();
        assert!(scheduler.process(&project, 0.0).is_empty());
    }
}
