// Project data model
//
// One in-memory project: tempo, master volume and a list of tracks, each
// with an instrument, mixer flags, an effect list and note events placed on
// a beat grid. Out-of-range values are clamped at construction, never
// rejected.

use serde::{Deserialize, Serialize};

use crate::effects::EffectDescriptor;
use crate::sequencer::timeline::{Tempo, TimeSignature};

pub type TrackId = u32;

/// The waveform class a track's voices use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Sine,
    Square,
    #[default]
    Saw,
    Triangle,
}

/// Kind tag carried by every piano-roll event, serialized as `type`.
/// Unrecognized tags deserialize to `Unknown` and are skipped by the
/// scheduler and the offline renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Note,
    #[serde(other)]
    Unknown,
}

/// A note on the piano roll. Times are in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    pub pitch: u8,
    pub velocity: u8,
    pub start: f64,
    pub duration: f64,
}

impl NoteEvent {
    /// Clamps pitch/velocity to 0..=127, start to >= 0 and duration to > 0.
    pub fn new(pitch: u8, velocity: u8, start: f64, duration: f64) -> Self {
        Self {
            kind: EventKind::Note,
            pitch: pitch.min(127),
            velocity: velocity.min(127),
            start: start.max(0.0),
            duration: duration.max(1.0 / 128.0),
        }
    }

    pub fn is_note(&self) -> bool {
        self.kind == EventKind::Note
    }

    /// End of the note in beats.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub instrument: InstrumentKind,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub soloed: bool,
    pub volume: f32,
    #[serde(default)]
    pub effects: Vec<EffectDescriptor>,
    #[serde(default)]
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>, instrument: InstrumentKind) -> Self {
        Self {
            id,
            name: name.into(),
            instrument,
            muted: false,
            soloed: false,
            volume: 1.0,
            effects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn with_effects(mut self, effects: Vec<EffectDescriptor>) -> Self {
        self.effects = effects;
        self
    }

    pub fn add_event(&mut self, event: NoteEvent) {
        self.events.push(event);
    }

    /// Whether this track sounds, given whether any track in the project is
    /// soloed. A muted track never sounds; when a solo exists, only soloed
    /// tracks sound.
    pub fn is_audible(&self, any_solo: bool) -> bool {
        !self.muted && (!any_solo || self.soloed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub bpm: u32,
    #[serde(default)]
    pub time_signature: TimeSignature,
    pub master_volume: f32,
    pub tracks: Vec<Track>,
}

impl Project {
    pub fn new(name: impl Into<String>, bpm: u32) -> Self {
        Self {
            name: name.into(),
            bpm: bpm.max(1),
            time_signature: TimeSignature::default(),
            master_volume: 0.8,
            tracks: Vec::new(),
        }
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.bpm = bpm.max(1);
    }

    /// The project tempo as a `Tempo`, the single conversion point between
    /// beats and seconds.
    pub fn tempo(&self) -> Tempo {
        Tempo::new(self.bpm as f64)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn any_solo(&self) -> bool {
        self.tracks.iter().any(|t| t.soloed)
    }

    /// Tracks that currently sound, honoring mute and solo flags.
    pub fn audible_tracks(&self) -> impl Iterator<Item = &Track> {
        let any_solo = self.any_solo();
        self.tracks.iter().filter(move |t| t.is_audible(any_solo))
    }

    /// Musical span of the audible material in beats: the latest note end,
    /// or 0 for an empty project.
    pub fn duration_beats(&self) -> f64 {
        self.audible_tracks()
            .flat_map(|t| t.events.iter())
            .filter(|e| e.is_note())
            .map(|e| e.end())
            .fold(0.0, f64::max)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled", 120)
    }
}
