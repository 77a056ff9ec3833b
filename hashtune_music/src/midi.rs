// MIDI output: the event-sink implementation over a midly track, and
// Standard MIDI File assembly for a batch of compositions.
//
// Uses the `midly` crate. Output is SMF Format 1 (multi-track): track 0
// carries the tempo, track 1 the melodies (channel 0), track 2 the chord
// accompaniment (channel 1). Events are stored with running delta ticks;
// the sink keeps an absolute tick cursor and stamps each event with the
// distance from the previous one.
//
// For every composition the full melody pass runs before its harmony
// pass; harmony reads the phrase map the melody pass records.

use crate::harmony::perform_harmony;
use crate::melody::Melody;
use crate::meter::TimeSignature;
use crate::note::Duration;
use crate::sink::EventSink;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::error::Error;
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// MIDI controller number for All Notes Off.
const ALL_NOTES_OFF: u8 = 123;

fn ticks_of(duration: Duration) -> u64 {
    let quarter = u64::from(TICKS_PER_QUARTER);
    match duration {
        Duration::Minim => quarter * 2,
        Duration::DottedCrotchet => quarter + quarter / 2,
        Duration::Crotchet => quarter,
        Duration::Quaver => quarter / 2,
        Duration::Semiquaver => quarter / 4,
    }
}

/// EventSink over one midly track on a fixed channel.
#[derive(Debug)]
pub struct TrackSink {
    channel: u4,
    events: Track<'static>,
    /// Absolute tick position of the write cursor.
    cursor: u64,
    /// Absolute tick position of the last stored event.
    last_event: u64,
}

impl TrackSink {
    /// A fresh sink writing on the given channel (0..=15).
    pub fn new(channel: u8) -> Self {
        TrackSink {
            channel: u4::new(channel),
            events: Vec::new(),
            cursor: 0,
            last_event: 0,
        }
    }

    fn push(&mut self, kind: TrackEventKind<'static>) {
        let delta = (self.cursor - self.last_event) as u32;
        self.last_event = self.cursor;
        self.events.push(TrackEvent {
            delta: u28::new(delta),
            kind,
        });
    }

    fn push_midi(&mut self, message: MidiMessage) {
        let channel = self.channel;
        self.push(TrackEventKind::Midi { channel, message });
    }

    pub fn track_name(&mut self, name: &'static [u8]) {
        self.push(TrackEventKind::Meta(MetaMessage::TrackName(name)));
    }

    pub fn instrument(&mut self, name: &'static [u8]) {
        self.push(TrackEventKind::Meta(MetaMessage::InstrumentName(name)));
    }

    /// The denominator is always 4, so its power of two is fixed.
    pub fn time_signature(&mut self, ts: &TimeSignature) {
        self.push(TrackEventKind::Meta(MetaMessage::TimeSignature(
            ts.numerator,
            2,
            24,
            8,
        )));
    }

    /// Close the track and hand back its events.
    pub fn into_track(mut self) -> Track<'static> {
        self.push(TrackEventKind::Meta(MetaMessage::EndOfTrack));
        self.events
    }
}

impl EventSink for TrackSink {
    fn note_on(&mut self, key: u8, velocity: u8) {
        self.push_midi(MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(velocity),
        });
    }

    fn note_off(&mut self, key: u8) {
        self.push_midi(MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        });
    }

    fn silence(&mut self, duration: Duration) {
        self.push_midi(MidiMessage::Controller {
            controller: u7::new(ALL_NOTES_OFF),
            value: u7::new(0),
        });
        self.cursor += ticks_of(duration);
    }

    fn advance(&mut self, duration: Duration) {
        self.cursor += ticks_of(duration);
    }

    fn beats_of(&self, duration: Duration) -> f64 {
        ticks_of(duration) as f64 / f64::from(TICKS_PER_QUARTER)
    }

    fn beats_elapsed(&self) -> u64 {
        self.cursor / u64::from(TICKS_PER_QUARTER)
    }
}

/// Assemble a batch of compositions into an in-memory SMF. The melody
/// track is performed first (populating each melody's phrase map and
/// measure count), then the harmony track reads those maps.
pub fn assemble_smf(melodies: &mut [Melody], tempo_bpm: u16) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo only.
    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / u32::from(tempo_bpm);
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    // Track 1: melodies, each announcing its own meter.
    let mut lead = TrackSink::new(0);
    lead.track_name(b"Lead");
    lead.instrument(b"Lead");
    for melody in melodies.iter_mut() {
        lead.time_signature(&melody.time_signature);
        melody.perform(&mut lead);
    }
    smf.tracks.push(lead.into_track());

    // Track 2: chord accompaniment.
    let mut accompaniment = TrackSink::new(1);
    accompaniment.track_name(b"Harmony");
    for melody in melodies.iter() {
        perform_harmony(melody, &mut accompaniment);
    }
    smf.tracks.push(accompaniment.into_track());

    smf
}

/// Generate the batch and write it to a .mid file.
pub fn write_midi(
    melodies: &mut [Melody],
    path: &Path,
    tempo_bpm: u16,
) -> Result<(), Box<dyn Error>> {
    let smf = assemble_smf(melodies, tempo_bpm);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}
