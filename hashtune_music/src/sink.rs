// The event-sink contract between generation and the output medium.
//
// The generator never touches ticks or files directly: notes play into an
// EventSink, and the sink owns the tick resolution. midi.rs implements the
// contract over a midly track; RecordingSink captures the call stream in
// memory for tests and for callers that want structured events instead of
// a MIDI file.
//
// beats_elapsed() reports *whole* quarter-note beats, truncating any
// fractional remainder. Measure indexing (meter.rs) depends on that
// truncation, so sinks must not round.

use crate::note::Duration;
use serde::{Deserialize, Serialize};

/// Where generated events land, in call order.
pub trait EventSink {
    /// Start sounding a key.
    fn note_on(&mut self, key: u8, velocity: u8);
    /// Stop sounding a key.
    fn note_off(&mut self, key: u8);
    /// Cut everything sounding and advance the cursor by `duration`.
    fn silence(&mut self, duration: Duration);
    /// Advance the cursor by `duration` while sounding notes ring.
    fn advance(&mut self, duration: Duration);
    /// Length of `duration` as a fraction of one quarter-note beat.
    fn beats_of(&self, duration: Duration) -> f64;
    /// Whole quarter-note beats elapsed at the cursor.
    fn beats_elapsed(&self) -> u64;
}

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
    Silence(Duration),
    Advance(Duration),
}

/// In-memory sink: the event stream plus a beat cursor.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    cursor: f64,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    /// Cursor position in quarter-note beats, fractional part included.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }
}

impl EventSink for RecordingSink {
    fn note_on(&mut self, key: u8, velocity: u8) {
        self.events.push(SinkEvent::NoteOn { key, velocity });
    }

    fn note_off(&mut self, key: u8) {
        self.events.push(SinkEvent::NoteOff { key });
    }

    fn silence(&mut self, duration: Duration) {
        self.events.push(SinkEvent::Silence(duration));
        self.cursor += self.beats_of(duration);
    }

    fn advance(&mut self, duration: Duration) {
        self.events.push(SinkEvent::Advance(duration));
        self.cursor += self.beats_of(duration);
    }

    fn beats_of(&self, duration: Duration) -> f64 {
        match duration {
            Duration::Minim => 2.0,
            Duration::DottedCrotchet => 1.5,
            Duration::Crotchet => 1.0,
            Duration::Quaver => 0.5,
            Duration::Semiquaver => 0.25,
        }
    }

    fn beats_elapsed(&self) -> u64 {
        self.cursor as u64
    }
}
