// Pitch, duration, and playback primitives shared by every generation stage.
//
// Pitches are raw semitone offsets from C, kept as plain integers: degree
// arithmetic runs past the octave (the seventh of B Ionian is 22) and the
// harmony stage matches those raw sums literally, so they are never reduced
// mod 12. The value 12 doubles as the rest sentinel: a note whose pitch
// lands on 12 is silent even when it arose as a degree of the key (the
// seventh of Db Ionian is 1 + 11 = 12).
//
// A Note plays itself into an EventSink (sink.rs): note-on, cursor advance
// by its duration, note-off, or a single timed silence for a rest. A Chord
// holds three voices for the first voice's duration.

use crate::sink::EventSink;
use serde::{Deserialize, Serialize};

/// Pitch classes as semitone offsets from C.
pub const C: i32 = 0;
pub const DB: i32 = 1;
pub const D: i32 = 2;
pub const EB: i32 = 3;
pub const E: i32 = 4;
pub const F: i32 = 5;
pub const GB: i32 = 6;
pub const G: i32 = 7;
pub const AB: i32 = 8;
pub const A: i32 = 9;
pub const BB: i32 = 10;
pub const B: i32 = 11;
/// Sentinel pitch meaning "no pitch".
pub const REST: i32 = 12;

/// The closed set of note lengths the generator works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Half note (2 beats).
    Minim,
    /// Dotted quarter note (1.5 beats).
    DottedCrotchet,
    /// Quarter note (1 beat).
    Crotchet,
    /// Eighth note (0.5 beats).
    Quaver,
    /// Sixteenth note (0.25 beats).
    Semiquaver,
}

impl Duration {
    pub const ALL: [Duration; 5] = [
        Duration::Minim,
        Duration::DottedCrotchet,
        Duration::Crotchet,
        Duration::Quaver,
        Duration::Semiquaver,
    ];

    /// Stable index for per-duration bookkeeping tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short label for text summaries.
    pub fn label(self) -> &'static str {
        match self {
            Duration::Minim => "m",
            Duration::DottedCrotchet => "c.",
            Duration::Crotchet => "c",
            Duration::Quaver => "q",
            Duration::Semiquaver => "s",
        }
    }
}

/// A single melodic or accompaniment voice event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Raw semitone offset from C of `register`, or REST.
    pub pitch: i32,
    pub velocity: u8,
    pub duration: Duration,
    /// Octave index; the MIDI key is pitch + 12 * register.
    pub register: i32,
}

impl Note {
    /// A sounding note in the melody register.
    pub fn pitched(pitch: i32, duration: Duration) -> Self {
        Note {
            pitch,
            velocity: 100,
            duration,
            register: 5,
        }
    }

    /// A timed rest.
    pub fn rest(duration: Duration) -> Self {
        Note {
            pitch: REST,
            velocity: 100,
            duration,
            register: 5,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch == REST
    }

    /// The MIDI key this note sounds at.
    pub fn key(&self) -> u8 {
        (self.pitch + 12 * self.register) as u8
    }

    /// Play into the sink: note-on, advance, note-off, or a timed silence
    /// for a rest.
    pub fn play(&self, sink: &mut impl EventSink) {
        if self.is_rest() {
            sink.silence(self.duration);
        } else {
            sink.note_on(self.key(), self.velocity);
            sink.advance(self.duration);
            sink.note_off(self.key());
        }
    }
}

/// Three simultaneous voices. Voice order is root, third, fifth of the
/// stacked triad; the first voice's duration governs how long all three
/// are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub voices: [Note; 3],
}

impl Chord {
    /// Simultaneous note-on for all voices, hold for the first voice's
    /// duration, simultaneous note-off. Voices sound unconditionally,
    /// even when a voice's pitch value is the rest sentinel.
    pub fn play(&self, sink: &mut impl EventSink) {
        for voice in &self.voices {
            sink.note_on(voice.key(), voice.velocity);
        }
        sink.advance(self.voices[0].duration);
        for voice in &self.voices {
            sink.note_off(voice.key());
        }
    }
}

/// Name of a pitch class 0..=11.
pub fn pitch_name(pitch: i32) -> &'static str {
    match pitch {
        0 => "C",
        1 => "Db",
        2 => "D",
        3 => "Eb",
        4 => "E",
        5 => "F",
        6 => "Gb",
        7 => "G",
        8 => "Ab",
        9 => "A",
        10 => "Bb",
        11 => "B",
        _ => "?",
    }
}

/// Note-name + octave label for a MIDI key, e.g. "G5".
pub fn key_name(key: u8) -> String {
    format!("{}{}", pitch_name(i32::from(key % 12)), key / 12)
}
