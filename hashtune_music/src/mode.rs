// Modes, scale degrees, and key selection.
//
// A Key pairs a scale pitch with one of the seven diatonic modes and
// resolves scale degrees to raw semitone values (scale + interval). The
// sums are never reduced mod 12: the melody's register tracking and the
// harmony's degree matching both compare them literally, octave crossings
// included.
//
// Scale and mode are chosen independently from the symbol ranking
// (classify.rs) by first-match scans over two fixed dictionaries; the two
// scans may land on different ranked symbols.

use crate::classify::Ranking;
use crate::note;
use serde::{Deserialize, Serialize};

/// The seven diatonic modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

/// Diatonic scale positions, used both for melody pitches and as chord
/// roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

/// A scale pitch plus a mode, the tonal center of one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub scale: i32,
    pub mode: Mode,
}

impl Key {
    /// Pick scale and mode from a symbol ranking.
    pub fn from_ranking(ranking: &Ranking) -> Self {
        Key {
            scale: select_scale(ranking),
            mode: select_mode(ranking),
        }
    }

    /// Raw pitch of a scale degree: scale + interval, with the modal
    /// exceptions folded into the interval table. Never reduced mod 12.
    pub fn degree_pitch(&self, degree: Degree) -> i32 {
        self.scale + self.interval(degree)
    }

    fn interval(&self, degree: Degree) -> i32 {
        match degree {
            Degree::I => 0,
            Degree::II => match self.mode {
                Mode::Phrygian | Mode::Locrian => 1,
                _ => 2,
            },
            Degree::III => match self.mode {
                Mode::Ionian | Mode::Lydian | Mode::Mixolydian => 4,
                _ => 3,
            },
            Degree::IV => match self.mode {
                Mode::Lydian => 6,
                _ => 5,
            },
            Degree::V => match self.mode {
                Mode::Locrian => 6,
                _ => 7,
            },
            Degree::VI => match self.mode {
                Mode::Phrygian | Mode::Aeolian | Mode::Locrian => 8,
                _ => 9,
            },
            Degree::VII => match self.mode {
                Mode::Ionian | Mode::Lydian => 11,
                _ => 10,
            },
        }
    }
}

/// First ranked symbol that names a scale wins; C when nothing matches.
fn select_scale(ranking: &Ranking) -> i32 {
    ranking.symbols().find_map(scale_of).unwrap_or(note::C)
}

fn scale_of(symbol: char) -> Option<i32> {
    match symbol {
        '4' => Some(note::AB),
        'a' => Some(note::A),
        '5' => Some(note::BB),
        'b' => Some(note::B),
        'c' => Some(note::C),
        '6' => Some(note::DB),
        'd' => Some(note::D),
        '7' => Some(note::EB),
        'e' => Some(note::E),
        'f' => Some(note::F),
        '8' => Some(note::GB),
        '9' => Some(note::G),
        _ => None,
    }
}

/// First ranked digit in 0..=6 names the mode; Ionian when nothing
/// matches.
fn select_mode(ranking: &Ranking) -> Mode {
    ranking.symbols().find_map(mode_of).unwrap_or(Mode::Ionian)
}

fn mode_of(symbol: char) -> Option<Mode> {
    match symbol {
        '0' => Some(Mode::Ionian),
        '1' => Some(Mode::Dorian),
        '2' => Some(Mode::Phrygian),
        '3' => Some(Mode::Lydian),
        '4' => Some(Mode::Mixolydian),
        '5' => Some(Mode::Aeolian),
        '6' => Some(Mode::Locrian),
        _ => None,
    }
}
