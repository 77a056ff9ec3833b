// Melody generation and measure sequencing.
//
// Two passes. from_hash() walks the trimmed hash and synthesizes one note
// per symbol: the symbol's rank picks a scale degree, a lookahead scan for
// the next duration digit groups notes into phrases that share a duration,
// and a bounded register heuristic keeps wide leaps from drifting off by
// octaves.
//
// perform() then plays the notes into an event sink in a single sequencing
// pass: durations are corrected at measure boundaries (the "groove"), an
// eighth rest is sometimes inserted ahead of the corrected note, and every
// emitted note lands in the per-measure phrase map the harmony stage
// (harmony.rs) reads. The measure index comes from the sink's elapsed-beat
// counter, so batching several melodies into one sink numbers their
// measures consecutively.

use crate::classify::{Ranking, trim_hash};
use crate::meter::TimeSignature;
use crate::mode::{Degree, Key};
use crate::note::{self, Duration, Note};
use crate::sink::EventSink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One composition: the generated note line plus everything the harmony
/// pass needs. Key and time signature are fixed at construction; phrases
/// and the measure count are filled in by perform() and not mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    pub notes: Vec<Note>,
    pub key: Key,
    pub time_signature: TimeSignature,
    /// 1-based measure index -> notes sounded in that measure, inserted
    /// groove rests included. Populated by perform().
    pub phrases: BTreeMap<u32, Vec<Note>>,
    /// Last measure index reached by perform().
    pub measures: u32,
}

impl Melody {
    /// Generate the note line for a hash. Pure: the same hash always
    /// yields the same melody.
    pub fn from_hash(hash: &str) -> Self {
        let trimmed = trim_hash(hash);
        let ranking = Ranking::of(trimmed);
        let key = Key::from_ranking(&ranking);
        let time_signature = TimeSignature::from_hash(hash);

        let symbols: Vec<char> = trimmed.chars().collect();
        let mut notes = Vec::with_capacity(symbols.len());
        let mut notes_left_in_phrase: i32 = 0;
        let mut phrase_duration = Duration::Crotchet;
        let mut prev_pitch: Option<i32> = None;

        for (index, &symbol) in symbols.iter().enumerate() {
            // Phrase boundary: scan ahead for the next duration digit.
            // Every scanned symbol counts toward the new phrase length,
            // the match included; with no match left in the hash the
            // previous duration carries over the tail.
            if notes_left_in_phrase == 0 {
                for &ahead in &symbols[index + 1..] {
                    notes_left_in_phrase += 1;
                    if let Some(duration) = phrase_duration_of(ahead) {
                        phrase_duration = duration;
                        break;
                    }
                }
            }

            let pitch = ranking
                .rank_of(symbol)
                .and_then(degree_for_rank)
                .map(|degree| key.degree_pitch(degree))
                .unwrap_or(note::C);

            let mut new_note = Note::pitched(pitch, phrase_duration);
            if let Some(prev) = prev_pitch {
                if prev != note::REST {
                    // Raw degree values, before register placement.
                    let interval = prev - pitch;
                    if interval < -13 {
                        new_note.register += 1;
                    } else if interval > 13 {
                        new_note.register -= 1;
                    }
                }
            }

            prev_pitch = Some(pitch);
            notes.push(new_note);
            notes_left_in_phrase -= 1;
        }

        Melody {
            notes,
            key,
            time_signature,
            phrases: BTreeMap::new(),
            measures: 0,
        }
    }

    /// Play the melody into the sink, correcting durations at measure
    /// boundaries and recording the per-measure phrase map.
    ///
    /// A note that would cross the boundary is snapped to what is left of
    /// the measure, sometimes behind an inserted eighth rest; a remainder
    /// outside the corrected set is let through unchanged. Either way the
    /// measure-relative position restarts at zero.
    pub fn perform(&mut self, sink: &mut impl EventSink) {
        let Melody {
            notes,
            phrases,
            time_signature,
            measures,
            ..
        } = self;
        phrases.clear();

        let beats_per_measure = f64::from(time_signature.numerator);
        let mut next_position = 0.0;

        for current in notes.iter_mut() {
            let measure = time_signature.measure_at(sink.beats_elapsed());

            let position = next_position;
            next_position += sink.beats_of(current.duration);

            if next_position > beats_per_measure {
                // Positions move in multiples of 0.25, so the equality
                // tests in groove_correction are exact.
                let remaining = beats_per_measure - position;
                if let Some((lead_rest, corrected)) = groove_correction(remaining) {
                    if lead_rest {
                        let rest = Note::rest(Duration::Quaver);
                        rest.play(sink);
                        phrases.entry(measure).or_default().push(rest);
                    }
                    current.duration = corrected;
                }
                next_position = 0.0;
            }
            if next_position == position {
                next_position = 0.0;
            }

            current.play(sink);
            phrases.entry(measure).or_default().push(*current);
        }

        *measures = time_signature.measure_at(sink.beats_elapsed());
    }

    /// Compact per-measure text rendering for CLI output and debugging.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (measure, phrase) in &self.phrases {
            out.push_str(&format!("{measure:>4} |"));
            for n in phrase {
                if n.is_rest() {
                    out.push_str(&format!(" -({})", n.duration.label()));
                } else {
                    let name = note::key_name(n.key());
                    out.push_str(&format!(" {}({})", name, n.duration.label()));
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Duration named by a phrase-boundary digit.
fn phrase_duration_of(symbol: char) -> Option<Duration> {
    match symbol {
        '0' => Some(Duration::Minim),
        '1' => Some(Duration::DottedCrotchet),
        '2' => Some(Duration::Crotchet),
        '3' | '4' => Some(Duration::Quaver),
        '5' | '6' => Some(Duration::Semiquaver),
        _ => None,
    }
}

/// Melodic degree for a symbol's rank index. Ranks 13 and 14 map to
/// nothing; those notes keep the raw zero pitch.
fn degree_for_rank(rank: usize) -> Option<Degree> {
    match rank {
        0 | 10 => Some(Degree::V),
        1 | 7 | 11 => Some(Degree::III),
        2 | 9 => Some(Degree::I),
        3 | 8 => Some(Degree::VII),
        4 => Some(Degree::IV),
        5 | 12 => Some(Degree::II),
        6 | 15 => Some(Degree::VI),
        _ => None,
    }
}

/// Boundary correction for a note overrunning the measure, keyed by how
/// much of the measure is left. True asks for an eighth rest ahead of the
/// corrected note.
fn groove_correction(remaining: f64) -> Option<(bool, Duration)> {
    if remaining == 0.25 {
        Some((false, Duration::Semiquaver))
    } else if remaining == 0.5 {
        Some((false, Duration::Quaver))
    } else if remaining == 0.75 {
        Some((true, Duration::Semiquaver))
    } else if remaining == 1.0 {
        Some((false, Duration::Crotchet))
    } else if remaining == 1.5 {
        Some((true, Duration::Crotchet))
    } else {
        None
    }
}
