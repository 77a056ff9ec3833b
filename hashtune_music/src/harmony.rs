// Chord construction and rhythm-fill accompaniment.
//
// For every measure the melody pass recorded, the expander picks one
// accompaniment degree (from the measure's first note) and rewrites runs
// of same-duration melody notes as fixed chord/silence fill patterns. The
// patterns are literal data in the tables below, one entry per
// (duration, run length); the output is defined by these exact
// decompositions, so no rule regenerates them.
//
// Run bookkeeping: one counter per duration class marks runs already
// expanded. A note whose class is still marked is skipped outright; after
// expanding a new run every other class's counter is cleared. Rests clear
// all counters, and an eighth rest in the melody becomes an eighth chord.

use crate::melody::Melody;
use crate::mode::{Degree, Key};
use crate::note::{Chord, Duration, Note};
use crate::sink::EventSink;

use crate::note::Duration::{Crotchet, DottedCrotchet, Minim, Quaver, Semiquaver};
use self::Step::{Silence, Strike};

/// One step of a fill pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Strike the measure's chord for the given duration.
    Strike(Duration),
    /// Leave silence for the given duration.
    Silence(Duration),
}

/// Fills for minim runs, indexed by run length starting at 1.
/// Longer runs have no fill at all.
const MINIM_FILLS: [&[Step]; 3] = [
    &[Silence(Quaver), Strike(Crotchet), Silence(Quaver)],
    &[Strike(Minim), Silence(Crotchet), Strike(Crotchet)],
    &[Strike(Minim), Silence(Minim), Strike(Crotchet), Strike(Crotchet)],
];

/// Fills for dotted-crotchet runs, indexed by run length starting at 2.
/// Any other length strikes once per note instead.
const DOTTED_CROTCHET_FILLS: [&[Step]; 4] = [
    &[Silence(DottedCrotchet), Strike(Crotchet), Silence(Quaver)],
    &[
        Strike(DottedCrotchet),
        Strike(Quaver),
        Silence(Crotchet),
        Strike(DottedCrotchet),
    ],
    &[
        Silence(Quaver),
        Strike(DottedCrotchet),
        Silence(DottedCrotchet),
        Strike(Crotchet),
    ],
    &[
        Strike(DottedCrotchet),
        Strike(DottedCrotchet),
        Silence(DottedCrotchet),
        Strike(DottedCrotchet),
        Silence(DottedCrotchet),
    ],
];

/// Fills for crotchet runs, indexed by run length starting at 2.
/// Any other length strikes a single crotchet chord.
const CROTCHET_FILLS: [&[Step]; 4] = [
    &[Strike(Minim)],
    &[Silence(Quaver), Strike(Crotchet), Silence(Quaver), Strike(Crotchet)],
    &[Strike(Minim), Silence(Crotchet), Strike(Crotchet)],
    &[Strike(Minim), Silence(Crotchet), Strike(Crotchet), Silence(Crotchet)],
];

/// Fills for quaver runs, lengths 1..=10. Longer runs have no fill.
const QUAVER_FILLS: [&[Step]; 10] = [
    &[Silence(Quaver)],
    &[Silence(Quaver), Strike(Quaver)],
    &[Strike(DottedCrotchet)],
    &[Silence(Crotchet), Strike(DottedCrotchet)],
    &[Silence(Quaver), Strike(Minim)],
    &[Strike(Crotchet), Silence(Quaver), Strike(Crotchet), Silence(Quaver)],
    &[Strike(Minim), Silence(Crotchet), Strike(Crotchet)],
    &[Strike(Minim), Silence(Crotchet), Strike(DottedCrotchet)],
    &[
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Crotchet),
        Strike(Minim),
    ],
    &[
        Strike(Minim),
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Quaver),
    ],
];

/// Fills for semiquaver runs, lengths 1..=20. Longer runs have no fill.
const SEMIQUAVER_FILLS: [&[Step]; 20] = [
    &[Silence(Semiquaver)],
    &[Silence(Quaver)],
    &[Silence(Quaver), Strike(Semiquaver)],
    &[Strike(Crotchet)],
    &[Silence(Semiquaver), Strike(Crotchet)],
    &[Silence(Crotchet), Strike(Quaver)],
    &[Silence(Crotchet), Silence(Semiquaver), Strike(Quaver)],
    &[Strike(Crotchet), Strike(Crotchet)],
    &[Strike(Crotchet), Silence(Semiquaver), Strike(Crotchet)],
    &[Silence(Quaver), Strike(Minim)],
    &[Strike(Minim), Silence(Semiquaver), Strike(Quaver)],
    &[Strike(Minim), Silence(Crotchet)],
    &[Strike(Minim), Silence(Semiquaver), Strike(Crotchet)],
    &[Silence(Quaver), Strike(Quaver), Strike(Quaver), Strike(Minim)],
    &[
        Silence(Quaver),
        Strike(Quaver),
        Silence(Semiquaver),
        Strike(Quaver),
        Strike(Minim),
    ],
    &[Silence(Quaver), Strike(Minim), Silence(Quaver), Strike(Crotchet)],
    &[
        Silence(Quaver),
        Strike(Minim),
        Silence(Quaver),
        Silence(Semiquaver),
        Strike(Crotchet),
    ],
    &[
        Strike(Minim),
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Quaver),
    ],
    &[
        Silence(Semiquaver),
        Strike(Minim),
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Quaver),
    ],
    &[
        Strike(Minim),
        Silence(Quaver),
        Strike(Crotchet),
        Silence(Quaver),
        Strike(Crotchet),
    ],
];

/// Tabulated fill for a run, if any.
fn fill_pattern(duration: Duration, run: usize) -> Option<&'static [Step]> {
    let (table, first): (&[&[Step]], usize) = match duration {
        Minim => (&MINIM_FILLS, 1),
        DottedCrotchet => (&DOTTED_CROTCHET_FILLS, 2),
        Crotchet => (&CROTCHET_FILLS, 2),
        Quaver => (&QUAVER_FILLS, 1),
        Semiquaver => (&SEMIQUAVER_FILLS, 1),
    };
    run.checked_sub(first).and_then(|i| table.get(i)).copied()
}

/// Build the three-voice chord on a degree: root position stacked from the
/// scale, base register 3, with voices that wrap past the key's root
/// lifted an octave.
pub fn chord_for(key: &Key, degree: Degree, duration: Duration) -> Chord {
    let voices = match degree {
        Degree::I => [(Degree::I, 0), (Degree::III, 0), (Degree::V, 0)],
        Degree::II => [(Degree::II, 0), (Degree::IV, 0), (Degree::VI, 0)],
        Degree::III => [(Degree::III, 0), (Degree::V, 0), (Degree::VII, 0)],
        Degree::IV => [(Degree::IV, 0), (Degree::VI, 0), (Degree::I, 1)],
        Degree::V => [(Degree::V, 0), (Degree::VII, 0), (Degree::II, 1)],
        Degree::VI => [(Degree::VI, 0), (Degree::I, 1), (Degree::III, 1)],
        Degree::VII => [(Degree::VII, 0), (Degree::II, 1), (Degree::IV, 1)],
    };
    Chord {
        voices: voices.map(|(d, lift)| Note {
            pitch: key.degree_pitch(d),
            velocity: 100,
            duration,
            register: 3 + lift,
        }),
    }
}

/// Accompaniment degree for a measure: the first note's raw pitch matched
/// against the upper degrees in order; tonic when nothing matches.
fn measure_degree(key: &Key, first: &Note) -> Degree {
    [
        Degree::II,
        Degree::III,
        Degree::IV,
        Degree::V,
        Degree::VI,
        Degree::VII,
    ]
    .into_iter()
    .find(|&d| key.degree_pitch(d) == first.pitch)
    .unwrap_or(Degree::I)
}

/// Expand every recorded measure of `melody` into its accompaniment and
/// play it into the sink. Requires the phrase map, so the melody's
/// perform() pass must already have run on its own track.
pub fn perform_harmony(melody: &Melody, sink: &mut impl EventSink) {
    for measure in 1..=melody.measures {
        let Some(phrase) = melody.phrases.get(&measure) else {
            continue;
        };
        let Some(first) = phrase.first() else {
            continue;
        };
        let degree = measure_degree(&melody.key, first);

        let mut expanded = [0usize; 5];
        for (index, current) in phrase.iter().enumerate() {
            if current.is_rest() {
                expanded = [0; 5];
                match current.duration {
                    Quaver => chord_for(&melody.key, degree, Quaver).play(sink),
                    _ => current.play(sink),
                }
                continue;
            }

            let class = current.duration;
            if expanded[class.index()] > 0 {
                continue;
            }
            let run = linked_run(&phrase[index..], class);
            expand_run(&melody.key, degree, class, run, sink);
            expanded = [0; 5];
            expanded[class.index()] = run;
        }
    }
}

/// Length of the run of consecutive non-rest notes of `duration` at the
/// head of `notes`.
fn linked_run(notes: &[Note], duration: Duration) -> usize {
    notes
        .iter()
        .take_while(|n| n.duration == duration && !n.is_rest())
        .count()
}

/// Emit the fill for one run: the tabulated pattern when there is one,
/// otherwise the per-class fallback.
fn expand_run(
    key: &Key,
    degree: Degree,
    duration: Duration,
    run: usize,
    sink: &mut impl EventSink,
) {
    if let Some(steps) = fill_pattern(duration, run) {
        for &step in steps {
            match step {
                Strike(d) => chord_for(key, degree, d).play(sink),
                Silence(d) => Note::rest(d).play(sink),
            }
        }
        return;
    }
    match duration {
        DottedCrotchet => {
            for _ in 0..run {
                chord_for(key, degree, DottedCrotchet).play(sink);
            }
        }
        Crotchet => chord_for(key, degree, Crotchet).play(sink),
        // Untabulated minim, quaver, and semiquaver runs are dropped.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody::Melody;
    use crate::mode::Mode;
    use crate::note;
    use crate::sink::{RecordingSink, SinkEvent};
    use std::collections::BTreeMap;

    fn c_ionian() -> Key {
        Key {
            scale: note::C,
            mode: Mode::Ionian,
        }
    }

    /// A melody whose single measure holds exactly `phrase`.
    fn one_measure(key: Key, phrase: Vec<Note>) -> Melody {
        let mut melody = Melody::from_hash("");
        melody.key = key;
        melody.measures = 1;
        melody.phrases = BTreeMap::from([(1, phrase)]);
        melody
    }

    fn chord_events(key: &Key, degree: Degree, duration: Duration) -> Vec<SinkEvent> {
        let mut sink = RecordingSink::new();
        chord_for(key, degree, duration).play(&mut sink);
        sink.events
    }

    #[test]
    fn test_chord_voicing_tables() {
        let chord = chord_for(&c_ionian(), Degree::I, Duration::Crotchet);
        let pitches: Vec<i32> = chord.voices.iter().map(|v| v.pitch).collect();
        assert_eq!(pitches, vec![0, 4, 7]);
        assert!(chord.voices.iter().all(|v| v.register == 3));
        assert!(chord.voices.iter().all(|v| v.velocity == 100));

        // Upper voices that wrap past the root get lifted an octave.
        let chord = chord_for(&c_ionian(), Degree::V, Duration::Crotchet);
        let keys: Vec<u8> = chord.voices.iter().map(|v| v.key()).collect();
        assert_eq!(keys, vec![43, 47, 50]); // G3, B3, D4

        let chord = chord_for(&c_ionian(), Degree::VII, Duration::Crotchet);
        let registers: Vec<i32> = chord.voices.iter().map(|v| v.register).collect();
        assert_eq!(registers, vec![3, 4, 4]);
    }

    #[test]
    fn test_measure_degree_matches_in_order() {
        let key = c_ionian();
        let first = Note::pitched(7, Duration::Crotchet);
        assert_eq!(measure_degree(&key, &first), Degree::V);
        let first = Note::pitched(4, Duration::Crotchet);
        assert_eq!(measure_degree(&key, &first), Degree::III);
        // Unmatched pitches fall back to the tonic chord.
        let first = Note::pitched(1, Duration::Crotchet);
        assert_eq!(measure_degree(&key, &first), Degree::I);
    }

    #[test]
    fn test_rest_sentinel_pitch_can_name_a_degree() {
        // In Db Ionian the seventh is 1 + 11 = 12, the rest sentinel.
        // A groove rest at the head of a measure therefore selects VII.
        let key = Key {
            scale: note::DB,
            mode: Mode::Ionian,
        };
        let rest = Note::rest(Duration::Quaver);
        assert_eq!(measure_degree(&key, &rest), Degree::VII);
    }

    #[test]
    fn test_two_crotchets_become_one_minim_chord() {
        let key = c_ionian();
        let phrase = vec![
            Note::pitched(7, Duration::Crotchet),
            Note::pitched(4, Duration::Crotchet),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert_eq!(sink.events, chord_events(&key, Degree::V, Duration::Minim));
    }

    #[test]
    fn test_run_expands_once_not_per_note() {
        // Three quavers: the tabulated fill is a single dotted-crotchet
        // chord, and the second and third notes must not re-trigger it.
        let key = c_ionian();
        let phrase = vec![
            Note::pitched(0, Duration::Quaver),
            Note::pitched(4, Duration::Quaver),
            Note::pitched(7, Duration::Quaver),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert_eq!(
            sink.events,
            chord_events(&key, Degree::I, Duration::DottedCrotchet)
        );
    }

    #[test]
    fn test_minim_run_of_one() {
        let key = c_ionian();
        let melody = one_measure(key, vec![Note::pitched(7, Duration::Minim)]);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        let mut expected = vec![SinkEvent::Silence(Duration::Quaver)];
        expected.extend(chord_events(&key, Degree::V, Duration::Crotchet));
        expected.push(SinkEvent::Silence(Duration::Quaver));
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_quaver_rest_becomes_quaver_chord() {
        let key = c_ionian();
        let phrase = vec![
            Note::rest(Duration::Quaver),
            Note::pitched(0, Duration::Crotchet),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        // Rest head: a quaver chord (degree I, since the rest pitch
        // matches no degree in C Ionian), then the lone crotchet's
        // fallback chord.
        let mut expected = chord_events(&key, Degree::I, Duration::Quaver);
        expected.extend(chord_events(&key, Degree::I, Duration::Crotchet));
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_non_quaver_rest_is_replayed_verbatim() {
        let key = c_ionian();
        let phrase = vec![
            Note::pitched(7, Duration::Crotchet),
            Note::rest(Duration::Crotchet),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        let mut expected = chord_events(&key, Degree::V, Duration::Crotchet);
        expected.push(SinkEvent::Silence(Duration::Crotchet));
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_rest_resets_run_bookkeeping() {
        // Minim, quaver rest, minim: the rest clears the minim counter,
        // so the second minim expands as a fresh run of one.
        let key = c_ionian();
        let phrase = vec![
            Note::pitched(7, Duration::Minim),
            Note::rest(Duration::Quaver),
            Note::pitched(7, Duration::Minim),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        let run_of_one = {
            let mut v = vec![SinkEvent::Silence(Duration::Quaver)];
            v.extend(chord_events(&key, Degree::V, Duration::Crotchet));
            v.push(SinkEvent::Silence(Duration::Quaver));
            v
        };
        let mut expected = run_of_one.clone();
        expected.extend(chord_events(&key, Degree::V, Duration::Quaver));
        expected.extend(run_of_one);
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_interleaved_classes_retrigger_after_reset() {
        // Quaver-pair, crotchet, quaver: expanding the crotchet clears
        // the quaver counter, so the trailing quaver expands as a run of
        // one (a lone eighth silence).
        let key = c_ionian();
        let phrase = vec![
            Note::pitched(0, Duration::Quaver),
            Note::pitched(4, Duration::Quaver),
            Note::pitched(7, Duration::Crotchet),
            Note::pitched(0, Duration::Quaver),
        ];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        let mut expected = vec![SinkEvent::Silence(Duration::Quaver)];
        expected.extend(chord_events(&key, Degree::I, Duration::Quaver));
        expected.extend(chord_events(&key, Degree::I, Duration::Crotchet));
        expected.push(SinkEvent::Silence(Duration::Quaver));
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_untabulated_runs() {
        let key = c_ionian();

        // Four minims: no fill at all.
        let phrase = vec![Note::pitched(7, Duration::Minim); 4];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert!(sink.events.is_empty());

        // A lone dotted crotchet strikes once per note.
        let melody = one_measure(key, vec![Note::pitched(7, Duration::DottedCrotchet)]);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert_eq!(
            sink.events,
            chord_events(&key, Degree::V, Duration::DottedCrotchet)
        );

        // Six crotchets: single crotchet chord fallback.
        let phrase = vec![Note::pitched(7, Duration::Crotchet); 6];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert_eq!(sink.events, chord_events(&key, Degree::V, Duration::Crotchet));
    }

    #[test]
    fn test_semiquaver_table_spot_checks() {
        let key = c_ionian();

        let phrase = vec![Note::pitched(7, Duration::Semiquaver); 10];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        let mut expected = vec![SinkEvent::Silence(Duration::Quaver)];
        expected.extend(chord_events(&key, Degree::V, Duration::Minim));
        assert_eq!(sink.events, expected);

        let phrase = vec![Note::pitched(7, Duration::Semiquaver); 20];
        let melody = one_measure(key, phrase);
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        let mut expected = chord_events(&key, Degree::V, Duration::Minim);
        expected.push(SinkEvent::Silence(Duration::Quaver));
        expected.extend(chord_events(&key, Degree::V, Duration::Crotchet));
        expected.push(SinkEvent::Silence(Duration::Quaver));
        expected.extend(chord_events(&key, Degree::V, Duration::Crotchet));
        assert_eq!(sink.events, expected);
    }

    #[test]
    fn test_measures_without_phrases_are_skipped() {
        let key = c_ionian();
        let mut melody = one_measure(key, vec![Note::pitched(7, Duration::Crotchet)]);
        // Claim more measures than the phrase map holds.
        melody.measures = 5;
        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);
        assert_eq!(sink.events, chord_events(&key, Degree::V, Duration::Crotchet));
    }

    #[test]
    fn test_end_to_end_minims_in_three_four() {
        // "0ccccccccccc0": six measures of minim + forced crotchet; each
        // expands as a minim run of one then a crotchet run of one,
        // everything on the fifth of C Ionian.
        let mut melody = Melody::from_hash("0ccccccccccc0");
        let mut lead = RecordingSink::new();
        melody.perform(&mut lead);

        let mut sink = RecordingSink::new();
        perform_harmony(&melody, &mut sink);

        let key = melody.key;
        let mut per_measure = vec![SinkEvent::Silence(Duration::Quaver)];
        per_measure.extend(chord_events(&key, Degree::V, Duration::Crotchet));
        per_measure.push(SinkEvent::Silence(Duration::Quaver));
        per_measure.extend(chord_events(&key, Degree::V, Duration::Crotchet));
        let expected: Vec<SinkEvent> = per_measure
            .iter()
            .copied()
            .cycle()
            .take(per_measure.len() * 6)
            .collect();
        assert_eq!(sink.events, expected);
    }
}
