// Hashtune Music Generator
//
// Turns an arbitrary hexadecimal-like string (a "hash") into a complete
// musical composition: a time signature, a scale and mode, a melody
// segmented into measures with boundary "groove" correction, and a chord
// accompaniment expanded from fixed rhythmic fill patterns. Generation is
// a pure function of the input string: the same hash always produces the
// same composition.
//
// Architecture:
// - classify.rs: symbol frequency ranking over the 16-symbol hash alphabet
// - meter.rs: time signature from leading zeros + 1-based measure indexing
// - mode.rs: the seven modes, scale degrees, key selection and resolution
// - note.rs: pitch constants, durations, Note/Chord playback primitives
// - melody.rs: note synthesis from the hash + the measure/groove pass
// - harmony.rs: diatonic chord construction and rhythm-fill expansion
// - sink.rs: the event-sink contract the generator plays into
// - midi.rs: midly-backed sink implementation and SMF file assembly
//
// Ordering matters within one composition: the melody pass records the
// per-measure phrase map that the harmony pass expands, so perform()
// always runs before perform_harmony() on a given Melody.

pub mod classify;
pub mod harmony;
pub mod melody;
pub mod meter;
pub mod midi;
pub mod mode;
pub mod note;
pub mod sink;
