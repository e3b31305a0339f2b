//! # Musical Tuning Module
//!
//! This module maps frequencies onto the musical and physical coordinates used
//! by the fretboard display: note names with octaves, and the closest open
//! string and fret of a 4-string bass.
//!
//! ## Features
//! - Equal temperament note naming relative to A4 = 440 Hz
//! - Pitch classes (note names without octave) for root matching
//! - Closest-string selection by log-frequency distance
//! - Fret index calculation relative to the chosen open string
//! - Parsing of note labels such as "C#3" or "E1"

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference pitch for note naming.
pub const A4_HZ: f32 = 440.0;
/// Number of strings on the instrument.
pub const STRING_COUNT: usize = 4;
/// Placeholder shown when no note is known.
pub const NO_NOTE: &str = "---";

/// Chromatic note names, index 0 is C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Semitone offset of A within an octave that starts at C.
const A_OFFSET: i32 = 9;

/// A note name without octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const E: PitchClass = PitchClass(4);
    pub const A: PitchClass = PitchClass(9);

    /// Returns `None` for indices outside `0..12`.
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < NOTE_NAMES.len()).then_some(Self(index))
    }

    /// Wraps any semitone count (including negative ones) into a pitch class.
    pub fn from_semitone(semitone: i32) -> Self {
        Self(semitone.rem_euclid(12) as u8)
    }

    /// Looks a bare note name ("C", "F#") up in the chromatic table.
    pub fn from_name(name: &str) -> Option<Self> {
        NOTE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| Self(i as u8))
    }

    /// Extracts the pitch class from a label by stripping its octave ("C#3" -> C#).
    ///
    /// A bare name without octave is accepted too. Unknown names yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let name = label.trim_end_matches(|c: char| c.is_ascii_digit());
        let name = name.strip_suffix('-').unwrap_or(name);
        Self::from_name(name)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[usize::from(self.0)]
    }

    /// Semitone distance from `root` up to `self`, in `0..12`.
    pub fn interval_from(self, root: PitchClass) -> u8 {
        ((i32::from(self.0) - i32::from(root.0) + 12) % 12) as u8
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_semitone(i32::from(self.0) + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A musical note: pitch class plus octave, in scientific pitch notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    /// Rebuilds a note from its signed semitone distance to A4.
    pub fn from_semitones_from_a4(semitones: i32) -> Self {
        let from_c4 = semitones + A_OFFSET;
        Self {
            pitch_class: PitchClass::from_semitone(from_c4),
            octave: 4 + from_c4.div_euclid(12),
        }
    }

    /// Finds the nearest equal-tempered note to a frequency.
    ///
    /// Returns `None` for non-positive or non-finite frequencies.
    pub fn from_frequency(freq: f32) -> Option<Self> {
        semitones_from_a4(freq).map(Self::from_semitones_from_a4)
    }

    /// Parses labels like "A4", "C#3" or "B-1".
    pub fn parse(label: &str) -> Option<Self> {
        let split = label
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .unwrap_or(label.len());
        let (name, octave) = label.split_at(split);
        Some(Self {
            pitch_class: PitchClass::from_name(name)?,
            octave: octave.parse().ok()?,
        })
    }

    pub fn semitones_from_a4(self) -> i32 {
        (self.octave - 4) * 12 + i32::from(self.pitch_class.index()) - A_OFFSET
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_semitones_from_a4(self.semitones_from_a4() + semitones)
    }

    /// Equal temperament frequency of this note.
    pub fn frequency(self) -> f32 {
        A4_HZ * 2.0_f32.powf(self.semitones_from_a4() as f32 / 12.0)
    }

    /// Octave-insensitive comparison, used for root matching.
    pub fn same_pitch_class(self, other: Note) -> bool {
        self.pitch_class == other.pitch_class
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Rounded semitone distance from A4, or `None` when the log is undefined.
pub fn semitones_from_a4(freq: f32) -> Option<i32> {
    if !(freq.is_finite() && freq > 0.0) {
        return None;
    }
    Some((12.0 * (freq / A4_HZ).log2()).round() as i32)
}

/// Converts a frequency to a label such as "A4", or `"---"` when undefined.
pub fn frequency_to_note_name(freq: f32) -> String {
    match Note::from_frequency(freq) {
        Some(note) => note.to_string(),
        None => NO_NOTE.to_string(),
    }
}

/// An open string, identified by its nominal frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenString {
    pub frequency: f32,
}

impl OpenString {
    pub const fn new(frequency: f32) -> Self {
        Self { frequency }
    }

    /// The note this string sounds when played open.
    pub fn note(self) -> Option<Note> {
        Note::from_frequency(self.frequency)
    }
}

/// Standard 4-string bass tuning, highest string first: G D A E.
///
/// String indices everywhere in this crate follow this order, so index 3
/// is the low E string.
pub const STANDARD_BASS_TUNING: [OpenString; STRING_COUNT] = [
    OpenString::new(98.00),
    OpenString::new(73.42),
    OpenString::new(55.00),
    OpenString::new(41.20),
];

/// A string/fret coordinate on the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FretPosition {
    /// Index into the tuning table (0 = highest string).
    pub string: usize,
    /// Fret number, 0 = open. Never negative.
    pub fret: u32,
}

/// Finds the open string whose pitch is closest to `pitch` in log-frequency.
///
/// Ties keep the earlier (higher) string. Strings with a non-positive
/// frequency are skipped; `None` is returned if the pitch itself is invalid.
pub fn closest_string(pitch: f32, tuning: &[OpenString]) -> Option<usize> {
    if !(pitch.is_finite() && pitch > 0.0) {
        return None;
    }

    let mut closest = None;
    let mut min_distance = f32::MAX;
    for (index, string) in tuning.iter().enumerate() {
        if !(string.frequency > 0.0) {
            continue;
        }
        let distance = (pitch / string.frequency).log2().abs();
        if distance < min_distance {
            min_distance = distance;
            closest = Some(index);
        }
    }
    closest
}

/// Maps a pitch to the closest string and the nearest fret on it.
///
/// Pitches below the chosen open string are clamped to fret 0.
pub fn fret_position(pitch: f32, tuning: &[OpenString]) -> Option<FretPosition> {
    let string = closest_string(pitch, tuning)?;
    let semitones = 12.0 * (pitch / tuning[string].frequency).log2();
    Some(FretPosition {
        string,
        fret: semitones.round().max(0.0) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_reference_and_low_e() {
        assert_eq!(frequency_to_note_name(440.0), "A4");
        assert_eq!(frequency_to_note_name(41.20), "E1");
        assert_eq!(frequency_to_note_name(261.63), "C4");
        assert_eq!(frequency_to_note_name(98.0), "G2");
    }

    #[test]
    fn octave_rolls_down_with_floor_division() {
        // B3 is two semitones below C4, which must not be reported as B4.
        assert_eq!(frequency_to_note_name(246.94), "B3");
        assert_eq!(frequency_to_note_name(55.0), "A1");
        assert_eq!(frequency_to_note_name(32.70), "C1");
        assert_eq!(frequency_to_note_name(30.87), "B0");
    }

    #[test]
    fn undefined_frequencies_are_placeholders() {
        assert_eq!(frequency_to_note_name(0.0), NO_NOTE);
        assert_eq!(frequency_to_note_name(-10.0), NO_NOTE);
        assert_eq!(frequency_to_note_name(f32::NAN), NO_NOTE);
    }

    #[test]
    fn low_e_resolves_to_open_fourth_string() {
        let position = fret_position(41.20, &STANDARD_BASS_TUNING).unwrap();
        assert_eq!(position, FretPosition { string: 3, fret: 0 });
    }

    #[test]
    fn fretted_notes_pick_nearest_string() {
        // C3 sits closest to the open G string, five frets up.
        let c3 = Note::parse("C3").unwrap().frequency();
        assert_eq!(
            fret_position(c3, &STANDARD_BASS_TUNING),
            Some(FretPosition { string: 0, fret: 5 })
        );
        // 45 Hz is just above low E; it rounds to fret 2 of that string.
        assert_eq!(
            fret_position(46.25, &STANDARD_BASS_TUNING),
            Some(FretPosition { string: 3, fret: 2 })
        );
    }

    #[test]
    fn fret_never_negative() {
        let position = fret_position(40.0, &STANDARD_BASS_TUNING).unwrap();
        assert_eq!(position.string, 3);
        assert_eq!(position.fret, 0);
        assert_eq!(fret_position(0.0, &STANDARD_BASS_TUNING), None);
    }

    #[test]
    fn labels_parse_and_strip_octaves() {
        assert_eq!(PitchClass::from_label("C#3"), PitchClass::from_name("C#"));
        assert_eq!(PitchClass::from_label("E"), Some(PitchClass::E));
        assert_eq!(PitchClass::from_label("A-1"), Some(PitchClass::A));
        assert_eq!(PitchClass::from_label("---"), None);
        assert_eq!(PitchClass::from_label("H2"), None);

        let note = Note::parse("F#2").unwrap();
        assert_eq!(note.pitch_class.name(), "F#");
        assert_eq!(note.octave, 2);
        assert_eq!(Note::parse("B-1").map(|n| n.octave), Some(-1));
        assert_eq!(Note::parse("X4"), None);
    }

    #[test]
    fn note_frequency_matches_naming() {
        for semitones in -48..24 {
            let note = Note::from_semitones_from_a4(semitones);
            assert_eq!(note.semitones_from_a4(), semitones);
            assert_eq!(Note::from_frequency(note.frequency()), Some(note));
        }
    }

    #[test]
    fn intervals_wrap_upwards() {
        let c = PitchClass::C;
        let b = PitchClass::from_name("B").unwrap();
        assert_eq!(b.interval_from(c), 11);
        assert_eq!(c.interval_from(b), 1);
        assert_eq!(c.transpose(-1), b);
    }

    #[test]
    fn open_strings_are_named_consistently() {
        let names: Vec<String> = STANDARD_BASS_TUNING
            .iter()
            .map(|s| s.note().unwrap().to_string())
            .collect();
        assert_eq!(names, ["G2", "D2", "A1", "E1"]);
    }
}
