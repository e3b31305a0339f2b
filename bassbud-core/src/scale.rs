//! # Scale and Mode Module
//!
//! The seven diatonic modes and the membership test used to highlight the
//! fretboard. All tables are static; every function here is pure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tuning::PitchClass;

/// Semitone offsets from the root for each mode, in [`ScaleMode::ALL`] order.
pub const MODE_INTERVALS: [[u8; 7]; 7] = [
    [0, 2, 4, 5, 7, 9, 11], // Ionian
    [0, 2, 3, 5, 7, 9, 10], // Dorian
    [0, 1, 3, 5, 7, 8, 10], // Phrygian
    [0, 2, 4, 6, 7, 9, 11], // Lydian
    [0, 2, 4, 5, 7, 9, 10], // Mixolydian
    [0, 2, 3, 5, 7, 8, 10], // Aeolian
    [0, 1, 3, 5, 6, 8, 10], // Locrian
];

/// One of the seven rotations of the major scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScaleMode {
    #[default]
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 7] = [
        ScaleMode::Ionian,
        ScaleMode::Dorian,
        ScaleMode::Phrygian,
        ScaleMode::Lydian,
        ScaleMode::Mixolydian,
        ScaleMode::Aeolian,
        ScaleMode::Locrian,
    ];

    /// Maps a selector index to a mode; anything outside `0..=6` is `None`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Accepts a mode name ("dorian", "Aeolian") or a selector index ("3").
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(index) = text.trim().parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.short_name().eq_ignore_ascii_case(text.trim()))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn intervals(self) -> &'static [u8; 7] {
        &MODE_INTERVALS[self.index()]
    }

    pub fn short_name(self) -> &'static str {
        match self {
            ScaleMode::Ionian => "Ionian",
            ScaleMode::Dorian => "Dorian",
            ScaleMode::Phrygian => "Phrygian",
            ScaleMode::Lydian => "Lydian",
            ScaleMode::Mixolydian => "Mixolydian",
            ScaleMode::Aeolian => "Aeolian",
            ScaleMode::Locrian => "Locrian",
        }
    }

    /// Name as shown in the mode selector.
    pub fn display_name(self) -> &'static str {
        match self {
            ScaleMode::Ionian => "Ionian (Major)",
            ScaleMode::Aeolian => "Aeolian (Natural Minor)",
            other => other.short_name(),
        }
    }

    /// Whether `note` belongs to this mode built on `root`.
    pub fn contains(self, root: PitchClass, note: PitchClass) -> bool {
        self.intervals().contains(&note.interval_from(root))
    }

    /// The seven pitch classes of this mode on `root`, in scale order.
    pub fn pitch_classes(self, root: PitchClass) -> [PitchClass; 7] {
        let intervals = *self.intervals();
        intervals.map(|interval| root.transpose(i32::from(interval)))
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Label-level membership test: is `note` in mode `mode_index` built on `root`?
///
/// Both labels may carry an octave ("C#3"), which is ignored. Unknown names
/// and mode indices outside `0..=6` report `false`.
pub fn is_note_in_mode(note: &str, root: &str, mode_index: usize) -> bool {
    let (Some(note), Some(root), Some(mode)) = (
        PitchClass::from_label(note),
        PitchClass::from_label(root),
        ScaleMode::from_index(mode_index),
    ) else {
        return false;
    };
    mode.contains(root, note)
}

/// Octave-insensitive label comparison used for root matching.
///
/// Labels that do not name a note ("---") never match.
pub fn is_note_match(current: &str, candidate: &str) -> bool {
    match (PitchClass::from_label(current), PitchClass::from_label(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
