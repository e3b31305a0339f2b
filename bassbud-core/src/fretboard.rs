//! Fretboard geometry and the root/mode highlighting derived from the locked note.

use once_cell::sync::Lazy;

use crate::scale::ScaleMode;
use crate::tuning::{FretPosition, Note, OpenString, STRING_COUNT};

/// Highest fret shown by the fretboard display (frets `0..=7`).
pub const DEFAULT_FRET_COUNT: u32 = 7;

/// Open-string notes of standard bass tuning (G2 D2 A1 E1), highest first.
static STANDARD_OPEN_NOTES: Lazy<[Note; STRING_COUNT]> =
    Lazy::new(|| [-26, -31, -36, -41].map(Note::from_semitones_from_a4));

/// How a fretboard position should be marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    /// Same pitch class as the locked note.
    Root,
    /// In the selected mode built on the locked note.
    InMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fretboard {
    open_notes: [Note; STRING_COUNT],
    frets: u32,
}

impl Fretboard {
    /// Standard-tuned bass showing frets `0..=DEFAULT_FRET_COUNT`.
    pub fn standard() -> Self {
        Self {
            open_notes: *STANDARD_OPEN_NOTES,
            frets: DEFAULT_FRET_COUNT,
        }
    }

    /// Builds a fretboard from a tuning table. Returns `None` if any open
    /// string has no valid frequency.
    pub fn from_tuning(tuning: &[OpenString; STRING_COUNT], frets: u32) -> Option<Self> {
        let mut open_notes = *STANDARD_OPEN_NOTES;
        for (slot, string) in open_notes.iter_mut().zip(tuning) {
            *slot = string.note()?;
        }
        Some(Self { open_notes, frets })
    }

    pub fn open_notes(&self) -> &[Note; STRING_COUNT] {
        &self.open_notes
    }

    /// Note sounding at `string`/`fret`, or `None` off the board.
    pub fn note_at(&self, position: FretPosition) -> Option<Note> {
        if position.fret > self.frets {
            return None;
        }
        let open = self.open_notes.get(position.string)?;
        Some(open.transpose(position.fret as i32))
    }

    /// Every position on the board, string-major.
    pub fn positions(&self) -> impl Iterator<Item = FretPosition> + '_ {
        (0..STRING_COUNT)
            .flat_map(move |string| (0..=self.frets).map(move |fret| FretPosition { string, fret }))
    }

    /// Marks every position as root, mode member or nothing for the locked note.
    ///
    /// The result is indexed `[string][fret]`. Without a locked note, or when
    /// the root does not appear on the board, nothing is highlighted.
    pub fn highlights(&self, locked: Option<Note>, mode: ScaleMode) -> Vec<Vec<Highlight>> {
        let mut grid = vec![vec![Highlight::None; self.frets as usize + 1]; STRING_COUNT];
        let Some(root_note) = locked else {
            return grid;
        };
        let root = root_note.pitch_class;

        let mut root_found = false;
        for position in self.positions() {
            if let Some(note) = self.note_at(position) {
                if note.same_pitch_class(root_note) {
                    grid[position.string][position.fret as usize] = Highlight::Root;
                    root_found = true;
                }
            }
        }
        if !root_found {
            return grid;
        }

        for position in self.positions() {
            let cell = &mut grid[position.string][position.fret as usize];
            if *cell == Highlight::Root {
                continue;
            }
            if let Some(note) = self.note_at(position) {
                if mode.contains(root, note.pitch_class) {
                    *cell = Highlight::InMode;
                }
            }
        }
        grid
    }
}

impl Default for Fretboard {
    fn default() -> Self {
        Self::standard()
    }
}

/// Note at a position of the standard fretboard.
pub fn note_at_position(string: usize, fret: u32) -> Option<Note> {
    Fretboard::standard().note_at(FretPosition { string, fret })
}
