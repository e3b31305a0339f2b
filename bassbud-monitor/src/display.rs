//! Text formatting of readings for the terminal.

use std::fmt;

use bassbud_core::fretboard::{Fretboard, Highlight};
use bassbud_core::{LockedPitch, Note, ScaleMode};
use serde::Serialize;

/// One printed reading, with the sentinel encoding consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingLine {
    pub pitch: f32,
    pub note: String,
    pub string: i32,
    pub fret: i32,
    pub mode: &'static str,
    /// Pitch classes of the mode built on the locked note; empty when unknown.
    pub mode_notes: Vec<&'static str>,
}

impl ReadingLine {
    pub fn new(reading: &LockedPitch, mode: ScaleMode) -> Self {
        let mode_notes = reading
            .note
            .map(|note| {
                mode.pitch_classes(note.pitch_class)
                    .iter()
                    .map(|pc| pc.name())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            pitch: reading.pitch,
            note: reading.note_label(),
            string: reading.string_index(),
            fret: reading.fret_index(),
            mode: mode.display_name(),
            mode_notes,
        }
    }
}

impl fmt::Display for ReadingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Note: {}  Frequency: {:.2} Hz", self.note, self.pitch)?;
        if self.string >= 0 {
            write!(f, "  String: {}  Fret: {}", self.string, self.fret)?;
        }
        if !self.mode_notes.is_empty() {
            write!(f, "  {}: {}", self.mode, self.mode_notes.join(" "))?;
        }
        Ok(())
    }
}

/// Draws the board one string per line: `R` root, `o` mode note, `-` other.
pub fn render_fretboard(board: &Fretboard, locked: Option<Note>, mode: ScaleMode) -> String {
    let grid = board.highlights(locked, mode);
    let mut out = String::new();
    for (open, row) in board.open_notes().iter().zip(&grid) {
        out.push_str(&format!("{:<2}|", open.pitch_class.name()));
        for cell in row {
            out.push_str(match cell {
                Highlight::Root => " R ",
                Highlight::InMode => " o ",
                Highlight::None => " - ",
            });
        }
        out.push_str("|\n");
    }
    out
}
