//! The externally visible reading and its lock-free publication.
//!
//! The real-time path is the only writer; display code polls from any
//! thread. The whole reading is packed into one `AtomicU64` so a reader
//! always sees a complete record from a single frame.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tuning::{FretPosition, NO_NOTE, Note, PitchClass};

const UNKNOWN: u8 = u8::MAX;
/// Largest fret that can be published.
pub const MAX_PUBLISHED_FRET: u32 = (UNKNOWN - 1) as u32;

/// The locked pitch and its mapping onto notes and the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LockedPitch {
    /// Locked pitch in Hz, `0.0` when unknown.
    pub pitch: f32,
    pub note: Option<Note>,
    pub position: Option<FretPosition>,
}

impl LockedPitch {
    /// The cleared reading: no pitch, no note, no position.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.pitch > 0.0
    }

    /// Note label such as "E1", or `"---"`.
    pub fn note_label(&self) -> String {
        self.note.map_or_else(|| NO_NOTE.to_string(), |n| n.to_string())
    }

    /// String index `0..=3`, or `-1` when unknown.
    pub fn string_index(&self) -> i32 {
        self.position.map_or(-1, |p| p.string as i32)
    }

    /// Fret number, or `-1` when unknown.
    pub fn fret_index(&self) -> i32 {
        self.position.map_or(-1, |p| p.fret as i32)
    }

    fn pack(&self) -> u64 {
        let pitch = if self.pitch.is_finite() && self.pitch > 0.0 {
            self.pitch
        } else {
            0.0
        };
        let (string, fret) = match self.position {
            Some(p) if p.string < usize::from(UNKNOWN) => {
                (p.string as u8, p.fret.min(MAX_PUBLISHED_FRET) as u8)
            }
            _ => (UNKNOWN, UNKNOWN),
        };
        let (class, octave) = match self.note {
            Some(n) => (n.pitch_class.index(), n.octave.clamp(-128, 127) as i8 as u8),
            None => (UNKNOWN, 0),
        };
        u64::from(pitch.to_bits())
            | u64::from(fret) << 32
            | u64::from(string) << 40
            | u64::from(class) << 48
            | u64::from(octave) << 56
    }

    fn unpack(bits: u64) -> Self {
        let byte = |shift: u32| (bits >> shift) as u8;
        let pitch = f32::from_bits(bits as u32);
        let (fret, string, class, octave) = (byte(32), byte(40), byte(48), byte(56));

        let position = (string != UNKNOWN).then(|| FretPosition {
            string: usize::from(string),
            fret: u32::from(fret),
        });
        let note = PitchClass::new(class).map(|pitch_class| Note {
            pitch_class,
            octave: i32::from(octave as i8),
        });
        Self { pitch, note, position }
    }
}

/// Single-writer, multi-reader slot holding the latest [`LockedPitch`].
#[derive(Debug)]
pub struct SharedReading {
    bits: AtomicU64,
}

impl SharedReading {
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(LockedPitch::unknown().pack()),
        }
    }

    pub fn publish(&self, reading: &LockedPitch) {
        self.bits.store(reading.pack(), Ordering::Release);
    }

    pub fn load(&self) -> LockedPitch {
        LockedPitch::unpack(self.bits.load(Ordering::Acquire))
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn reading(pitch: f32, note: &str, string: usize, fret: u32) -> LockedPitch {
        LockedPitch {
            pitch,
            note: Note::parse(note),
            position: Some(FretPosition { string, fret }),
        }
    }

    #[test]
    fn starts_unknown_with_sentinels() {
        let shared = SharedReading::new();
        let current = shared.load();
        assert_eq!(current, LockedPitch::unknown());
        assert_eq!(current.pitch, 0.0);
        assert_eq!(current.note_label(), "---");
        assert_eq!(current.string_index(), -1);
        assert_eq!(current.fret_index(), -1);
        assert!(!current.is_known());
    }

    #[test]
    fn publishes_whole_records() {
        let shared = SharedReading::new();
        let locked = reading(41.2, "E1", 3, 0);
        shared.publish(&locked);
        assert_eq!(shared.load(), locked);
        assert_eq!(shared.load().note_label(), "E1");
        assert_eq!(shared.load().string_index(), 3);
        assert_eq!(shared.load().fret_index(), 0);

        shared.publish(&LockedPitch::unknown());
        assert_eq!(shared.load(), LockedPitch::unknown());
    }

    #[test]
    fn negative_octaves_survive_packing() {
        let shared = SharedReading::new();
        let locked = reading(8.0, "C-1", 3, 0);
        shared.publish(&locked);
        assert_eq!(shared.load().note_label(), "C-1");
    }

    #[test]
    fn readers_never_see_mixed_records() {
        let shared = Arc::new(SharedReading::new());
        let a = reading(55.0, "A1", 2, 0);
        let b = reading(98.0, "G2", 0, 0);

        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for i in 0..20_000 {
                    shared.publish(if i % 2 == 0 { &a } else { &b });
                }
            })
        };
        for _ in 0..20_000 {
            let seen = shared.load();
            assert!(seen == a || seen == b || seen == LockedPitch::unknown(), "{seen:?}");
        }
        writer.join().unwrap();
    }
}
