// bassbud-core/src/lib.rs

//! The core logic for the BassBud fretboard trainer.
//! This crate is responsible for audio capture, pitch detection, pitch
//! stabilization and the music theory behind the fretboard display
//! (note names, string/fret positions, diatonic modes). It is completely
//! headless and contains no rendering code.

pub mod audio;
pub mod config;
pub mod filter;
pub mod fretboard;
pub mod pitch;
pub mod scale;
pub mod snapshot;
pub mod stabilizer;
pub mod tracker;
pub mod tuning;

pub use config::{AnalyzerConfig, ConfigError};
pub use scale::ScaleMode;
pub use snapshot::{LockedPitch, SharedReading};
pub use tracker::BassTracker;
pub use tuning::{FretPosition, Note, OpenString, PitchClass};
