//! End-to-end tests feeding synthetic bass notes through the tracker.

use std::f32::consts::PI;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bassbud_core::{AnalyzerConfig, BassTracker, LockedPitch};

const SAMPLE_RATE: f32 = 44_100.0;
const BLOCK: usize = 2048;

/// Phase-continuous sine generator.
struct Sine {
    phase: f32,
}

impl Sine {
    fn new() -> Self {
        Self { phase: 0.0 }
    }

    fn block(&mut self, freq: f32, len: usize) -> Vec<f32> {
        let step = 2.0 * PI * freq / SAMPLE_RATE;
        (0..len)
            .map(|_| {
                let s = 0.8 * self.phase.sin();
                self.phase = (self.phase + step) % (2.0 * PI);
                s
            })
            .collect()
    }
}

fn tracker() -> BassTracker {
    BassTracker::prepare(&AnalyzerConfig::default(), SAMPLE_RATE, BLOCK).unwrap()
}

fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= expected * tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}

#[test]
fn raw_estimates_track_sines_after_settling() {
    for freq in [41.2_f32, 55.0, 73.42, 98.0, 146.83, 196.0, 392.0] {
        let mut tracker =
            BassTracker::prepare(&AnalyzerConfig::default(), SAMPLE_RATE, 4096).unwrap();
        let mut sine = Sine::new();
        for _ in 0..3 {
            tracker.process_block(&sine.block(freq, 4096));
        }
        let raw = tracker
            .last_raw_pitch()
            .unwrap_or_else(|| panic!("no estimate for {freq} Hz"));
        assert_close(raw, freq, 0.01);
    }
}

#[test]
fn two_frames_do_not_lock() {
    let mut tracker = tracker();
    let mut sine = Sine::new();
    for _ in 0..2 {
        tracker.process_block(&sine.block(110.0, BLOCK));
    }
    assert_eq!(tracker.current(), LockedPitch::unknown());
    assert_eq!(tracker.reading().load(), LockedPitch::unknown());
}

#[test]
fn sustained_note_locks_and_maps_to_fretboard() {
    let mut tracker = tracker();
    let reading = tracker.reading();
    let mut sine = Sine::new();
    for _ in 0..8 {
        tracker.process_block(&sine.block(110.0, BLOCK));
    }

    let locked = reading.load();
    assert_close(locked.pitch, 110.0, 0.01);
    assert_eq!(locked.note_label(), "A2");
    assert_eq!(locked.string_index(), 0);
    assert_eq!(locked.fret_index(), 2);
    assert_eq!(locked, tracker.current());
}

#[test]
fn low_e_locks_on_open_fourth_string() {
    let mut tracker = tracker();
    let mut sine = Sine::new();
    for _ in 0..8 {
        tracker.process_block(&sine.block(41.2, BLOCK));
    }
    let locked = tracker.current();
    assert_eq!(locked.note_label(), "E1");
    assert_eq!(locked.string_index(), 3);
    assert_eq!(locked.fret_index(), 0);
}

#[test]
fn octave_jump_needs_fresh_agreement() {
    let mut tracker = tracker();
    let mut sine = Sine::new();
    for _ in 0..8 {
        tracker.process_block(&sine.block(110.0, BLOCK));
    }
    let before = tracker.current();
    assert_eq!(before.note_label(), "A2");

    tracker.process_block(&sine.block(220.0, BLOCK));
    assert_eq!(tracker.current(), before);
    assert_eq!(tracker.stabilizer().stable_frames(), 0);
    assert_close(tracker.stabilizer().smoothed_pitch(), 220.0, 0.01);

    // Two agreeing frames after the jump keep the previous lock published.
    for _ in 0..2 {
        tracker.process_block(&sine.block(220.0, BLOCK));
        assert_eq!(tracker.current(), before);
        assert_eq!(tracker.reading().load(), before);
    }

    // The third commits the new pitch.
    tracker.process_block(&sine.block(220.0, BLOCK));
    assert_eq!(tracker.current().note_label(), "A3");
    assert_close(tracker.current().pitch, 220.0, 0.01);
}

#[test]
fn silence_fades_then_clears() {
    let mut tracker = tracker();
    let mut sine = Sine::new();
    for _ in 0..8 {
        tracker.process_block(&sine.block(110.0, BLOCK));
    }
    let locked = tracker.current();
    assert!(locked.is_known());

    let silence = vec![0.0; BLOCK];
    // 110 Hz decays by 0.9 per frame and drops below 30 Hz on the 13th frame.
    for _ in 0..12 {
        tracker.process_block(&silence);
    }
    assert_eq!(tracker.current(), locked);
    assert!(tracker.stabilizer().is_tracking());

    tracker.process_block(&silence);
    let cleared = tracker.reading().load();
    assert_eq!(cleared, LockedPitch::unknown());
    assert_eq!(cleared.note_label(), "---");
    assert_eq!(cleared.string_index(), -1);
    assert_eq!(cleared.fret_index(), -1);
}

#[test]
fn reader_thread_sees_published_readings() {
    let mut tracker = tracker();
    let reading = tracker.reading();
    let done = Arc::new(AtomicBool::new(false));

    let poller = {
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut seen = Vec::new();
            while !done.load(Ordering::Acquire) {
                let current = reading.load();
                if current.is_known() {
                    assert!(current.note.is_some());
                    assert!(current.position.is_some());
                }
                seen.push(current);
                std::thread::yield_now();
            }
            seen.push(reading.load());
            seen
        })
    };

    let mut sine = Sine::new();
    for _ in 0..10 {
        tracker.process_block(&sine.block(73.42, BLOCK));
    }
    done.store(true, Ordering::Release);

    let seen = poller.join().unwrap();
    assert_eq!(seen.last().map(|r| r.note_label()).as_deref(), Some("D2"));
}

/// Captures everything a subscriber writes, tagged with the writing thread.
#[derive(Clone, Default)]
struct RecordingWriter {
    writes: Arc<Mutex<Vec<String>>>,
}

impl io::Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let thread = std::thread::current().name().unwrap_or("unnamed").to_string();
        let text = String::from_utf8_lossy(buf).into_owned();
        self.writes.lock().unwrap().push(format!("{thread}: {text}"));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn processing_thread_never_logs() {
    let recorder = RecordingWriter::default();
    let writes = Arc::clone(&recorder.writes);

    let worker = std::thread::Builder::new()
        .name("audio-rt".into())
        .spawn(move || {
            let mut tracker = tracker();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_writer(move || recorder.clone())
                .finish();

            tracing::subscriber::with_default(subscriber, || {
                let mut sine = Sine::new();
                // Lock, then fade out and clear.
                for _ in 0..8 {
                    tracker.process_block(&sine.block(110.0, BLOCK));
                }
                let silence = vec![0.0; BLOCK];
                for _ in 0..16 {
                    tracker.process_block(&silence);
                }
            });
            tracker.current()
        })
        .unwrap();

    let last = worker.join().unwrap();
    assert_eq!(last, LockedPitch::unknown());
    let writes = writes.lock().unwrap();
    assert!(writes.is_empty(), "log output from the processing thread: {writes:?}");
}
