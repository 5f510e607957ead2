//! Audio cue notifications at the warning threshold and at round end.

use serde::Serialize;
use std::sync::Mutex;

pub trait ToneEmitter: Send + Sync {
    fn emit(&self, frequency_hz: u32, duration_ms: u32);
}

/// A tone to play.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Cue {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

pub const WARNING_TONE: Cue = Cue {
    frequency_hz: 880,
    duration_ms: 250,
};

pub const END_TONE: Cue = Cue {
    frequency_hz: 440,
    duration_ms: 900,
};

/// Logs each tone.
pub struct LogToneEmitter;

impl ToneEmitter for LogToneEmitter {
    fn emit(&self, frequency_hz: u32, duration_ms: u32) {
        log::debug!("Tone {} Hz for {} ms", frequency_hz, duration_ms);
    }
}

/// Keeps the latest cue and a sequence number so a polling page knows when to play it.
#[derive(Default)]
pub struct CueBoard {
    latest: Mutex<Option<(u64, Cue)>>,
}

impl CueBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<(u64, Cue)> {
        self.latest.lock().ok().and_then(|g| *g)
    }
}

impl ToneEmitter for CueBoard {
    fn emit(&self, frequency_hz: u32, duration_ms: u32) {
        log::debug!("Cue {} Hz for {} ms", frequency_hz, duration_ms);
        if let Ok(mut g) = self.latest.lock() {
            let seq = (*g).map_or(1, |(s, _)| s + 1);
            *g = Some((
                seq,
                Cue {
                    frequency_hz,
                    duration_ms,
                },
            ));
        }
    }
}
