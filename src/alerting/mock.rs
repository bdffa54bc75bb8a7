//! Recording alert backends for testing and development

use crate::alerting::{HapticDevice, SpeechSynthesizer, Utterance, VoiceInfo};
use std::sync::{Arc, Mutex};

/// Call observed by a [`RecordingSynthesizer`]
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    Cancel,
    Speak(Utterance),
}

/// Shared view of the calls a recording backend received
#[derive(Debug, Clone)]
pub struct CallLog<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> CallLog<T> {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(&self, call: T) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CallLog<SpeechCall> {
    /// Texts that were actually spoken, in order
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Speak(u) => Some(u.text),
                SpeechCall::Cancel => None,
            })
            .collect()
    }
}

/// Speech synthesizer that records every call
pub struct RecordingSynthesizer {
    voices: Vec<VoiceInfo>,
    log: CallLog<SpeechCall>,
}

impl RecordingSynthesizer {
    pub fn new() -> (Self, CallLog<SpeechCall>) {
        Self::with_voices(Vec::new())
    }

    pub fn with_voices(voices: Vec<VoiceInfo>) -> (Self, CallLog<SpeechCall>) {
        let log = CallLog::new();
        (
            Self {
                voices,
                log: log.clone(),
            },
            log,
        )
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    fn cancel(&mut self) {
        self.log.push(SpeechCall::Cancel);
    }

    fn speak(&mut self, utterance: Utterance) {
        self.log.push(SpeechCall::Speak(utterance));
    }
}

/// Haptic device that records vibration patterns
pub struct RecordingHaptics {
    log: CallLog<Vec<u64>>,
}

impl RecordingHaptics {
    pub fn new() -> (Self, CallLog<Vec<u64>>) {
        let log = CallLog::new();
        (Self { log: log.clone() }, log)
    }
}

impl HapticDevice for RecordingHaptics {
    fn vibrate(&mut self, pattern_ms: &[u64]) -> bool {
        self.log.push(pattern_ms.to_vec());
        true
    }
}
