//! Spoken announcements
//!
//! Speech is fire-and-forget and at most one utterance is active: every new
//! announcement cancels whatever the synthesizer is still saying.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Rate/pitch/volume applied to an utterance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechProfile {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl SpeechProfile {
    pub const BASELINE: Self = Self {
        rate: 1.0,
        pitch: 1.0,
        volume: 0.8,
    };

    pub const URGENT: Self = Self {
        rate: 1.2,
        pitch: 1.2,
        volume: 1.0,
    };
}

/// Announcement urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Urgent,
}

impl Urgency {
    pub fn profile(self) -> SpeechProfile {
        match self {
            Urgency::Normal => SpeechProfile::BASELINE,
            Urgency::Urgent => SpeechProfile::URGENT,
        }
    }
}

/// A voice offered by the synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`
    pub lang: String,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_english(&self) -> bool {
        self.lang.starts_with("en")
    }
}

/// Text plus delivery settings handed to the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub profile: SpeechProfile,
    /// `None` means the synthesizer default
    pub voice: Option<VoiceInfo>,
}

/// Text-to-speech backend
pub trait SpeechSynthesizer: Send {
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Interrupt the in-flight utterance, if any
    fn cancel(&mut self);

    fn speak(&mut self, utterance: Utterance);
}

/// Prefer an English Siri voice, then any English voice.
pub fn select_voice(voices: &[VoiceInfo]) -> Option<&VoiceInfo> {
    voices
        .iter()
        .find(|v| v.is_english() && v.name.contains("Siri"))
        .or_else(|| voices.iter().find(|v| v.is_english()))
}

/// Voice front-end with the persisted on/off switch
pub struct Announcer {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    enabled: bool,
}

impl Announcer {
    /// Without a synthesizer voice is unavailable and stays silent
    pub fn new(synthesizer: Option<Box<dyn SpeechSynthesizer>>) -> Self {
        let enabled = synthesizer.is_some();
        Self {
            synthesizer,
            enabled,
        }
    }

    pub fn silent() -> Self {
        Self::new(None)
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.is_available()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Speak `text`. Returns whether anything was sent to the synthesizer.
    pub fn announce(&mut self, text: &str, urgency: Urgency) -> bool {
        if !self.enabled {
            debug!(text, "voice disabled, skipping announcement");
            return false;
        }
        let Some(synthesizer) = self.synthesizer.as_mut() else {
            return false;
        };

        synthesizer.cancel();

        let voices = synthesizer.voices();
        let utterance = Utterance {
            text: text.to_string(),
            profile: urgency.profile(),
            voice: select_voice(&voices).cloned(),
        };
        info!(text, ?urgency, "announcing");
        synthesizer.speak(utterance);
        true
    }
}

/// Synthesizer that writes utterances to the log
#[derive(Debug, Default)]
pub struct LogSynthesizer;

impl SpeechSynthesizer for LogSynthesizer {
    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn cancel(&mut self) {}

    fn speak(&mut self, utterance: Utterance) {
        info!(
            text = %utterance.text,
            rate = utterance.profile.rate,
            pitch = utterance.profile.pitch,
            volume = utterance.profile.volume,
            "speak"
        );
    }
}
