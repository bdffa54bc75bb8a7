//! Voice, visual and haptic alerting

pub mod voice;
pub mod visual;
pub mod policy;
pub mod mock;

pub use voice::{
    select_voice, Announcer, LogSynthesizer, SpeechProfile, SpeechSynthesizer, Urgency, Utterance,
    VoiceInfo,
};
pub use visual::{AlertBoard, AlertId, HapticDevice, UrgentAlert};
pub use policy::{AlertOutcome, AlertingPolicy, TORNADO_ALERT_TITLE};
pub use mock::{CallLog, RecordingHaptics, RecordingSynthesizer, SpeechCall};
