pub mod capture;
pub mod completion;
pub mod locale;
pub mod playback;
pub mod session;
pub mod transcript;
pub mod ui;

use locale::Locale;
use thiserror::Error;

/// A device capability that may be absent on the current machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SpeechRecognition,
    SpeechSynthesis,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazraError {
    #[error("capability unsupported: {0:?}")]
    CapabilityUnsupported(Capability),

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no speech detected")]
    NoInputDetected,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("remote service rejected the request: {0}")]
    RemoteRejected(String),

    #[error("no API credential configured")]
    MissingCredential,

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("speech playback failed: {0}")]
    PlaybackFailed(String),

    #[error("empty response from remote service")]
    EmptyResult,

    #[error("channel error: {0}")]
    ChannelError(String),
}

impl MazraError {
    /// Check if this error should be shown to the user at all.
    ///
    /// A cancellation caused by the user's own stop action is expected,
    /// not an error condition.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, MazraError::Cancelled)
    }

    /// Get a user-facing description in the requested language.
    pub fn localized_message(&self, locale: Locale) -> String {
        match (self, locale) {
            (MazraError::CapabilityUnsupported(Capability::SpeechRecognition), Locale::En) => {
                "Speech recognition is not supported on this device.".to_string()
            }
            (MazraError::CapabilityUnsupported(Capability::SpeechRecognition), Locale::Ar) => {
                "خاصية التعرف على الكلام غير مدعومة على هذا الجهاز".to_string()
            }
            (MazraError::CapabilityUnsupported(Capability::SpeechSynthesis), Locale::En) => {
                "Text-to-speech is unavailable. The reply is shown as text.".to_string()
            }
            (MazraError::CapabilityUnsupported(Capability::SpeechSynthesis), Locale::Ar) => {
                "خاصية تحويل النص إلى كلام غير متاحة. ستظهر الإجابة كنص.".to_string()
            }
            (MazraError::PermissionDenied, Locale::En) => {
                "Microphone access denied. Please allow microphone access in your system settings."
                    .to_string()
            }
            (MazraError::PermissionDenied, Locale::Ar) => {
                "لم يتم السماح باستخدام الميكروفون. يرجى منح الإذن في إعدادات النظام.".to_string()
            }
            (MazraError::NoInputDetected, Locale::En) => "No speech was detected.".to_string(),
            (MazraError::NoInputDetected, Locale::Ar) => "لم يتم اكتشاف أي كلام".to_string(),
            (MazraError::NetworkError(_), Locale::En) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            (MazraError::NetworkError(_), Locale::Ar) => "خطأ في الشبكة".to_string(),
            (MazraError::Cancelled, Locale::En) => "Cancelled.".to_string(),
            (MazraError::Cancelled, Locale::Ar) => "تم الإلغاء".to_string(),
            (MazraError::RemoteRejected(msg), Locale::En) => {
                format!("The assistant service rejected the request: {}", msg)
            }
            (MazraError::RemoteRejected(msg), Locale::Ar) => {
                format!("رفضت خدمة المساعد الطلب: {}", msg)
            }
            (MazraError::MissingCredential, Locale::En) => {
                "API key is missing. Please set MAZRA_API_KEY in your environment.".to_string()
            }
            (MazraError::MissingCredential, Locale::Ar) => {
                "مفتاح الواجهة البرمجية مفقود. يرجى ضبط MAZRA_API_KEY في بيئة التشغيل.".to_string()
            }
            (MazraError::TransportError(_), Locale::En) => {
                "Could not reach the assistant service. Please try again.".to_string()
            }
            (MazraError::TransportError(_), Locale::Ar) => {
                "تعذر الوصول إلى خدمة المساعد. يرجى المحاولة مرة أخرى.".to_string()
            }
            (MazraError::PlaybackFailed(_), Locale::En) => {
                "Speech playback failed. The reply is shown as text.".to_string()
            }
            (MazraError::PlaybackFailed(_), Locale::Ar) => {
                "تعذر تشغيل الكلام. ستظهر الإجابة كنص.".to_string()
            }
            (MazraError::EmptyResult, Locale::En) => {
                "The assistant returned no answer. Please try again.".to_string()
            }
            (MazraError::EmptyResult, Locale::Ar) => {
                "لم يرجع المساعد أي إجابة. يرجى المحاولة مرة أخرى.".to_string()
            }
            (MazraError::ChannelError(_), Locale::En) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            (MazraError::ChannelError(_), Locale::Ar) => {
                "خطأ في الاتصال الداخلي. يرجى إعادة تشغيل التطبيق.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MazraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_not_user_visible() {
        assert!(!MazraError::Cancelled.is_user_visible());
        assert!(MazraError::PermissionDenied.is_user_visible());
        assert!(MazraError::EmptyResult.is_user_visible());
    }

    #[test]
    fn localized_messages_follow_locale() {
        let err = MazraError::NoInputDetected;
        assert_eq!(err.localized_message(Locale::En), "No speech was detected.");
        assert_eq!(err.localized_message(Locale::Ar), "لم يتم اكتشاف أي كلام");
    }

    #[test]
    fn remote_rejection_surfaces_payload_message() {
        let err = MazraError::RemoteRejected("quota exceeded".to_string());
        assert!(err.localized_message(Locale::En).contains("quota exceeded"));
        assert!(err.localized_message(Locale::Ar).contains("quota exceeded"));
    }
}
