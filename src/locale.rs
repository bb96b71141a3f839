//! The two supported language configurations and all user-facing copy.
//!
//! The locale drives the capture grammar tag, the voice selection tag and
//! every displayed or spoken string. Switching is a binary toggle.

use serde::{Deserialize, Serialize};

/// Active language configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    En,
    Ar,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::En
    }
}

impl Locale {
    /// Full BCP-47 tag used for recognition grammar and voice selection.
    pub fn bcp47(self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::Ar => "ar-SA",
        }
    }

    /// Primary language subtag, used for voice fallback matching.
    pub fn primary(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// English name of the language, as sent to the completion service.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ar => "Arabic",
        }
    }

    /// The other locale of the binary toggle.
    pub fn toggled(self) -> Locale {
        match self {
            Locale::En => Locale::Ar,
            Locale::Ar => Locale::En,
        }
    }

    /// Whether text in this locale is rendered right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Locale::Ar)
    }

    /// Static UI copy for this locale.
    pub fn strings(self) -> &'static Strings {
        match self {
            Locale::En => &EN_STRINGS,
            Locale::Ar => &AR_STRINGS,
        }
    }

    /// The fixed prompt text that accompanies a submitted photo.
    pub fn image_prompt(self) -> &'static str {
        match self {
            Locale::En => "Please analyze this image and provide farming advice specific to Kuwait.",
            Locale::Ar => "يرجى تحليل هذه الصورة وتقديم نصائح زراعية خاصة بالكويت.",
        }
    }
}

/// All static user-facing strings for one locale.
pub struct Strings {
    pub app_title: &'static str,
    /// Label on the toggle button, naming the *other* language.
    pub toggle_label: &'static str,
    pub user_label: &'static str,
    pub assistant_label: &'static str,
    pub empty_title: &'static str,
    pub empty_hint: &'static str,
    pub status_idle: &'static str,
    pub status_listening: &'static str,
    pub status_processing: &'static str,
    pub status_speaking: &'static str,
    pub camera_hint: &'static str,
    pub image_marker: &'static str,
}

static EN_STRINGS: Strings = Strings {
    app_title: "Voice Assistant",
    toggle_label: "العربية",
    user_label: "You",
    assistant_label: "Assistant",
    empty_title: "Your conversation will appear here",
    empty_hint: "Click the microphone button and start speaking to interact with the assistant",
    status_idle: "Click to speak",
    status_listening: "Listening... Click to stop",
    status_processing: "Processing...",
    status_speaking: "Speaking... Click to stop",
    camera_hint: "Attach a photo of your plants or soil",
    image_marker: "Photo attached",
};

static AR_STRINGS: Strings = Strings {
    app_title: "المساعد الصوتي",
    toggle_label: "English",
    user_label: "أنت",
    assistant_label: "المساعد",
    empty_title: "ستظهر محادثتك هنا",
    empty_hint: "انقر على زر الميكروفون وابدأ في التحدث للتفاعل مع المساعد",
    status_idle: "انقر للتحدث",
    status_listening: "جاري الاستماع... انقر للتوقف",
    status_processing: "جاري المعالجة...",
    status_speaking: "جاري التحدث... انقر للتوقف",
    camera_hint: "أرفق صورة لنباتاتك أو تربتك",
    image_marker: "صورة مرفقة",
};
