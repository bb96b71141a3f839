//! Voice enumeration and the locale-matching selection policy.

use crate::locale::Locale;

/// One voice offered by the speech-synthesis capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Backend-specific identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// BCP-47 language tag, e.g. `ar-SA` or `en-GB`.
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn primary_subtag(&self) -> &str {
        self.lang.split('-').next().unwrap_or(&self.lang)
    }
}

/// Pick a voice for the requested locale.
///
/// Exact tag match wins; otherwise any voice sharing the primary
/// language subtag; otherwise `None`, meaning the device default voice
/// is used while the utterance still carries the locale tag so
/// phonemization stays correct where supported.
pub fn select_voice(voices: &[Voice], locale: Locale) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.lang == locale.bcp47())
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.primary_subtag() == locale.primary())
        })
}
