use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

/// One utterance in the conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub speaker: Speaker,
    pub text: String,
    /// Attached photo as an opaque data URI, passed through unchanged
    /// to the completion service.
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(speaker: Speaker, text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            text: text.into(),
            image,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text, None)
    }

    pub fn user_with_image(text: impl Into<String>, image_data_uri: impl Into<String>) -> Self {
        Self::new(Speaker::User, text, Some(image_data_uri.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text, None)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("hello");
        assert_eq!(user.speaker, Speaker::User);
        assert!(!user.has_image());

        let with_image = Turn::user_with_image("look at this", "data:image/jpeg;base64,AAAA");
        assert!(with_image.has_image());

        let assistant = Turn::assistant("hi there");
        assert_eq!(assistant.speaker, Speaker::Assistant);
        assert!(assistant.image.is_none());
    }

    #[test]
    fn test_turn_ids_are_unique() {
        assert_ne!(Turn::user("a").id, Turn::user("a").id);
    }
}
