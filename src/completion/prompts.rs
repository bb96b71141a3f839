//! Fixed per-locale system prompt sent with every completion request.

use crate::locale::Locale;

const EXPERTISE: &str = "You are an expert on crops and farming in Kuwait, with detailed \
knowledge on soil, watering, growing season and maximizing yields for different types of crops.";

const IMAGE_FOCUS: &str = "When analyzing images, focus on identifying plants, soil conditions, \
signs of disease or pest problems, and provide specific recommendations for Kuwait's climate.";

const SCOPE_GUARD: &str = "If the user asks you questions about anything not related to crops \
and farming in Kuwait, kindly remind them of your area of expertise and suggest they use Google \
instead.";

/// Build the system prompt for one request.
///
/// The model is told to always answer in the requested language
/// regardless of the input language; the image-analysis instruction is
/// only included when a photo is attached.
pub fn system_prompt(locale: Locale, has_image: bool) -> String {
    let image_clause = if has_image {
        format!(" {}", IMAGE_FOCUS)
    } else {
        String::new()
    };

    format!(
        "{}{} {} ALWAYS respond in {} regardless of the input language.",
        EXPERTISE,
        image_clause,
        SCOPE_GUARD,
        locale.language_name()
    )
}
