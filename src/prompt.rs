/// Language code assumed when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

const DEFAULT_LANGUAGE_NAME: &str = "English";

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("ru", "Russian"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("he", "Hebrew"),
];

const LIVE_PROMPT: &str = "Describe this image concisely, in a single sentence, \
     for a screen reader or visually impaired user.";

const NAVIGATION_PROMPT: &str = "You are guiding a visually impaired person who is walking. \
     In 5 to 10 words, name the most important obstacle or hazard directly ahead, \
     or say that the path is clear.";

/// Kind of description the caller wants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// One descriptive sentence about the whole scene.
    #[default]
    Live,
    /// A terse hazard-focused hint for walking.
    Navigation,
}

impl Mode {
    /// Parses the request field; anything other than `navigation` is live.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some(mode) if mode.trim().eq_ignore_ascii_case("navigation") => Mode::Navigation,
            _ => Mode::Live,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Navigation => "navigation",
        }
    }
}

/// Returns the display name for a language code, falling back to English.
///
/// The lookup ignores case and any region suffix, so `fr-CA` and `FR` both
/// resolve to French.
pub fn language_name(code: &str) -> &'static str {
    let primary = code
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    LANGUAGE_NAMES
        .iter()
        .find(|(known, _)| *known == primary)
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_LANGUAGE_NAME)
}

/// Builds the prompt sent to the vision model.
pub fn select_prompt(language: &str, mode: Mode) -> String {
    let base = match mode {
        Mode::Live => LIVE_PROMPT,
        Mode::Navigation => NAVIGATION_PROMPT,
    };

    match language_name(language) {
        DEFAULT_LANGUAGE_NAME => base.to_string(),
        name => format!("{base} Respond only in {name}. Your entire answer must be in {name}."),
    }
}
