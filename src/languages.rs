use std::fmt;

/// CEFR competency tier, A1 (lowest) through C2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CEFR levels across the five scored dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CefrProfile {
    pub listening: CefrLevel,
    pub reading: CefrLevel,
    pub spoken_interaction: CefrLevel,
    pub spoken_production: CefrLevel,
    pub writing: CefrLevel,
}

/// Overall CEFR tier for a free-text proficiency phrase. Matching is
/// case-insensitive substring, most specific phrase first; unrecognized
/// text defaults to B2 rather than failing.
pub fn proficiency_level(text: &str) -> CefrLevel {
    let lower = text.to_lowercase();
    if lower.contains("native") || lower.contains("bilingual") {
        CefrLevel::C2
    } else if lower.contains("full professional") {
        CefrLevel::C1
    } else if lower.contains("professional working") {
        CefrLevel::B2
    } else if lower.contains("limited working") {
        CefrLevel::B1
    } else if lower.contains("elementary") {
        CefrLevel::A2
    } else {
        CefrLevel::B2
    }
}

/// Per-dimension CEFR profile. Full professional proficiency scores the
/// spoken dimensions one tier below the receptive/written ones.
pub fn competency_profile(text: &str) -> CefrProfile {
    let level = proficiency_level(text);
    let spoken = if text.to_lowercase().contains("full professional") {
        CefrLevel::B2
    } else {
        level
    };
    CefrProfile {
        listening: level,
        reading: level,
        spoken_interaction: spoken,
        spoken_production: spoken,
        writing: level,
    }
}

/// Native and bilingual speakers are classified as mother tongues: the CV
/// dialects list them without a CEFR breakdown.
pub fn is_native(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("native") || lower.contains("bilingual")
}

/// The export labels languages in the member's own language; map the known
/// Italian names to English display names.
pub fn normalize_language_name(name: &str) -> &str {
    match name {
        "Inglese" => "English",
        "Italiano" => "Italian",
        "Francese" => "French",
        "Spagnolo" => "Spanish",
        "Tedesco" => "German",
        _ => name,
    }
}

/// ISO 639-1 code for a display name, falling back to the first two
/// letters, or "xx" for degenerate input.
pub fn language_code(name: &str) -> String {
    match normalize_language_name(name).to_lowercase().as_str() {
        "italian" => "it".to_string(),
        "english" => "en".to_string(),
        "french" => "fr".to_string(),
        "spanish" => "es".to_string(),
        "german" => "de".to_string(),
        "portuguese" => "pt".to_string(),
        other => {
            if other.chars().count() >= 2 {
                other.chars().take(2).collect()
            } else {
                "xx".to_string()
            }
        }
    }
}

// ── Tests ──
