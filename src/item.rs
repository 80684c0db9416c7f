use serde::{Deserialize, Serialize};

/// Outfit descriptions shorter than this after normalization are rejected.
pub const MIN_DESCRIPTION_CHARS: usize = 30;

/// Longest description kept for a single item.
pub const MAX_DESCRIPTION_CHARS: usize = 600;

/// One "who wore what" record handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProofItem {
    pub celebrity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub outfit_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub outfit_tags: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    pub confidence_score: f64,
}

impl SocialProofItem {
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn has_event(&self) -> bool {
        self.event.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// First 50 characters of the description, the dedup key prefix.
    pub fn description_prefix(&self) -> String {
        self.outfit_description.chars().take(50).collect()
    }

    /// Combined count of garments, colors and patterns.
    pub fn element_count(&self) -> usize {
        self.outfit_tags.len() + self.colors.len() + self.patterns.len()
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a description and clip it to [`MAX_DESCRIPTION_CHARS`].
/// Returns `None` when the result is too short to describe an outfit.
pub fn normalize_description(text: &str) -> Option<String> {
    let normalized = normalize_text(text);
    if normalized.chars().count() < MIN_DESCRIPTION_CHARS {
        return None;
    }
    if normalized.chars().count() <= MAX_DESCRIPTION_CHARS {
        return Some(normalized);
    }
    let clipped: String = normalized.chars().take(MAX_DESCRIPTION_CHARS).collect();
    // cut back to the last full word
    let clipped = match clipped.rfind(' ') {
        Some(idx) if idx > MIN_DESCRIPTION_CHARS => clipped[..idx].to_string(),
        _ => clipped,
    };
    Some(clipped)
}

/// Push `value` unless an equal entry is already present.
pub(crate) fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !list.iter().any(|v| v == &value) {
        list.push(value);
    }
}
