//! Final shaping of the result set, plus lookup and merge helpers for
//! callers holding a list of items.

use std::collections::HashSet;

use crate::item::{push_unique, SocialProofItem};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_MIN_ELEMENTS: usize = 2;

/// Drop incomplete items and duplicates, order by richness and cut to `limit`.
pub fn finalize(items: Vec<SocialProofItem>, limit: usize) -> Vec<SocialProofItem> {
    let mut items = dedup(items);
    rank(&mut items);
    items.truncate(limit);
    items
}

/// Keep the first occurrence of each `(celebrity, description prefix)` and
/// each `(celebrity, image)` pair, dropping items without a celebrity or a
/// description.
pub fn dedup(items: Vec<SocialProofItem>) -> Vec<SocialProofItem> {
    let mut seen_text: HashSet<(String, String)> = HashSet::new();
    let mut seen_image: HashSet<(String, String)> = HashSet::new();

    items
        .into_iter()
        .filter(|item| {
            !item.celebrity.trim().is_empty() && !item.outfit_description.trim().is_empty()
        })
        .filter(|item| {
            let celebrity = item.celebrity.to_lowercase();
            if !seen_text.insert((celebrity.clone(), item.description_prefix())) {
                return false;
            }
            match item.image_url.as_deref().filter(|u| !u.is_empty()) {
                Some(image) => seen_image.insert((celebrity, image.to_string())),
                None => true,
            }
        })
        .collect()
}

/// Items with an image first, then items with an event, then longer
/// descriptions first. Stable, so equal items keep discovery order.
pub fn rank(items: &mut [SocialProofItem]) {
    items.sort_by(|a, b| {
        b.has_image()
            .cmp(&a.has_image())
            .then(b.has_event().cmp(&a.has_event()))
            .then(
                b.outfit_description
                    .chars()
                    .count()
                    .cmp(&a.outfit_description.chars().count()),
            )
    });
}

/// Items at or above `min_confidence` carrying at least `min_elements`
/// garments, colors and patterns combined.
pub fn filter_quality(
    items: &[SocialProofItem],
    min_confidence: f64,
    min_elements: usize,
) -> Vec<SocialProofItem> {
    items
        .iter()
        .filter(|item| {
            !item.celebrity.is_empty()
                && !item.outfit_description.is_empty()
                && item.confidence_score >= min_confidence
                && item.element_count() >= min_elements
        })
        .cloned()
        .collect()
}

/// Case-insensitive lookup: exact name matches when any exist, otherwise
/// items whose celebrity contains `name`.
pub fn find_by_celebrity<'a>(items: &'a [SocialProofItem], name: &str) -> Vec<&'a SocialProofItem> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let exact: Vec<_> = items
        .iter()
        .filter(|item| item.celebrity.to_lowercase() == needle)
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    items
        .iter()
        .filter(|item| item.celebrity.to_lowercase().contains(&needle))
        .collect()
}

/// Combine two records of the same celebrity. Returns `None` when the
/// celebrities differ.
pub fn merge_items(a: &SocialProofItem, b: &SocialProofItem) -> Option<SocialProofItem> {
    if !a.celebrity.eq_ignore_ascii_case(&b.celebrity) {
        return None;
    }

    let mut merged = a.clone();
    if b.outfit_description.chars().count() > a.outfit_description.chars().count() {
        merged.outfit_description = b.outfit_description.clone();
    }
    if !merged.has_event() {
        merged.event = b.event.clone();
    }
    if !merged.has_image() {
        merged.image_url = b.image_url.clone();
    }
    for tag in &b.outfit_tags {
        push_unique(&mut merged.outfit_tags, tag.as_str());
    }
    for color in &b.colors {
        push_unique(&mut merged.colors, color.as_str());
    }
    for pattern in &b.patterns {
        push_unique(&mut merged.patterns, pattern.as_str());
    }
    for style in &b.styles {
        push_unique(&mut merged.styles, style.as_str());
    }
    merged.confidence_score = a.confidence_score.max(b.confidence_score);
    Some(merged)
}
