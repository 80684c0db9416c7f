use std::collections::HashMap;
use std::fmt::Write;

use crate::item::SocialProofItem;

const DETAIL_DESCRIPTION_CHARS: usize = 100;

/// Plain-text summary of an extraction run.
pub fn summarize(items: &[SocialProofItem], include_details: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Social proof report: {} items", items.len());
    if items.is_empty() {
        return out;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.celebrity.as_str()).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let _ = writeln!(out, "\nCelebrities ({}):", counts.len());
    for (name, count) in &counts {
        let _ = writeln!(out, "  {name}: {count}");
    }

    let tags: usize = items.iter().map(|i| i.outfit_tags.len()).sum();
    let colors: usize = items.iter().map(|i| i.colors.len()).sum();
    let patterns: usize = items.iter().map(|i| i.patterns.len()).sum();
    let styles: usize = items.iter().map(|i| i.styles.len()).sum();
    let n = items.len() as f64;
    let _ = writeln!(out, "\nOutfit elements:");
    let _ = writeln!(out, "  garments: {tags} (avg {:.1})", tags as f64 / n);
    let _ = writeln!(out, "  colors: {colors} (avg {:.1})", colors as f64 / n);
    let _ = writeln!(out, "  patterns: {patterns} (avg {:.1})", patterns as f64 / n);
    let _ = writeln!(out, "  styles: {styles} (avg {:.1})", styles as f64 / n);

    let avg_confidence = items.iter().map(|i| i.confidence_score).sum::<f64>() / n;
    let with_images = items.iter().filter(|i| i.has_image()).count();
    let with_events = items.iter().filter(|i| i.has_event()).count();
    let _ = writeln!(out, "\nAverage confidence: {avg_confidence:.2}");
    let _ = writeln!(out, "With image: {with_images}, with event: {with_events}");

    if include_details {
        let _ = writeln!(out, "\nItems:");
        for (idx, item) in items.iter().enumerate() {
            let mut description: String = item
                .outfit_description
                .chars()
                .take(DETAIL_DESCRIPTION_CHARS)
                .collect();
            if item.outfit_description.chars().count() > DETAIL_DESCRIPTION_CHARS {
                description.push_str("...");
            }
            let _ = writeln!(
                out,
                "{}. {} [{:.2}]{}",
                idx + 1,
                item.celebrity,
                item.confidence_score,
                item.event.as_deref().map(|e| format!(" @ {e}")).unwrap_or_default()
            );
            let _ = writeln!(out, "   {description}");
            if !item.outfit_tags.is_empty() {
                let _ = writeln!(out, "   tags: {}", item.outfit_tags.join(", "));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(celebrity: &str, description: &str) -> SocialProofItem {
        SocialProofItem {
            celebrity: celebrity.to_string(),
            event: Some("Met Gala".to_string()),
            outfit_description: description.to_string(),
            image_url: None,
            timestamp: "2024-05-06T20:00:00Z".to_string(),
            outfit_tags: vec!["red dress".to_string(), "gold heels".to_string()],
            colors: vec!["red".to_string()],
            patterns: Vec::new(),
            styles: Vec::new(),
            confidence_score: 0.9,
        }
    }

    #[test]
    fn empty_report() {
        assert_eq!(summarize(&[], true), "Social proof report: 0 items\n");
    }

    #[test]
    fn counts_celebrities_most_frequent_first() {
        let items = vec![
            item("Cher", "Cher wore a red dress."),
            item("Zendaya", "Zendaya wore a red dress."),
            item("Zendaya", "Zendaya wore gold heels."),
        ];
        let report = summarize(&items, false);
        let zendaya = report.find("  Zendaya: 2").unwrap();
        let cher = report.find("  Cher: 1").unwrap();
        assert!(zendaya < cher);
        assert!(report.contains("garments: 6 (avg 2.0)"));
        assert!(!report.contains("Items:"));
    }

    #[test]
    fn details_clip_descriptions() {
        let long = "sequins ".repeat(30);
        let report = summarize(&[item("Cher", &long)], true);
        assert!(report.contains("1. Cher [0.90] @ Met Gala"));
        assert!(report.contains("..."));
        assert!(report.contains("tags: red dress, gold heels"));
    }
}
