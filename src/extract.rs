//! Candidate to [`SocialProofItem`]: identity, outfit attributes, confidence.
//!
//! Every discovery path (article cards, slides, slideshow articles reached
//! through search) funnels through [`Extractor::extract`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::confidence::ConfidenceScorer;
use crate::config::ScoringWeights;
use crate::discovery::{discover_candidates, page_published_time, Candidate, DiscoveryMode};
use crate::identity::IdentityResolver;
use crate::item::{normalize_description, SocialProofItem};
use crate::outfit::OutfitParser;
use crate::vocabulary::Vocabulary;

lazy_static! {
    static ref AT_THE_EVENT: Regex = Regex::new(
        r"\b(?:at|to|for)\s+the\s+((?:\d{4}\s+)?\p{Lu}[\p{L}'’]+(?:\s+(?:of\s+)?\p{Lu}[\p{L}'’]+){0,4})"
    )
    .unwrap();
}

/// Words that end an "at the ..." phrase without being an event.
const NON_EVENT_WORDS: &[&str] = &["Office", "Airport", "Gym", "Store", "Shop", "Beach", "Park"];

pub struct Extractor {
    resolver: IdentityResolver,
    parser: OutfitParser,
    scorer: ConfidenceScorer,
    events: Vec<String>,
}

impl Extractor {
    pub fn new(vocab: &Vocabulary, weights: ScoringWeights) -> Self {
        Self {
            resolver: IdentityResolver::new(vocab),
            parser: OutfitParser::new(vocab),
            scorer: ConfidenceScorer::new(vocab, weights),
            events: vocab.events.clone(),
        }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    /// Discover candidates in `html` and keep the ones that pass the gate.
    pub fn extract_page(
        &self,
        html: &str,
        page_url: &str,
        mode: DiscoveryMode,
    ) -> Vec<SocialProofItem> {
        let page_time = page_published_time(html);
        discover_candidates(html, page_url, mode)
            .iter()
            .filter_map(|c| self.extract(c, page_time.as_deref()))
            .collect()
    }

    /// Build an item from one candidate, or `None` when it is too thin or
    /// not confident enough.
    pub fn extract(
        &self,
        candidate: &Candidate,
        page_time: Option<&str>,
    ) -> Option<SocialProofItem> {
        let description = normalize_description(&candidate.description)?;
        let resolution = self.resolver.resolve(&candidate.text, candidate.heading.as_deref())?;

        let confidence = if resolution.is_exact() {
            1.0
        } else {
            self.scorer
                .score(&resolution.matched, self.resolver.references(), &candidate.text)
        };
        if !self.scorer.accepts(confidence, resolution.is_exact()) {
            tracing::debug!(
                celebrity = %resolution.name,
                confidence,
                "candidate below confidence threshold"
            );
            return None;
        }

        let elements = self.parser.parse(&description);
        let timestamp = candidate
            .published
            .as_deref()
            .and_then(iso_timestamp)
            .or_else(|| page_time.and_then(iso_timestamp))
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        Some(SocialProofItem {
            celebrity: resolution.name,
            event: self.find_event(&candidate.text),
            outfit_description: description,
            image_url: candidate.image_url.clone(),
            timestamp,
            outfit_tags: elements.garments,
            colors: elements.colors,
            patterns: elements.patterns,
            styles: elements.styles,
            confidence_score: confidence,
        })
    }

    /// Known event name first, then an "at the <Capitalized Words>" phrase.
    pub fn find_event(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        if let Some(known) = self
            .events
            .iter()
            .filter_map(|e| lower.find(&e.to_lowercase()).map(|pos| (pos, e)))
            .min_by_key(|(pos, _)| *pos)
        {
            return Some(known.1.clone());
        }

        AT_THE_EVENT
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .find(|phrase| {
                let last = phrase.split_whitespace().last().unwrap_or("");
                !NON_EVENT_WORDS.contains(&last)
            })
    }
}

/// RFC 3339 rendering of a page date, or `None` when it is not a
/// machine-readable date. Zone-less values are taken as UTC.
pub fn iso_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc().to_rfc3339());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(&Vocabulary::default(), ScoringWeights::default())
    }

    fn candidate(text: &str) -> Candidate {
        Candidate {
            text: text.to_string(),
            description: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn exact_match_becomes_full_confidence_item() {
        let item = extractor()
            .extract(
                &candidate("Zendaya wore a red dress to the premiere of her new film."),
                Some("2024-05-06T20:00:00Z"),
            )
            .unwrap();
        assert_eq!(item.celebrity, "Zendaya");
        assert_eq!(item.confidence_score, 1.0);
        assert_eq!(item.timestamp, "2024-05-06T20:00:00+00:00");
        assert!(item.outfit_tags.contains(&"red dress".to_string()));
        assert_eq!(item.colors, vec!["red".to_string()]);
    }

    #[test]
    fn short_descriptions_are_dropped() {
        assert!(extractor().extract(&candidate("Zendaya in red."), None).is_none());
    }

    #[test]
    fn fuzzy_match_without_context_is_dropped() {
        // resolves through the possessive pattern but scores only 0.6
        let c = candidate("A look back at Beyonce's gown, a silver piece covered in crystals.");
        let e = extractor();
        let resolution = e.resolver().resolve(&c.text, None);
        assert!(resolution.is_some());
        let score = e.scorer().score("Beyonce", e.resolver().references(), &c.text);
        assert!(score <= 0.6 + 1e-9);
        assert!(e.extract(&c, None).is_none());
    }

    #[test]
    fn fuzzy_match_with_context_is_kept() {
        let c = candidate("Beyonce's outfit: she wore a silver sequined gown to the Grammys.");
        let item = extractor().extract(&c, None).unwrap();
        assert_eq!(item.celebrity, "Beyoncé");
        assert!(item.confidence_score > 0.6);
        assert_eq!(item.event.as_deref(), Some("Grammys"));
    }

    #[test]
    fn free_text_dates_fall_through_to_the_next_source() {
        let mut c = candidate("Zendaya wore a red dress to the premiere of her new film.");
        c.published = Some("May 6, 2024".to_string());

        let item = extractor().extract(&c, Some("2024-05-06")).unwrap();
        assert_eq!(item.timestamp, "2024-05-06T00:00:00+00:00");

        let item = extractor().extract(&c, Some("last Tuesday")).unwrap();
        assert!(DateTime::parse_from_rfc3339(&item.timestamp).is_ok());
    }

    #[test]
    fn timestamps_are_normalized_to_rfc3339() {
        assert_eq!(
            iso_timestamp("2024-05-06T20:00:00-04:00").as_deref(),
            Some("2024-05-06T20:00:00-04:00")
        );
        assert_eq!(
            iso_timestamp(" 2024-05-06T20:00:00 ").as_deref(),
            Some("2024-05-06T20:00:00+00:00")
        );
        assert_eq!(iso_timestamp("May 6, 2024"), None);
        assert_eq!(iso_timestamp(""), None);
    }

    #[test]
    fn event_from_at_the_phrase() {
        let e = extractor();
        assert_eq!(
            e.find_event("Emma Stone arrived at the Gotham Awards in a black suit."),
            Some("Gotham Awards".to_string())
        );
        assert_eq!(e.find_event("She was spotted at the Airport in sneakers."), None);
    }

    #[test]
    fn extract_page_runs_discovery_and_gate() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2024-05-07T08:00:00Z">
        </head><body>
            <div class="article-card">
                <h3>Rihanna at the Met Gala</h3>
                <p>Rihanna stepped out in an oversized black leather jacket and sheer tights.</p>
                <img src="https://cdn.example.com/rihanna.jpg">
            </div>
            <div class="article-card">
                <h3>10 Best Jackets</h3>
                <p>Shop the 10 best jackets under $100, editor's picks for fall layering.</p>
            </div>
        </body></html>"#;
        let items = extractor().extract_page(html, "https://www.example.com/", DiscoveryMode::Full);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].celebrity, "Rihanna");
        assert_eq!(items[0].event.as_deref(), Some("Met Gala"));
        assert_eq!(items[0].timestamp, "2024-05-07T08:00:00+00:00");
        assert!(items[0].outfit_tags.contains(&"leather jacket".to_string()));
    }
}
