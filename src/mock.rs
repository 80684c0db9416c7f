//! Synthetic items for when every live attempt came back empty.
//!
//! Sentences are templated from the vocabulary and then run through the
//! same [`OutfitParser`] as live stories, so the attribute fields look
//! exactly like extracted ones.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::item::{normalize_text, SocialProofItem};
use crate::outfit::OutfitParser;
use crate::vocabulary::Vocabulary;

/// Confidence assigned to every synthetic item.
pub const MOCK_CONFIDENCE: f64 = 0.9;

const FALLBACK_CELEBRITY: &str = "Zendaya";
const FALLBACK_GARMENT: &str = "outfit";
/// Fresh draws per item before a numbered variant is forced.
const MAX_DRAWS: usize = 8;

pub struct MockGenerator {
    parser: OutfitParser,
    vocab: Vocabulary,
}

fn pick<'a>(rng: &mut impl Rng, list: &'a [String]) -> &'a str {
    list.choose(rng).map(String::as_str).unwrap_or("")
}

impl MockGenerator {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            parser: OutfitParser::new(vocab),
            vocab: vocab.clone(),
        }
    }

    /// Exactly `limit` items, pairwise distinct on celebrity and
    /// description prefix.
    pub fn generate(&self, limit: usize) -> Vec<SocialProofItem> {
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(limit);

        while items.len() < limit {
            let mut item = self.draw(&mut rng);
            let mut draws = 1;
            while seen.contains(&(item.celebrity.clone(), item.description_prefix()))
                && draws < MAX_DRAWS
            {
                item = self.draw(&mut rng);
                draws += 1;
            }
            if seen.contains(&(item.celebrity.clone(), item.description_prefix())) {
                item.outfit_description =
                    format!("Look {}: {}", items.len() + 1, item.outfit_description);
            }
            seen.insert((item.celebrity.clone(), item.description_prefix()));
            items.push(item);
        }
        items
    }

    fn draw(&self, rng: &mut impl Rng) -> SocialProofItem {
        let v = &self.vocab;
        let g = &v.garments;

        let celebrity = match pick(rng, &v.celebrities) {
            "" => FALLBACK_CELEBRITY,
            name => name,
        }
        .to_string();
        let event = if rng.gen_bool(0.5) {
            Some(pick(rng, &v.events).to_string()).filter(|e| !e.is_empty())
        } else {
            None
        };
        let at_event = event
            .as_deref()
            .map(|e| format!(" at the {e}"))
            .unwrap_or_default();

        let (sentence, lead_garment) = match rng.gen_range(0..4) {
            0 => {
                let dress = pick(rng, &g.dresses);
                (
                    format!(
                        "{celebrity} wore a {} {dress} with {} {}{at_event}.",
                        pick(rng, &v.colors),
                        pick(rng, &v.colors),
                        pick(rng, &g.shoes),
                    ),
                    dress,
                )
            }
            1 => {
                let top = pick(rng, &g.tops);
                (
                    format!(
                        "{celebrity} stepped out in a {} {top} and {} {}, finished with {}{at_event}.",
                        pick(rng, &v.patterns),
                        pick(rng, &v.fits),
                        pick(rng, &g.bottoms),
                        pick(rng, &g.shoes),
                    ),
                    top,
                )
            }
            2 => {
                let outer = pick(rng, &g.outerwear);
                (
                    format!(
                        "{celebrity} layered a {} {outer} over a {} {}{at_event}.",
                        pick(rng, &v.fabrics),
                        pick(rng, &v.colors),
                        pick(rng, &g.tops),
                    ),
                    outer,
                )
            }
            _ => {
                let dress = pick(rng, &g.dresses);
                (
                    format!(
                        "{celebrity} turned heads in a {} {} {dress} paired with a {}{at_event}.",
                        pick(rng, &v.styles),
                        pick(rng, &v.colors),
                        pick(rng, &g.accessories),
                    ),
                    dress,
                )
            }
        };

        let description = normalize_text(&sentence);
        let elements = self.parser.parse(&description);
        let mut outfit_tags = elements.garments;
        if outfit_tags.is_empty() {
            let garment = if lead_garment.is_empty() { FALLBACK_GARMENT } else { lead_garment };
            outfit_tags.push(garment.to_string());
        }

        let timestamp = (Utc::now() - Duration::days(rng.gen_range(0..30))).to_rfc3339();

        SocialProofItem {
            celebrity,
            event,
            outfit_description: description,
            image_url: None,
            timestamp,
            outfit_tags,
            colors: elements.colors,
            patterns: elements.patterns,
            styles: elements.styles,
            confidence_score: MOCK_CONFIDENCE,
        }
    }
}
