//! Text to outfit attributes.

use regex::Regex;

use crate::item::push_unique;
use crate::vocabulary::Vocabulary;

/// Garments, colors, patterns and styles found in one description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutfitElements {
    pub garments: Vec<String>,
    pub colors: Vec<String>,
    pub patterns: Vec<String>,
    pub styles: Vec<String>,
}

/// Words that never count as a garment's leading adjective.
const NON_ADJECTIVES: &[&str] = &[
    "a", "an", "the", "her", "his", "their", "its", "my", "our", "your", "and", "or", "with",
    "in", "of", "to", "on", "for", "by", "from", "at", "this", "that", "same", "matching",
    "wore", "wears", "wearing", "donned", "sported", "paired", "new", "favorite", "favourite",
];

pub struct OutfitParser {
    garments: Vec<(String, Regex)>,
    colors: Vec<String>,
    max_color_words: usize,
    patterns: Vec<(String, Regex)>,
    styles: Vec<(String, Regex)>,
    fabrics: Vec<(String, Regex)>,
}

fn word_regex(term: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).ok()
}

fn compile(terms: &[String]) -> Vec<(String, Regex)> {
    terms
        .iter()
        .filter_map(|t| word_regex(t).map(|re| (t.to_lowercase(), re)))
        .collect()
}

impl OutfitParser {
    pub fn new(vocab: &Vocabulary) -> Self {
        // longest first so "trench coat" claims its span before "coat"
        let mut garment_terms: Vec<String> = vocab.garments.terms().map(str::to_string).collect();
        garment_terms.sort_by(|a, b| b.len().cmp(&a.len()));

        let colors: Vec<String> = vocab.colors.iter().map(|c| c.to_lowercase()).collect();
        let max_color_words = colors
            .iter()
            .map(|c| c.split_whitespace().count())
            .max()
            .unwrap_or(1)
            .clamp(1, 3);

        let mut styles = compile(&vocab.styles);
        styles.extend(compile(&vocab.fits));

        Self {
            garments: compile(&garment_terms),
            colors,
            max_color_words,
            patterns: compile(&vocab.patterns),
            styles,
            fabrics: compile(&vocab.fabrics),
        }
    }

    pub fn parse(&self, description: &str) -> OutfitElements {
        let mut elements = OutfitElements {
            garments: self.extract_garments(description),
            colors: self.extract_colors(description),
            ..Default::default()
        };

        for (term, re) in &self.patterns {
            if re.is_match(description) {
                push_unique(&mut elements.patterns, term.clone());
            }
        }
        for (term, re) in &self.styles {
            if re.is_match(description) {
                push_unique(&mut elements.styles, term.clone());
            }
        }
        for (fabric, re) in &self.fabrics {
            if re.is_match(description) {
                fold_fabric(&mut elements.garments, fabric);
                push_unique(&mut elements.styles, fabric.clone());
            }
        }

        elements
    }

    fn extract_garments(&self, description: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for (term, re) in &self.garments {
            let Some(m) = re
                .find_iter(description)
                .find(|m| !claimed.iter().any(|&(s, e)| m.start() < e && s < m.end()))
            else {
                continue;
            };
            claimed.push((m.start(), m.end()));

            match preceding_adjective(&description[..m.start()]) {
                Some(adjective) => push_unique(&mut found, format!("{adjective} {term}")),
                None => push_unique(&mut found, term.clone()),
            }
        }

        found
    }

    /// Scan tokens with a window of 3, then 2, then 1 words so multi-word
    /// colors win over their single-word parts.
    fn extract_colors(&self, description: &str) -> Vec<String> {
        let tokens: Vec<String> = description
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let mut colors = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let mut advanced = false;
            for size in (1..=self.max_color_words).rev() {
                if i + size > tokens.len() {
                    continue;
                }
                let phrase = tokens[i..i + size].join(" ");
                if self.colors.iter().any(|c| c == &phrase) {
                    push_unique(&mut colors, phrase);
                    i += size;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                i += 1;
            }
        }
        colors
    }
}

/// The single word right before a garment match, if it reads like a modifier.
fn preceding_adjective(before: &str) -> Option<String> {
    let trimmed = before.trim_end();
    if trimmed.len() == before.len() && !before.is_empty() {
        // garment is glued to the previous word ("t-shirt", "crop-top")
        return None;
    }
    let start = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
    let word = trimmed[start..].to_lowercase();
    let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');

    if word.len() < 3
        || !word.chars().all(|c| c.is_alphabetic() || c == '-')
        || NON_ADJECTIVES.contains(&word)
    {
        return None;
    }
    // the previous clause ended there
    if trimmed.ends_with([',', '.', ';', ':', '!', '?']) {
        return None;
    }
    Some(word.to_string())
}

fn fold_fabric(garments: &mut [String], fabric: &str) {
    if garments.iter().any(|g| g.contains(fabric)) {
        return;
    }
    if let Some(bare) = garments.iter_mut().find(|g| !g.contains(' ')) {
        *bare = format!("{fabric} {bare}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> OutfitParser {
        OutfitParser::new(&Vocabulary::default())
    }

    #[test]
    fn multi_word_color_wins_over_parts() {
        let parsed = parser().parse("a forest green sweater");
        assert_eq!(parsed.colors, vec!["forest green".to_string()]);
    }

    #[test]
    fn garment_captures_adjacent_adjective() {
        let parsed = parser().parse("She wore a red dress with black boots.");
        assert_eq!(parsed.garments, vec!["red dress".to_string(), "black boots".to_string()]);
        assert_eq!(parsed.colors, vec!["red".to_string(), "black".to_string()]);
    }

    #[test]
    fn bare_garment_when_no_modifier() {
        let parsed = parser().parse("She wore a blazer.");
        assert_eq!(parsed.garments, vec!["blazer".to_string()]);
    }

    #[test]
    fn longer_garment_terms_claim_their_span() {
        let parsed = parser().parse("a beige trench coat over the shoulders");
        assert_eq!(parsed.garments, vec!["beige trench coat".to_string()]);
    }

    #[test]
    fn fabric_is_folded_into_bare_garment_and_kept_as_style() {
        let parsed = parser().parse("She arrived in a jacket made of buttery leather.");
        assert_eq!(parsed.garments, vec!["leather jacket".to_string()]);
        assert!(parsed.styles.contains(&"leather".to_string()));
    }

    #[test]
    fn fabric_already_in_phrase_is_not_folded_twice() {
        let parsed = parser().parse("She paired a leather jacket with jeans.");
        assert!(parsed.garments.contains(&"leather jacket".to_string()));
        assert!(parsed.garments.contains(&"jeans".to_string()));
    }

    #[test]
    fn patterns_and_fits_are_detected() {
        let parsed = parser().parse("An oversized striped shirt with floral wide-leg trousers");
        assert!(parsed.patterns.contains(&"striped".to_string()));
        assert!(parsed.patterns.contains(&"floral".to_string()));
        assert!(parsed.styles.contains(&"oversized".to_string()));
        assert!(parsed.styles.contains(&"wide-leg".to_string()));
    }

    #[test]
    fn results_are_deduplicated() {
        let parsed = parser().parse("red dress, red shoes and another red dress");
        assert_eq!(parsed.colors, vec!["red".to_string()]);
        assert_eq!(parsed.garments.iter().filter(|g| *g == "red dress").count(), 1);
    }
}
