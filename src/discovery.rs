//! Candidate discovery over captured page HTML.
//!
//! A candidate is one DOM region that plausibly holds a single story (an
//! article card or a slideshow slide). Discovery only locates regions and
//! lifts their raw signals out; resolving who wore what happens in
//! [`crate::extract`], identically for every discovery path.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::item::normalize_text;

/// Selectors tuned to the primary site's card markup.
pub const SITE_SELECTORS: &[&str] = &[
    "[data-module='article-card']",
    "[class*='ArticleCard']",
    ".card__content",
    ".article-card",
    ".listing-item",
    ".story-card",
    ".celebrity-look",
];

/// Structural fallbacks used only when no site selector matched.
pub const GENERIC_SELECTORS: &[&str] = &[
    "article",
    "[class*='post']",
    "[class*='card']",
    "[class*='story']",
    "[class*='entry']",
];

/// Slideshow and gallery layouts, always unioned in.
pub const SLIDE_SELECTORS: &[&str] = &[
    ".slide",
    "[data-slide]",
    "[class*='slide']",
    "[class*='gallery-item']",
    "[class*='slideshow'] li",
];

const HEADING_SELECTOR: &str =
    "h1, h2, h3, h4, [class*='title'], [class*='headline'], [class*='Title'], [class*='Headline']";

const EXCLUDED_IMAGE_PATTERNS: &[&str] = &[
    "logo", "icon", "favicon", "sprite", "loading", "placeholder", "avatar", "pixel",
    "facebook", "twitter", "instagram", "pinterest", "youtube", "badge", "banner",
    "advertisement",
];

/// Paths that usually lead to slideshow articles.
const SLIDESHOW_PATH_HINTS: &[&str] = &["slideshow", "gallery", "photos"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Site selectors, generic fallback, plus slides.
    Full,
    /// Slides only, for slideshow articles reached through search.
    SlidesOnly,
}

/// Raw signals of one candidate story.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    /// All visible text, whitespace-collapsed.
    pub text: String,
    /// Nearest heading-like element inside the region.
    pub heading: Option<String>,
    /// Paragraph text, or the full text when the region has no paragraphs.
    pub description: String,
    pub image_url: Option<String>,
    /// `datetime` of a `<time>` element inside the region.
    pub published: Option<String>,
}

fn select_all<'a>(document: &'a Html, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    for sel in selectors.iter().filter_map(|s| Selector::parse(s).ok()) {
        found.extend(document.select(&sel));
    }
    found
}

/// Locate candidate regions in `html` and lift their signals.
pub fn discover_candidates(html: &str, page_url: &str, mode: DiscoveryMode) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let mut batches = Vec::new();
    if mode == DiscoveryMode::Full {
        let site = select_all(&document, SITE_SELECTORS);
        if site.is_empty() {
            batches.push(select_all(&document, GENERIC_SELECTORS));
        } else {
            batches.push(site);
        }
    }
    batches.push(select_all(&document, SLIDE_SELECTORS));

    let mut seen = HashSet::new();
    let regions: Vec<ElementRef> = batches
        .into_iter()
        .flatten()
        .filter(|elem| seen.insert(elem.id()))
        .collect();

    let heading_sel = Selector::parse(HEADING_SELECTOR).ok();
    let paragraph_sel = Selector::parse("p").ok();
    let img_sel = Selector::parse("img").ok();
    let time_sel = Selector::parse("time[datetime]").ok();

    regions
        .into_iter()
        .filter_map(|elem| {
            let text = visible_text(elem);
            if text.is_empty() {
                return None;
            }

            let heading = heading_sel.as_ref().and_then(|sel| {
                elem.select(sel)
                    .map(visible_text)
                    .find(|t| !t.is_empty() && t.len() < 200)
            });

            let paragraphs: Vec<String> = paragraph_sel
                .as_ref()
                .map(|sel| elem.select(sel).map(visible_text).filter(|t| !t.is_empty()).collect())
                .unwrap_or_default();
            let description = if paragraphs.is_empty() {
                text.clone()
            } else {
                paragraphs.join(" ")
            };

            let image_url = img_sel
                .as_ref()
                .and_then(|sel| elem.select(sel).find_map(|img| usable_image(img, base.as_ref())));

            let published = time_sel.as_ref().and_then(|sel| {
                elem.select(sel)
                    .find_map(|t| t.value().attr("datetime").map(str::to_string))
            });

            Some(Candidate {
                text,
                heading,
                description,
                image_url,
                published,
            })
        })
        .collect()
}

/// Visible text of an element, skipping script and style contents.
fn visible_text(elem: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in elem.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .map(|p| matches!(p.value().name(), "script" | "style" | "noscript"))
                .unwrap_or(false);
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    normalize_text(&parts.join(" "))
}

fn usable_image(img: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let value = img.value();
    let raw = value
        .attr("src")
        .filter(|s| !s.starts_with("data:"))
        .or_else(|| value.attr("data-src"))
        .or_else(|| value.attr("data-lazy-src"))
        .map(str::to_string)
        .or_else(|| {
            value
                .attr("srcset")
                .and_then(|s| s.split(',').next())
                .and_then(|first| first.split_whitespace().next())
                .map(str::to_string)
        })?;
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }

    let resolved = match base {
        Some(base) => base.join(&raw).map(|u| u.to_string()).unwrap_or(raw),
        None => raw,
    };

    let lower = resolved.to_lowercase();
    if EXCLUDED_IMAGE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return None;
    }
    if let (Some(w), Some(h)) = (value.attr("width"), value.attr("height")) {
        if let (Ok(w), Ok(h)) = (
            w.replace("px", "").parse::<i32>(),
            h.replace("px", "").parse::<i32>(),
        ) {
            if w < 100 || h < 100 {
                return None;
            }
        }
    }
    Some(resolved)
}

/// Page-level publish date: Open Graph / article meta first, then JSON-LD.
pub fn page_published_time(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Ok(meta_sel) = Selector::parse("meta") {
        for meta in document.select(&meta_sel) {
            let value = meta.value();
            let name = value
                .attr("property")
                .or_else(|| value.attr("name"))
                .or_else(|| value.attr("itemprop"))
                .unwrap_or("");
            let content = value.attr("content").unwrap_or("");
            if !content.is_empty()
                && matches!(
                    name,
                    "article:published_time" | "og:published_time" | "datePublished" | "date"
                )
            {
                return Some(content.to_string());
            }
        }
    }

    let script_sel = Selector::parse("script[type='application/ld+json']").ok()?;
    for script in document.select(&script_sel) {
        let text = script.text().collect::<String>();
        let Ok(data) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        if let Some(date) = json_ld_date(&data) {
            return Some(date);
        }
    }
    None
}

fn json_ld_date(data: &Value) -> Option<String> {
    match data {
        Value::Object(obj) => {
            if let Some(date) = obj.get("datePublished").and_then(|v| v.as_str()) {
                return Some(date.to_string());
            }
            obj.get("@graph").and_then(json_ld_date)
        }
        Value::Array(items) => items.iter().find_map(json_ld_date),
        _ => None,
    }
}

/// Same-site links that look like slideshow articles, in page order.
pub fn slideshow_links(html: &str, page_url: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for link in document.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(mut full) = base.join(href) else {
            continue;
        };
        full.set_fragment(None);
        if full.host_str() != base.host_str() {
            continue;
        }
        let path = full.path().to_lowercase();
        if !SLIDESHOW_PATH_HINTS.iter().any(|hint| path.contains(hint)) {
            continue;
        }
        let full = full.to_string();
        if seen.insert(full.clone()) {
            links.push(full);
            if links.len() >= limit {
                break;
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://www.example.com/celebrity-style";

    #[test]
    fn site_selectors_take_precedence_over_generic() {
        let html = r#"
            <html><body>
              <div class="article-card">
                <h3>Zendaya at the Met Gala</h3>
                <p>Zendaya wore a sculptural silver gown with matching heels.</p>
                <img src="/img/zendaya.jpg" width="600" height="800">
              </div>
              <article><p>Unrelated generic article text that should be ignored.</p></article>
            </body></html>"#;
        let candidates = discover_candidates(html, PAGE, DiscoveryMode::Full);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.heading.as_deref(), Some("Zendaya at the Met Gala"));
        assert_eq!(
            c.description,
            "Zendaya wore a sculptural silver gown with matching heels."
        );
        assert_eq!(
            c.image_url.as_deref(),
            Some("https://www.example.com/img/zendaya.jpg")
        );
    }

    #[test]
    fn generic_fallback_when_site_selectors_miss() {
        let html = r#"<html><body>
            <article><h2>Look one</h2><p>First story text long enough to count.</p></article>
            <article><h2>Look two</h2><p>Second story text long enough to count.</p></article>
        </body></html>"#;
        let candidates = discover_candidates(html, PAGE, DiscoveryMode::Full);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn slides_are_unioned_and_deduplicated() {
        let html = r#"<html><body>
            <div class="article-card"><p>Card story.</p></div>
            <div class="slide gallery-item"><p>Slide story.</p></div>
        </body></html>"#;
        let candidates = discover_candidates(html, PAGE, DiscoveryMode::Full);
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Card story.", "Slide story."]);

        let slides = discover_candidates(html, PAGE, DiscoveryMode::SlidesOnly);
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn skips_script_text_and_tiny_images() {
        let html = r#"<html><body><div class="slide">
            <script>var tracking = 1;</script>
            <img src="https://cdn.example.com/logo.png">
            <img src="https://cdn.example.com/thumb.jpg" width="40" height="40">
            <img data-src="https://cdn.example.com/look.jpg">
            <p>Rihanna stepped out in an oversized leather jacket.</p>
        </div></body></html>"#;
        let candidates = discover_candidates(html, PAGE, DiscoveryMode::SlidesOnly);
        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].text.contains("tracking"));
        assert_eq!(
            candidates[0].image_url.as_deref(),
            Some("https://cdn.example.com/look.jpg")
        );
    }

    #[test]
    fn reads_publish_time_from_meta_then_json_ld() {
        let meta = r#"<html><head>
            <meta property="article:published_time" content="2024-05-06T20:00:00Z">
        </head></html>"#;
        assert_eq!(page_published_time(meta).as_deref(), Some("2024-05-06T20:00:00Z"));

        let ld = r#"<html><head><script type="application/ld+json">
            {"@graph": [{"@type": "NewsArticle", "datePublished": "2024-03-10"}]}
        </script></head></html>"#;
        assert_eq!(page_published_time(ld).as_deref(), Some("2024-03-10"));
    }

    #[test]
    fn collects_same_site_slideshow_links() {
        let html = r#"<html><body>
            <a href="/slideshow/met-gala-looks">Met Gala</a>
            <a href="/slideshow/met-gala-looks#top">Dup</a>
            <a href="https://other.com/gallery/x">Other site</a>
            <a href="/news/article">Plain</a>
            <a href="/photos/street-style">Street</a>
        </body></html>"#;
        let links = slideshow_links(html, "https://www.example.com/search?q=x", 3);
        assert_eq!(
            links,
            vec![
                "https://www.example.com/slideshow/met-gala-looks".to_string(),
                "https://www.example.com/photos/street-style".to_string(),
            ]
        );
    }
}
