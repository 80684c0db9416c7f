//! The pipeline driver.
//!
//! One attempt opens a session and walks three phases in order: the primary
//! listing pages, the fallback listing pages and a slideshow search. Later
//! phases only run while the accumulated result is short of the item
//! limit. Failed URLs are skipped, failed or empty attempts are retried
//! with backoff, and once every attempt is spent the mock generator fills
//! the result. [`Orchestrator::run`] never fails.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{ScoringWeights, ScrapeOptions, SourcePlan};
use crate::discovery::{slideshow_links, DiscoveryMode};
use crate::error::{Result, ScrapeError};
use crate::extract::Extractor;
use crate::item::SocialProofItem;
use crate::mock::MockGenerator;
use crate::navigator::{PageSession, SessionLauncher};
use crate::rank;
use crate::vocabulary::Vocabulary;

/// High-quality items that end a round early.
const ROUND_HIGH_QUALITY_TARGET: usize = 3;
/// Slideshow articles followed per search query.
const SLIDESHOW_LINKS_PER_QUERY: usize = 3;

const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_CAP_MS: u64 = 15_000;

/// Delay after failed attempt `retry` (zero-based): `min(1000 * 2^retry, 15000)` ms.
pub fn backoff_delay(retry: u32) -> Duration {
    let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(factor).min(BACKOFF_CAP_MS))
}

/// Items accepted during one attempt, deduplicated as they arrive.
struct Accumulator {
    items: Vec<SocialProofItem>,
    seen_text: HashSet<(String, String)>,
    seen_image: HashSet<(String, String)>,
    limit: usize,
    visits: usize,
}

impl Accumulator {
    fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            seen_text: HashSet::new(),
            seen_image: HashSet::new(),
            limit,
            visits: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    /// Add `item` unless it repeats an accepted one. Returns whether it was added.
    fn offer(&mut self, item: SocialProofItem) -> bool {
        let celebrity = item.celebrity.to_lowercase();
        let text_key = (celebrity.clone(), item.description_prefix());
        if self.seen_text.contains(&text_key) {
            return false;
        }
        if let Some(image) = item.image_url.as_deref().filter(|u| !u.is_empty()) {
            if !self.seen_image.insert((celebrity, image.to_string())) {
                return false;
            }
        }
        self.seen_text.insert(text_key);
        self.items.push(item);
        true
    }
}

pub struct Orchestrator {
    launcher: Arc<dyn SessionLauncher>,
    extractor: Extractor,
    mock: MockGenerator,
    plan: SourcePlan,
    options: ScrapeOptions,
    backoff: fn(u32) -> Duration,
}

impl Orchestrator {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        vocab: &Vocabulary,
        weights: ScoringWeights,
        plan: SourcePlan,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            launcher,
            extractor: Extractor::new(vocab, weights),
            mock: MockGenerator::new(vocab),
            plan,
            options,
            backoff: backoff_delay,
        }
    }

    /// Replace the retry backoff policy.
    pub fn with_backoff(mut self, backoff: fn(u32) -> Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run the pipeline to completion. Always returns at most
    /// `item_limit` items, and exactly that many when it falls back to
    /// synthetic data.
    pub async fn run(&self) -> Vec<SocialProofItem> {
        let limit = self.options.item_limit;
        if limit == 0 {
            return Vec::new();
        }

        let start = Instant::now();
        let attempts = self.options.retry_attempts.max(1);
        for attempt in 0..attempts {
            match self.attempt().await {
                Ok(items) if !items.is_empty() => {
                    let items = rank::finalize(items, limit);
                    info!(
                        attempt = attempt + 1,
                        items = items.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "extraction finished"
                    );
                    return items;
                }
                Ok(_) => warn!(attempt = attempt + 1, "attempt produced no items"),
                Err(e) => warn!(attempt = attempt + 1, error = %e, "attempt failed"),
            }

            if attempt + 1 < attempts {
                let delay = (self.backoff)(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(delay).await;
            }
        }

        warn!(attempts, "all attempts exhausted, generating mock items");
        rank::finalize(self.mock.generate(limit), limit)
    }

    /// One session, three phases. The session is closed on every path out,
    /// panics in extraction included.
    async fn attempt(&self) -> Result<Vec<SocialProofItem>> {
        let mut session = self.launcher.launch(&self.options).await?;

        let outcome = AssertUnwindSafe(self.collect(session.as_mut()))
            .catch_unwind()
            .await;
        session.close().await;

        outcome.map_err(|_| ScrapeError::Task("extraction panicked".to_string()))
    }

    async fn collect(&self, session: &mut dyn PageSession) -> Vec<SocialProofItem> {
        let mut acc = Accumulator::new(self.options.item_limit);

        let plan = &self.plan;
        self.visit_round("primary", &plan.primary_urls, DiscoveryMode::Full, session, &mut acc)
            .await;
        if !acc.is_full() {
            self.visit_round(
                "fallback",
                &plan.fallback_urls,
                DiscoveryMode::Full,
                session,
                &mut acc,
            )
            .await;
        }
        if !acc.is_full() {
            self.slideshow_search(session, &mut acc).await;
        }

        acc.items
    }

    async fn visit_round(
        &self,
        round: &str,
        urls: &[String],
        mode: DiscoveryMode,
        session: &mut dyn PageSession,
        acc: &mut Accumulator,
    ) {
        let high_quality = self.extractor.scorer().weights().high_quality;
        let mut round_high_quality = 0;

        for url in urls {
            if acc.is_full() || round_high_quality >= ROUND_HIGH_QUALITY_TARGET {
                break;
            }
            let Some((html, page_url)) = self.visit(url, session, acc).await else {
                continue;
            };

            let found = self.extractor.extract_page(&html, &page_url, mode);
            let candidates = found.len();
            let mut added = 0;
            for item in found {
                if acc.is_full() {
                    break;
                }
                let is_high_quality = item.confidence_score >= high_quality;
                if acc.offer(item) {
                    added += 1;
                    if is_high_quality {
                        round_high_quality += 1;
                    }
                }
            }
            info!(round, url = %url, candidates, added, total = acc.items.len(), "page processed");
        }
    }

    /// Search for slideshow articles and mine their slides.
    async fn slideshow_search(&self, session: &mut dyn PageSession, acc: &mut Accumulator) {
        for query in &self.plan.slideshow_queries {
            if acc.is_full() {
                break;
            }
            let search_url = format!(
                "{}?q={}",
                self.plan.slideshow_search_url,
                urlencoding::encode(query)
            );
            let Some((html, page_url)) = self.visit(&search_url, session, acc).await else {
                continue;
            };

            let links = slideshow_links(&html, &page_url, SLIDESHOW_LINKS_PER_QUERY);
            debug!(query = %query, links = links.len(), "slideshow search results");
            self.visit_round("slideshow", &links, DiscoveryMode::SlidesOnly, session, acc)
                .await;
        }
    }

    /// Load one URL after the polite pause. Failures are logged and skipped.
    async fn visit(
        &self,
        url: &str,
        session: &mut dyn PageSession,
        acc: &mut Accumulator,
    ) -> Option<(String, String)> {
        if acc.visits > 0 {
            let pause = self.polite_pause();
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        acc.visits += 1;

        match session.load(url).await {
            Ok(page) => Some((page.html, page.url)),
            Err(e) => {
                warn!(url, error = %e, "skipping url");
                None
            }
        }
    }

    fn polite_pause(&self) -> Duration {
        let (lo, hi) = self.options.polite_delay;
        let (lo_ms, hi_ms) = (lo.as_millis() as u64, hi.as_millis() as u64);
        if hi_ms <= lo_ms {
            return lo;
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo_ms..=hi_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(celebrity: &str, description: &str, image: Option<&str>) -> SocialProofItem {
        SocialProofItem {
            celebrity: celebrity.to_string(),
            event: None,
            outfit_description: description.to_string(),
            image_url: image.map(str::to_string),
            timestamp: "2024-05-06T20:00:00Z".to_string(),
            outfit_tags: vec!["red dress".to_string()],
            colors: Vec::new(),
            patterns: Vec::new(),
            styles: Vec::new(),
            confidence_score: 1.0,
        }
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(3), Duration::from_millis(8000));
        assert_eq!(backoff_delay(4), Duration::from_millis(15_000));
        assert_eq!(backoff_delay(63), Duration::from_millis(15_000));
        assert_eq!(backoff_delay(200), Duration::from_millis(15_000));
    }

    #[test]
    fn accumulator_rejects_repeats() {
        let mut acc = Accumulator::new(5);
        let caption = "Zendaya wore a red dress to the premiere.";
        assert!(acc.offer(item("Zendaya", caption, Some("a.jpg"))));
        assert!(!acc.offer(item("zendaya", caption, None)));
        assert!(!acc.offer(item(
            "Zendaya",
            "Another caption entirely for the same photo.",
            Some("a.jpg")
        )));
        assert!(acc.offer(item("Rihanna", caption, Some("a.jpg"))));
        assert_eq!(acc.items.len(), 2);
    }

    #[test]
    fn accumulator_fills_to_limit() {
        let mut acc = Accumulator::new(1);
        acc.offer(item("Cher", "Cher wore a sequined jumpsuit with feathers.", None));
        assert!(acc.is_full());
    }
}
